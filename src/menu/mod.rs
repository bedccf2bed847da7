// Menu module - In-game menu and options menu
//
// The options menu is a fixed list of tagged option variants. A single
// interpreter applies navigation events to the runtime options; rendering
// and reading the user's choices is left to a `MenuHost`.

pub mod console;

pub use console::ConsoleMenu;

use crate::input::{Direction, KeymapSet};
use crate::scheduler::Frameskip;
use std::fmt;

/// What an option does when navigated
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionKind {
    /// Prev and Next both flip the value
    Toggle,
    /// Prev decrements, Next increments, never below `min`
    Range { min: u32 },
    /// Enter opens a nested dialog
    SubMenu,
}

/// Options menu entries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OptionId {
    ApuEnable,
    LowpassFilter,
    Frameskip,
    Controls,
}

/// One row of the options menu
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MenuOption {
    pub id: OptionId,
    pub label: &'static str,
    pub kind: OptionKind,
}

/// The options menu, in display order
pub const OPTIONS: [MenuOption; 4] = [
    MenuOption {
        id: OptionId::ApuEnable,
        label: "APU enable",
        kind: OptionKind::Toggle,
    },
    MenuOption {
        id: OptionId::LowpassFilter,
        label: "LP Filter",
        kind: OptionKind::Toggle,
    },
    MenuOption {
        id: OptionId::Frameskip,
        label: "Frameskip",
        kind: OptionKind::Range { min: 1 },
    },
    MenuOption {
        id: OptionId::Controls,
        label: "Controls",
        kind: OptionKind::SubMenu,
    },
];

/// Navigation event delivered by the menu host
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuEvent {
    Prev,
    Next,
    Enter,
    Alt,
}

/// What the dialog should do after an event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuAction {
    /// Stay open
    Void,
    /// Close this dialog; the host reopens it with fresh values
    Close,
    /// Leave the dialog for good
    Dismiss,
}

/// Choices offered by the in-game menu
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameMenuChoice {
    Resume,
    SaveState,
    LoadState,
    Reset,
    Screenshot,
    Quit,
}

impl GameMenuChoice {
    /// Every choice, in display order
    pub const ALL: [GameMenuChoice; 6] = [
        GameMenuChoice::Resume,
        GameMenuChoice::SaveState,
        GameMenuChoice::LoadState,
        GameMenuChoice::Reset,
        GameMenuChoice::Screenshot,
        GameMenuChoice::Quit,
    ];

    /// Label shown in the menu
    pub fn label(self) -> &'static str {
        match self {
            GameMenuChoice::Resume => "Resume game",
            GameMenuChoice::SaveState => "Save game",
            GameMenuChoice::LoadState => "Reload game",
            GameMenuChoice::Reset => "Reset",
            GameMenuChoice::Screenshot => "Screenshot",
            GameMenuChoice::Quit => "Quit",
        }
    }
}

impl fmt::Display for GameMenuChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Values the options menu can change while the game runs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RuntimeOptions {
    pub apu_enabled: bool,
    pub lowpass_filter: bool,
    pub frameskip: Frameskip,
    /// Selected keymap profile index
    pub keymap: usize,
}

/// Interpreter for the options menu
pub struct OptionsMenu<'a> {
    options: &'a mut RuntimeOptions,
    keymaps: &'a KeymapSet,
}

impl<'a> OptionsMenu<'a> {
    /// Wrap the runtime options for one menu session
    pub fn new(options: &'a mut RuntimeOptions, keymaps: &'a KeymapSet) -> Self {
        Self { options, keymaps }
    }

    /// Rows to display
    pub fn entries(&self) -> &'static [MenuOption] {
        &OPTIONS
    }

    /// Current value text of an option
    pub fn value(&self, id: OptionId) -> String {
        match id {
            OptionId::ApuEnable => on_off(self.options.apu_enabled),
            OptionId::LowpassFilter => on_off(self.options.lowpass_filter),
            OptionId::Frameskip => self.options.frameskip.get().to_string(),
            OptionId::Controls => self.keymaps.get(self.options.keymap).name().to_string(),
        }
    }

    /// Apply one navigation event to an option
    pub fn handle(&mut self, id: OptionId, event: MenuEvent) -> MenuAction {
        let Some(option) = OPTIONS.iter().find(|option| option.id == id) else {
            return MenuAction::Void;
        };
        let step = matches!(event, MenuEvent::Prev | MenuEvent::Next);

        match option.kind {
            OptionKind::Toggle if step => {
                if let Some(value) = self.toggle_target(id) {
                    *value = !*value;
                }
            }
            OptionKind::Range { min } if step => {
                if let Some(value) = self.range_target(id) {
                    let current = value.get();
                    let next = match event {
                        MenuEvent::Prev => current.saturating_sub(1),
                        _ => current.saturating_add(1),
                    };
                    *value = Frameskip::new(next.max(min));
                }
            }
            _ => {}
        }

        MenuAction::Void
    }

    fn toggle_target(&mut self, id: OptionId) -> Option<&mut bool> {
        match id {
            OptionId::ApuEnable => Some(&mut self.options.apu_enabled),
            OptionId::LowpassFilter => Some(&mut self.options.lowpass_filter),
            OptionId::Frameskip | OptionId::Controls => None,
        }
    }

    fn range_target(&mut self, id: OptionId) -> Option<&mut Frameskip> {
        match id {
            OptionId::Frameskip => Some(&mut self.options.frameskip),
            OptionId::ApuEnable | OptionId::LowpassFilter | OptionId::Controls => None,
        }
    }

    /// Rows of the "Controls" dialog
    ///
    /// The first row is the profile selector; the rest describe the bindings
    /// of the selected profile.
    pub fn controls_rows(&self) -> Vec<(String, String)> {
        let profile = self.keymaps.get(self.options.keymap);
        let mut rows = vec![("Profile".to_string(), format!("< {} >", profile.name()))];
        rows.extend(
            profile
                .display_rows()
                .into_iter()
                .map(|(action, key)| (action.to_string(), key)),
        );
        rows
    }

    /// Apply one event inside the "Controls" dialog
    ///
    /// Prev and Next cycle the profile and close the dialog so it is redrawn.
    /// Enter and Alt dismiss it.
    pub fn handle_controls(&mut self, event: MenuEvent) -> MenuAction {
        match event {
            MenuEvent::Prev | MenuEvent::Next => {
                let direction = if event == MenuEvent::Prev {
                    Direction::Prev
                } else {
                    Direction::Next
                };
                self.options.keymap = self.keymaps.select(self.options.keymap, direction);
                MenuAction::Close
            }
            MenuEvent::Enter | MenuEvent::Alt => MenuAction::Dismiss,
        }
    }

    /// Current option values
    pub fn options(&self) -> &RuntimeOptions {
        self.options
    }
}

fn on_off(value: bool) -> String {
    let text = if value { "On " } else { "Off" };
    text.to_string()
}

/// Renders menus and collects the user's choices
///
/// Both calls block the frame loop until the user leaves the menu.
pub trait MenuHost {
    /// Show the in-game menu
    fn game_menu(&mut self) -> GameMenuChoice;

    /// Show the options menu
    fn options_menu(&mut self, menu: &mut OptionsMenu<'_>);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options() -> RuntimeOptions {
        RuntimeOptions {
            apu_enabled: true,
            lowpass_filter: false,
            frameskip: Frameskip::new(3),
            keymap: 0,
        }
    }

    #[test]
    fn test_option_labels() {
        let labels: Vec<_> = OPTIONS.iter().map(|o| o.label).collect();
        assert_eq!(labels, ["APU enable", "LP Filter", "Frameskip", "Controls"]);
    }

    #[test]
    fn test_toggle_flips_on_prev_and_next() {
        let keymaps = KeymapSet::builtin();
        let mut values = options();
        let mut menu = OptionsMenu::new(&mut values, &keymaps);

        assert_eq!(menu.value(OptionId::ApuEnable), "On ");
        assert_eq!(menu.handle(OptionId::ApuEnable, MenuEvent::Next), MenuAction::Void);
        assert_eq!(menu.value(OptionId::ApuEnable), "Off");
        menu.handle(OptionId::ApuEnable, MenuEvent::Prev);
        assert_eq!(menu.value(OptionId::ApuEnable), "On ");

        menu.handle(OptionId::LowpassFilter, MenuEvent::Enter);
        assert_eq!(menu.value(OptionId::LowpassFilter), "Off");
        menu.handle(OptionId::LowpassFilter, MenuEvent::Prev);
        assert!(menu.options().lowpass_filter);
    }

    #[test]
    fn test_each_option_edits_only_its_own_value() {
        let keymaps = KeymapSet::builtin();
        let mut values = options();
        let mut menu = OptionsMenu::new(&mut values, &keymaps);

        menu.handle(OptionId::LowpassFilter, MenuEvent::Next);
        assert!(menu.options().lowpass_filter);
        assert!(menu.options().apu_enabled);

        menu.handle(OptionId::Frameskip, MenuEvent::Next);
        assert_eq!(menu.options().frameskip.get(), 4);
        assert!(menu.options().apu_enabled);
        assert!(menu.options().lowpass_filter);

        assert!(menu.toggle_target(OptionId::Frameskip).is_none());
        assert!(menu.toggle_target(OptionId::Controls).is_none());
        assert!(menu.range_target(OptionId::ApuEnable).is_none());
        assert!(menu.range_target(OptionId::Controls).is_none());
    }

    #[test]
    fn test_frameskip_floor_is_one() {
        let keymaps = KeymapSet::builtin();
        let mut values = options();
        let mut menu = OptionsMenu::new(&mut values, &keymaps);

        for _ in 0..10 {
            menu.handle(OptionId::Frameskip, MenuEvent::Prev);
        }
        assert_eq!(menu.value(OptionId::Frameskip), "1");

        menu.handle(OptionId::Frameskip, MenuEvent::Next);
        menu.handle(OptionId::Frameskip, MenuEvent::Next);
        assert_eq!(menu.options().frameskip.get(), 3);
    }

    #[test]
    fn test_controls_cycle_and_dismiss() {
        let keymaps = KeymapSet::builtin();
        let mut values = options();
        let mut menu = OptionsMenu::new(&mut values, &keymaps);

        assert_eq!(menu.handle_controls(MenuEvent::Prev), MenuAction::Close);
        assert_eq!(menu.options().keymap, keymaps.len() - 1);
        assert_eq!(menu.handle_controls(MenuEvent::Next), MenuAction::Close);
        assert_eq!(menu.options().keymap, 0);
        assert_eq!(menu.handle_controls(MenuEvent::Enter), MenuAction::Dismiss);
        assert_eq!(menu.handle_controls(MenuEvent::Alt), MenuAction::Dismiss);
    }

    #[test]
    fn test_controls_rows() {
        let keymaps = KeymapSet::builtin();
        let mut values = options();
        values.keymap = 1;
        let menu = OptionsMenu::new(&mut values, &keymaps);

        let rows = menu.controls_rows();
        assert_eq!(rows[0], ("Profile".to_string(), "< Type A >".to_string()));
        assert_eq!(rows.len(), 1 + keymaps.get(1).display_rows().len());
        assert_eq!(menu.value(OptionId::Controls), "Type A");
    }

    #[test]
    fn test_submenu_enter_changes_nothing() {
        let keymaps = KeymapSet::builtin();
        let mut values = options();
        let before = values;
        let mut menu = OptionsMenu::new(&mut values, &keymaps);
        assert_eq!(menu.handle(OptionId::Controls, MenuEvent::Enter), MenuAction::Void);
        assert_eq!(values, before);
    }
}
