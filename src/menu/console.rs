// Console menu - Line-oriented menu host
//
// Renders the in-game and options menus as text and reads one command per
// line. Used by the desktop frontend (over stdin/stdout) and by tests (over
// in-memory buffers). End of input always backs out of the current menu.

use super::{GameMenuChoice, MenuAction, MenuEvent, MenuHost, MenuOption, OptionKind, OptionsMenu};
use std::io::{self, BufRead, Write};
use tracing::warn;

/// Menu host reading commands from `input` and printing to `output`
#[derive(Debug)]
pub struct ConsoleMenu<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> ConsoleMenu<R, W> {
    /// Create a console menu
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    /// Give back the output sink
    pub fn into_output(self) -> W {
        self.output
    }

    fn read_command(&mut self) -> io::Result<Option<String>> {
        write!(self.output, "> ")?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim().to_lowercase()))
    }

    fn run_game_menu(&mut self) -> io::Result<GameMenuChoice> {
        loop {
            writeln!(self.output, "== Game menu ==")?;
            for (i, choice) in GameMenuChoice::ALL.iter().enumerate() {
                writeln!(self.output, "{}. {}", i + 1, choice)?;
            }

            let Some(command) = self.read_command()? else {
                return Ok(GameMenuChoice::Resume);
            };
            if command.is_empty() {
                return Ok(GameMenuChoice::Resume);
            }

            let selected = command
                .parse::<usize>()
                .ok()
                .and_then(|n| n.checked_sub(1))
                .and_then(|i| GameMenuChoice::ALL.get(i).copied());
            match selected {
                Some(choice) => return Ok(choice),
                None => writeln!(self.output, "Unknown choice: {}", command)?,
            }
        }
    }

    fn run_options_menu(&mut self, menu: &mut OptionsMenu<'_>) -> io::Result<()> {
        loop {
            writeln!(self.output, "== Options ==")?;
            for (i, option) in menu.entries().iter().enumerate() {
                writeln!(self.output, "{}. {}: {}", i + 1, option.label, menu.value(option.id))?;
            }
            writeln!(self.output, "<n> [<|>|alt] to change, q to close")?;

            let Some(command) = self.read_command()? else {
                return Ok(());
            };
            if command.is_empty() || command == "q" {
                return Ok(());
            }

            let Some((option, event)) = parse_option_command(menu, &command) else {
                writeln!(self.output, "Unknown command: {}", command)?;
                continue;
            };

            if option.kind == OptionKind::SubMenu && event == MenuEvent::Enter {
                self.run_controls_dialog(menu)?;
            }
            if menu.handle(option.id, event) == MenuAction::Dismiss {
                return Ok(());
            }
        }
    }

    fn run_controls_dialog(&mut self, menu: &mut OptionsMenu<'_>) -> io::Result<()> {
        loop {
            writeln!(self.output, "== Controls ==")?;
            for (label, value) in menu.controls_rows() {
                writeln!(self.output, "{:<8} {}", label, value)?;
            }

            let event = match self.read_command()?.as_deref() {
                Some("<") | Some("prev") => MenuEvent::Prev,
                Some(">") | Some("next") => MenuEvent::Next,
                Some("alt") => MenuEvent::Alt,
                _ => MenuEvent::Enter,
            };

            match menu.handle_controls(event) {
                MenuAction::Dismiss => return Ok(()),
                MenuAction::Close | MenuAction::Void => {}
            }
        }
    }
}

fn parse_option_command(
    menu: &OptionsMenu<'_>,
    command: &str,
) -> Option<(MenuOption, MenuEvent)> {
    let mut parts = command.split_whitespace();
    let index = parts.next()?.parse::<usize>().ok()?.checked_sub(1)?;
    let option = *menu.entries().get(index)?;

    let event = match parts.next() {
        None | Some("enter") => MenuEvent::Enter,
        Some("<") | Some("prev") => MenuEvent::Prev,
        Some(">") | Some("next") => MenuEvent::Next,
        Some("alt") => MenuEvent::Alt,
        Some(_) => return None,
    };
    Some((option, event))
}

impl<R: BufRead, W: Write> MenuHost for ConsoleMenu<R, W> {
    fn game_menu(&mut self) -> GameMenuChoice {
        self.run_game_menu().unwrap_or_else(|e| {
            warn!(error = %e, "menu input failed, resuming");
            GameMenuChoice::Resume
        })
    }

    fn options_menu(&mut self, menu: &mut OptionsMenu<'_>) {
        if let Err(e) = self.run_options_menu(menu) {
            warn!(error = %e, "menu input failed, closing options");
        }
    }
}
