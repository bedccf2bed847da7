// Keymap profiles - Selectable control layouts
//
// A profile is an ordered list of bindings from a physical key (optionally
// held together with MENU) to a SNES button. The set of profiles is fixed at
// startup; the selected index is persisted so it survives a restart.

use super::config::KeymapConfig;
use super::{InputTranslator, PhysicalKey, SnesButton};
use crate::platform::{SettingsError, SettingsStore};
use std::path::Path;
use tracing::{info, warn};

/// Settings key holding the selected profile index
pub const KEYMAP_SETTING: &str = "keymap";

/// One physical key to logical button binding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyBinding {
    /// Physical key
    pub key: PhysicalKey,
    /// Only fires while MENU is held with `key`
    pub modifier: bool,
    /// SNES button produced
    pub action: SnesButton,
}

impl KeyBinding {
    /// Create a binding
    pub const fn new(key: PhysicalKey, modifier: bool, action: SnesButton) -> Self {
        Self {
            key,
            modifier,
            action,
        }
    }

    /// Text shown for the key side of the binding
    pub fn key_label(&self) -> String {
        if self.modifier {
            format!("MENU + {}", self.key.name())
        } else {
            self.key.name().to_string()
        }
    }
}

/// A named control layout
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeymapProfile {
    name: String,
    bindings: Vec<KeyBinding>,
}

impl KeymapProfile {
    /// Create a profile
    pub fn new(name: impl Into<String>, bindings: Vec<KeyBinding>) -> Self {
        Self {
            name: name.into(),
            bindings,
        }
    }

    /// The reference layout
    ///
    /// D-pad to d-pad, START to Start, SELECT to A, A to B, B to Y.
    pub fn reference() -> Self {
        let mut bindings = dpad();
        bindings.extend([
            KeyBinding::new(PhysicalKey::Start, false, SnesButton::Start),
            KeyBinding::new(PhysicalKey::Select, false, SnesButton::A),
            KeyBinding::new(PhysicalKey::A, false, SnesButton::B),
            KeyBinding::new(PhysicalKey::B, false, SnesButton::Y),
        ]);
        Self::new("Default", bindings)
    }

    /// Profile name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Bindings in table order
    pub fn bindings(&self) -> &[KeyBinding] {
        &self.bindings
    }

    /// Rows for the controls dialog
    ///
    /// D-pad bindings are left out. Each row is `(button label, key label)`.
    pub fn display_rows(&self) -> Vec<(&'static str, String)> {
        self.bindings
            .iter()
            .filter(|binding| !binding.key.is_dpad())
            .map(|binding| (binding.action.label(), binding.key_label()))
            .collect()
    }
}

/// Cycling direction for profile selection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Prev,
    Next,
}

/// The ordered, non-empty list of available profiles
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeymapSet {
    profiles: Vec<KeymapProfile>,
}

impl KeymapSet {
    /// Built-in profiles
    pub fn builtin() -> Self {
        use PhysicalKey as K;
        use SnesButton as S;

        let with_dpad = |name: &str, rest: &[KeyBinding]| {
            let mut bindings = dpad();
            bindings.extend_from_slice(rest);
            KeymapProfile::new(name, bindings)
        };

        Self {
            profiles: vec![
                KeymapProfile::reference(),
                with_dpad(
                    "Type A",
                    &[
                        KeyBinding::new(K::Start, false, S::Start),
                        KeyBinding::new(K::Select, false, S::Select),
                        KeyBinding::new(K::A, false, S::A),
                        KeyBinding::new(K::B, false, S::B),
                        KeyBinding::new(K::A, true, S::X),
                        KeyBinding::new(K::B, true, S::Y),
                        KeyBinding::new(K::Select, true, S::L),
                        KeyBinding::new(K::Start, true, S::R),
                    ],
                ),
                with_dpad(
                    "Type B",
                    &[
                        KeyBinding::new(K::Start, false, S::Start),
                        KeyBinding::new(K::Select, false, S::Select),
                        KeyBinding::new(K::A, false, S::B),
                        KeyBinding::new(K::B, false, S::Y),
                        KeyBinding::new(K::A, true, S::A),
                        KeyBinding::new(K::B, true, S::X),
                        KeyBinding::new(K::Select, true, S::L),
                        KeyBinding::new(K::Start, true, S::R),
                    ],
                ),
                with_dpad(
                    "Type C",
                    &[
                        KeyBinding::new(K::Start, false, S::Start),
                        KeyBinding::new(K::Select, false, S::X),
                        KeyBinding::new(K::A, false, S::A),
                        KeyBinding::new(K::B, false, S::B),
                        KeyBinding::new(K::A, true, S::R),
                        KeyBinding::new(K::B, true, S::L),
                        KeyBinding::new(K::Select, true, S::Select),
                        KeyBinding::new(K::Start, true, S::Y),
                    ],
                ),
            ],
        }
    }

    /// Build a set from explicit profiles
    ///
    /// # Returns
    ///
    /// `None` if `profiles` is empty
    pub fn from_profiles(profiles: Vec<KeymapProfile>) -> Option<Self> {
        if profiles.is_empty() {
            None
        } else {
            Some(Self { profiles })
        }
    }

    /// Load profiles from a TOML file, falling back to the built-in set
    ///
    /// A missing file is created from the built-in set so it can be edited.
    pub fn load_or_builtin<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();
        if !path.exists() {
            let builtin = Self::builtin();
            if let Err(e) = KeymapConfig::from_set(&builtin).save_to_file(path) {
                warn!(path = %path.display(), error = %e, "could not write built-in keymaps");
            }
            return builtin;
        }

        let loaded = KeymapConfig::load_from_file(path).and_then(|config| config.to_set());
        match loaded {
            Ok(set) => {
                info!(path = %path.display(), profiles = set.len(), "loaded keymaps");
                set
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "could not load keymaps, using built-in set");
                Self::builtin()
            }
        }
    }

    /// Number of profiles
    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    /// Always false; a set holds at least one profile
    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }

    /// Every profile, in selection order
    pub fn profiles(&self) -> &[KeymapProfile] {
        &self.profiles
    }

    /// Reduce any stored value to a valid index
    pub fn normalize(&self, index: i64) -> usize {
        index.rem_euclid(self.profiles.len() as i64) as usize
    }

    /// Profile at `index`, taken modulo the profile count
    pub fn get(&self, index: usize) -> &KeymapProfile {
        &self.profiles[index % self.profiles.len()]
    }

    /// Neighbouring index, wrapping at both ends
    pub fn select(&self, current: usize, direction: Direction) -> usize {
        let count = self.profiles.len();
        let current = current % count;
        match direction {
            Direction::Prev => (current + count - 1) % count,
            Direction::Next => (current + 1) % count,
        }
    }

    /// Rebind `translator` to the profile at `index`
    ///
    /// Every existing binding is removed first so nothing leaks from the
    /// previous profile.
    pub fn apply(&self, index: usize, translator: &mut InputTranslator) {
        let profile = self.get(index);
        translator.apply_profile(profile);
        info!(index, profile = profile.name(), "keymap applied");
    }

    /// Index restored from the settings store
    pub fn stored_index(&self, settings: &dyn SettingsStore) -> usize {
        self.normalize(settings.get_number(KEYMAP_SETTING, 0))
    }

    /// Persist the selected index
    pub fn store_index(
        &self,
        settings: &mut dyn SettingsStore,
        index: usize,
    ) -> Result<(), SettingsError> {
        settings.set_number(KEYMAP_SETTING, (index % self.profiles.len()) as i64)
    }
}

impl Default for KeymapSet {
    fn default() -> Self {
        Self::builtin()
    }
}

fn dpad() -> Vec<KeyBinding> {
    vec![
        KeyBinding::new(PhysicalKey::Up, false, SnesButton::Up),
        KeyBinding::new(PhysicalKey::Down, false, SnesButton::Down),
        KeyBinding::new(PhysicalKey::Left, false, SnesButton::Left),
        KeyBinding::new(PhysicalKey::Right, false, SnesButton::Right),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::{GamepadKeys, SnesButtons};
    use crate::platform::JsonSettingsStore;

    #[test]
    fn test_builtin_has_four_profiles() {
        let set = KeymapSet::builtin();
        assert_eq!(set.len(), 4);
        assert!(!set.is_empty());
        assert_eq!(set.get(0), &KeymapProfile::reference());
    }

    #[test]
    fn test_select_wraps_both_ways() {
        let set = KeymapSet::builtin();
        assert_eq!(set.select(0, Direction::Prev), 3);
        assert_eq!(set.select(3, Direction::Next), 0);
        assert_eq!(set.select(1, Direction::Next), 2);
        assert_eq!(set.select(2, Direction::Prev), 1);
    }

    #[test]
    fn test_select_full_cycle_returns_home() {
        let set = KeymapSet::builtin();
        for start in 0..set.len() {
            let mut index = start;
            for _ in 0..set.len() {
                index = set.select(index, Direction::Next);
            }
            assert_eq!(index, start);
        }
    }

    #[test]
    fn test_normalize_out_of_range() {
        let set = KeymapSet::builtin();
        assert_eq!(set.normalize(5), 1);
        assert_eq!(set.normalize(-1), 3);
        assert_eq!(set.get(6).name(), set.get(2).name());
    }

    #[test]
    fn test_empty_set_rejected() {
        assert!(KeymapSet::from_profiles(Vec::new()).is_none());
    }

    #[test]
    fn test_apply_leaves_no_stale_bindings() {
        let set = KeymapSet::builtin();
        let mut translator = InputTranslator::new();

        set.apply(1, &mut translator);
        assert_eq!(translator.bindings(), set.get(1).bindings());
        assert_eq!(
            translator.poll(GamepadKeys::SELECT).controller,
            SnesButtons::SELECT
        );

        set.apply(0, &mut translator);
        assert_eq!(translator.bindings(), set.get(0).bindings());
        assert_eq!(
            translator.poll(GamepadKeys::SELECT).controller,
            SnesButtons::A
        );
        // Profile 0 has no combos, so MENU opens the game menu again
        assert!(!translator
            .poll(GamepadKeys::MENU | GamepadKeys::A)
            .triggers
            .is_empty());
    }

    #[test]
    fn test_display_rows_hide_dpad() {
        let rows = KeymapSet::builtin().get(1).display_rows();
        assert_eq!(rows.len(), 8);
        assert!(rows.contains(&("X", "MENU + A".to_string())));
        assert!(rows.contains(&("START", "START".to_string())));
        assert!(rows.iter().all(|(_, key)| !key.contains("UP")));
    }

    #[test]
    fn test_index_persistence() {
        let set = KeymapSet::builtin();
        let mut settings = JsonSettingsStore::in_memory();
        assert_eq!(set.stored_index(&settings), 0);

        set.store_index(&mut settings, 2).unwrap();
        assert_eq!(set.stored_index(&settings), 2);
        assert_eq!(settings.get_number(KEYMAP_SETTING, 0), 2);
    }

    #[test]
    fn test_load_or_builtin_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("keymaps.toml");
        let set = KeymapSet::load_or_builtin(&path);
        assert_eq!(set, KeymapSet::builtin());

        // The built-in set was written out and reads back the same
        assert!(path.exists());
        assert_eq!(KeymapSet::load_or_builtin(&path), set);
    }
}
