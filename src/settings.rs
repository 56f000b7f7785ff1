//! Display preferences: font family, font size and dark mode.
//!
//! Values are read from the local store when the state is created and written
//! back explicitly after every mutation.
use std::sync::Arc;

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use crate::{KeyValueStore, QuoteError, Result};

pub const FONT_FAMILY_KEY: &str = "fontFamily";
pub const FONT_SIZE_KEY: &str = "fontSize";
pub const DARK_MODE_KEY: &str = "darkMode";

pub const DEFAULT_FONT_FAMILY: &str = "\"Fleur De Leah\"";
pub const DEFAULT_FONT_SIZE: u32 = 48;
pub const DEFAULT_DARK_MODE: bool = true;

/// A decorative font offered to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FontOption {
    /// CSS font-family value, quotes included
    pub family: &'static str,
    /// Human readable name
    pub name: &'static str,
}

pub const AVAILABLE_FONTS: &[FontOption] = &[
    FontOption {
        family: "\"Fleur De Leah\"",
        name: "Fleur De Leah",
    },
    FontOption {
        family: "\"Kapakana\"",
        name: "Kapakana",
    },
    FontOption {
        family: "\"Pinyon Script\"",
        name: "Pinyon Script",
    },
    FontOption {
        family: "\"Monsieur La Doulaise\"",
        name: "Monsieur La Doulaise",
    },
    FontOption {
        family: "\"Ballet\"",
        name: "Ballet",
    },
    FontOption {
        family: "\"Imperial Script\"",
        name: "Imperial Script",
    },
    FontOption {
        family: "\"Mea Culpa\"",
        name: "Mea Culpa",
    },
    FontOption {
        family: "\"My Soul\"",
        name: "My Soul",
    },
    FontOption {
        family: "\"Updock\"",
        name: "Updock",
    },
    FontOption {
        family: "\"Lavishly Yours\"",
        name: "Lavishly Yours",
    },
];

/// Looks up a catalog font by display name or CSS family, ignoring case.
pub fn find_font(name_or_family: &str) -> Option<&'static FontOption> {
    let wanted = name_or_family.trim();
    AVAILABLE_FONTS.iter().find(|font| {
        font.name.eq_ignore_ascii_case(wanted) || font.family.eq_ignore_ascii_case(wanted)
    })
}

/// Snapshot of the display preferences.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    pub font_family: String,
    pub font_size: u32,
    pub dark_mode: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            font_family: DEFAULT_FONT_FAMILY.to_string(),
            font_size: DEFAULT_FONT_SIZE,
            dark_mode: DEFAULT_DARK_MODE,
        }
    }
}

impl Settings {
    /// CSS custom properties derived from the current values.
    pub fn css_variables(&self) -> Vec<(&'static str, String)> {
        vec![
            ("--font-family", self.font_family.clone()),
            ("--font-size", format!("{}px", self.font_size)),
        ]
    }
}

/// Settings state bound to a local key-value store.
pub struct SettingsStore {
    settings: Settings,
    store: Arc<dyn KeyValueStore>,
}

impl SettingsStore {
    /// Reads persisted values, falling back to defaults for absent or unreadable keys.
    pub fn load(store: Arc<dyn KeyValueStore>) -> Self {
        let defaults = Settings::default();

        let font_family = match store.get(FONT_FAMILY_KEY) {
            Some(family) if find_font(&family).is_some() => family,
            Some(family) => {
                warn!("Ignoring unknown stored font family: {}", family);
                defaults.font_family
            }
            None => defaults.font_family,
        };

        let font_size = store
            .get(FONT_SIZE_KEY)
            .and_then(|raw| raw.trim().parse::<u32>().ok())
            .filter(|size| *size > 0)
            .unwrap_or(defaults.font_size);

        let dark_mode = store
            .get(DARK_MODE_KEY)
            .and_then(|raw| raw.trim().parse::<bool>().ok())
            .unwrap_or(defaults.dark_mode);

        let settings = Settings {
            font_family,
            font_size,
            dark_mode,
        };
        debug!("Loaded settings: {:?}", settings);

        Self { settings, store }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn available_fonts(&self) -> &'static [FontOption] {
        AVAILABLE_FONTS
    }

    pub fn css_variables(&self) -> Vec<(&'static str, String)> {
        self.settings.css_variables()
    }

    /// Selects a catalog font by name or family and persists.
    pub fn set_font_family(&mut self, name_or_family: &str) -> Result<()> {
        let font = find_font(name_or_family).ok_or_else(|| QuoteError::InvalidSetting {
            message: format!("unknown font: {}", name_or_family),
        })?;
        self.settings.font_family = font.family.to_string();
        self.save()
    }

    pub fn set_font_size(&mut self, font_size: u32) -> Result<()> {
        if font_size == 0 {
            return Err(QuoteError::InvalidSetting {
                message: "font size must be a positive number of pixels".to_string(),
            });
        }
        self.settings.font_size = font_size;
        self.save()
    }

    pub fn set_dark_mode(&mut self, dark_mode: bool) -> Result<()> {
        self.settings.dark_mode = dark_mode;
        self.save()
    }

    /// Restores the defaults and persists them.
    pub fn reset_settings(&mut self) -> Result<()> {
        info!("Resetting settings to defaults");
        self.settings = Settings::default();
        self.save()
    }

    /// Writes every field to the local store.
    pub fn save(&self) -> Result<()> {
        self.store.set(FONT_FAMILY_KEY, &self.settings.font_family)?;
        self.store.set(FONT_SIZE_KEY, &self.settings.font_size.to_string())?;
        self.store.set(DARK_MODE_KEY, &self.settings.dark_mode.to_string())?;
        debug!("Settings saved");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MemoryStore;

    fn memory() -> Arc<dyn KeyValueStore> {
        Arc::new(MemoryStore::new())
    }

    #[test]
    fn test_defaults_when_store_is_empty() {
        let settings = SettingsStore::load(memory());
        assert_eq!(settings.settings(), &Settings::default());
        assert_eq!(settings.settings().font_family, "\"Fleur De Leah\"");
        assert_eq!(settings.settings().font_size, 48);
        assert!(settings.settings().dark_mode);
    }

    #[test]
    fn test_mutations_persist_and_reload() {
        let store = memory();
        let mut settings = SettingsStore::load(store.clone());
        settings.set_font_family("pinyon script").unwrap();
        settings.set_font_size(32).unwrap();
        settings.set_dark_mode(false).unwrap();

        assert_eq!(store.get(FONT_SIZE_KEY).as_deref(), Some("32"));
        assert_eq!(store.get(DARK_MODE_KEY).as_deref(), Some("false"));

        let reloaded = SettingsStore::load(store);
        assert_eq!(reloaded.settings().font_family, "\"Pinyon Script\"");
        assert_eq!(reloaded.settings().font_size, 32);
        assert!(!reloaded.settings().dark_mode);
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        let store = memory();
        let mut settings = SettingsStore::load(store.clone());

        assert!(matches!(
            settings.set_font_family("Comic Sans"),
            Err(QuoteError::InvalidSetting { .. })
        ));
        assert!(matches!(
            settings.set_font_size(0),
            Err(QuoteError::InvalidSetting { .. })
        ));
        assert_eq!(settings.settings(), &Settings::default());
        assert_eq!(store.get(FONT_FAMILY_KEY), None);
    }

    #[test]
    fn test_corrupt_stored_values_fall_back_to_defaults() {
        let store = memory();
        store.set(FONT_FAMILY_KEY, "Comic Sans").unwrap();
        store.set(FONT_SIZE_KEY, "huge").unwrap();
        store.set(DARK_MODE_KEY, "maybe").unwrap();

        let settings = SettingsStore::load(store);
        assert_eq!(settings.settings(), &Settings::default());
    }

    #[test]
    fn test_stored_false_dark_mode_is_respected() {
        let store = memory();
        store.set(DARK_MODE_KEY, "false").unwrap();
        assert!(!SettingsStore::load(store).settings().dark_mode);
    }

    #[test]
    fn test_reset_settings() {
        let store = memory();
        let mut settings = SettingsStore::load(store.clone());
        settings.set_font_family("Ballet").unwrap();
        settings.set_font_size(12).unwrap();

        settings.reset_settings().unwrap();

        assert_eq!(settings.settings(), &Settings::default());
        assert_eq!(store.get(FONT_FAMILY_KEY).as_deref(), Some(DEFAULT_FONT_FAMILY));
        assert_eq!(store.get(FONT_SIZE_KEY).as_deref(), Some("48"));
        assert_eq!(store.get(DARK_MODE_KEY).as_deref(), Some("true"));
    }

    #[test]
    fn test_css_variables() {
        let settings = Settings {
            font_family: "\"Updock\"".to_string(),
            font_size: 30,
            dark_mode: false,
        };
        assert_eq!(
            settings.css_variables(),
            vec![
                ("--font-family", "\"Updock\"".to_string()),
                ("--font-size", "30px".to_string()),
            ]
        );
    }

    #[test]
    fn test_find_font_by_family() {
        assert_eq!(find_font("\"Mea Culpa\"").map(|f| f.name), Some("Mea Culpa"));
        assert!(find_font("Arial").is_none());
    }
}
