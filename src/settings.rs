//! Player preferences: color theme and music toggle.
//!
//! Persisted as one JSON blob, separately from progression.

use serde::{Deserialize, Serialize};

use crate::store::{Store, keys};

/// Display theme; swaps the render palette
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Light => "Light",
            Theme::Dark => "Dark",
        }
    }

    pub fn toggled(&self) -> Theme {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }
}

/// Game settings/preferences
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    pub theme: Theme,
    /// Gates background music and sound effects alike
    pub music: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            theme: Theme::Light,
            music: true,
        }
    }
}

impl Settings {
    /// Load settings, defaulting on anything missing or unparseable
    pub fn load(store: &dyn Store) -> Self {
        if let Some(json) = store.get(keys::SETTINGS) {
            if let Ok(settings) = serde_json::from_str(&json) {
                return settings;
            }
            log::warn!("Unreadable settings; using defaults");
        }
        Self::default()
    }

    pub fn save(&self, store: &dyn Store) {
        match serde_json::to_string(self) {
            Ok(json) => store.set(keys::SETTINGS, &json),
            Err(e) => log::warn!("Failed to encode settings: {e}"),
        }
    }

    pub fn toggle_theme(&mut self, store: &dyn Store) {
        self.theme = self.theme.toggled();
        self.save(store);
    }

    pub fn toggle_music(&mut self, store: &dyn Store) {
        self.music = !self.music;
        self.save(store);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    #[test]
    fn test_settings_persist_across_load() {
        let store = MemoryStore::new();
        let mut settings = Settings::load(&store);
        assert_eq!(settings.theme, Theme::Light);
        assert!(settings.music);

        settings.toggle_theme(&store);
        settings.toggle_music(&store);

        let reloaded = Settings::load(&store);
        assert_eq!(reloaded.theme, Theme::Dark);
        assert!(!reloaded.music);
    }

    #[test]
    fn test_corrupt_settings_fall_back() {
        let store = MemoryStore::new();
        store.set(keys::SETTINGS, "not json");
        let settings = Settings::load(&store);
        assert_eq!(settings.theme, Theme::Light);
    }
}
