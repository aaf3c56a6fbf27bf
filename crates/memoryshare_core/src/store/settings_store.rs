//! Display language and theme store.

use crate::model::settings::{Language, ThemeMode};
use crate::persistence::{PersistenceAdapter, LANGUAGE_KEY, THEME_KEY};
use log::{info, warn};

/// Holds the active language and theme.
pub struct SettingsStore {
    adapter: PersistenceAdapter,
    language: Language,
    theme: ThemeMode,
}

impl SettingsStore {
    /// Restores persisted settings, keeping defaults (`en`, `light`) for any
    /// value that is absent, unreadable or outside its closed set.
    pub fn load(adapter: PersistenceAdapter) -> Self {
        let language = adapter
            .get(LANGUAGE_KEY)
            .and_then(|raw| parse_stored(&raw, LANGUAGE_KEY, Language::parse))
            .unwrap_or_default();
        let theme = adapter
            .get(THEME_KEY)
            .and_then(|raw| parse_stored(&raw, THEME_KEY, ThemeMode::parse))
            .unwrap_or_default();

        info!(
            "event=settings_load module=store status=ok language={} theme={}",
            language.code(),
            theme.code()
        );
        Self {
            adapter,
            language,
            theme,
        }
    }

    pub fn language(&self) -> Language {
        self.language
    }

    pub fn theme(&self) -> ThemeMode {
        self.theme
    }

    pub fn set_language(&mut self, language: Language) {
        self.language = language;
        self.adapter.set(LANGUAGE_KEY, language.code().to_string());
        info!(
            "event=settings_update module=store status=ok field=language value={}",
            language.code()
        );
    }

    pub fn set_theme(&mut self, theme: ThemeMode) {
        self.theme = theme;
        self.adapter.set(THEME_KEY, theme.code().to_string());
        info!(
            "event=settings_update module=store status=ok field=theme value={}",
            theme.code()
        );
    }

    /// Flips between light and dark and returns the new mode.
    pub fn toggle_theme(&mut self) -> ThemeMode {
        let next = self.theme.toggled();
        self.set_theme(next);
        next
    }
}

/// Accepts the bare code (`no`) and its JSON string form (`"no"`).
fn parse_stored<T>(raw: &str, key: &str, parse: fn(&str) -> Option<T>) -> Option<T> {
    let trimmed = raw.trim();
    let parsed = parse(trimmed).or_else(|| {
        serde_json::from_str::<String>(trimmed)
            .ok()
            .and_then(|decoded| parse(decoded.as_str()))
    });
    if parsed.is_none() {
        warn!(
            "event=settings_load module=store status=fallback key={} error_code=unsupported_value",
            key
        );
    }
    parsed
}

#[cfg(test)]
mod tests {
    use super::SettingsStore;
    use crate::db::open_db_in_memory;
    use crate::model::settings::{Language, ThemeMode};
    use crate::persistence::{PersistenceAdapter, LANGUAGE_KEY, THEME_KEY};
    use crate::repo::kv_repo::SqliteKvRepository;
    use std::sync::Arc;

    fn adapter() -> PersistenceAdapter {
        let repo = SqliteKvRepository::new(open_db_in_memory().unwrap());
        PersistenceAdapter::new(Arc::new(repo)).unwrap()
    }

    #[test]
    fn empty_storage_uses_defaults() {
        let store = SettingsStore::load(adapter());
        assert_eq!(store.language(), Language::En);
        assert_eq!(store.theme(), ThemeMode::Light);
    }

    #[test]
    fn json_quoted_values_are_accepted() {
        let adapter = adapter();
        adapter.set(LANGUAGE_KEY, "\"no\"".to_string());
        adapter.set(THEME_KEY, "\"dark\"".to_string());
        let store = SettingsStore::load(adapter);
        assert_eq!(store.language(), Language::No);
        assert_eq!(store.theme(), ThemeMode::Dark);
    }

    #[test]
    fn toggle_theme_flips_and_persists() {
        let adapter = adapter();
        let mut store = SettingsStore::load(adapter.clone());
        assert_eq!(store.toggle_theme(), ThemeMode::Dark);
        assert_eq!(adapter.get(THEME_KEY).as_deref(), Some("dark"));
        assert_eq!(store.toggle_theme(), ThemeMode::Light);
    }
}
