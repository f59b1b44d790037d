//! Localized strings for progression messages
//!
//! Lookups fall back from the active table to the built-in English table,
//! then to a `[key]` placeholder. A missing key never fails.

use std::collections::HashMap;
use std::sync::RwLock;

use serde::{Deserialize, Serialize};

/// Supported languages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Language {
    #[default]
    English,
    Spanish,
    French,
    German,
}

impl Language {
    pub fn code(&self) -> &'static str {
        match self {
            Language::English => "en",
            Language::Spanish => "es",
            Language::French => "fr",
            Language::German => "de",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code.to_lowercase().as_str() {
            "en" => Some(Language::English),
            "es" => Some(Language::Spanish),
            "fr" => Some(Language::French),
            "de" => Some(Language::German),
            _ => None,
        }
    }
}

const ENGLISH: &[(&str, &str)] = &[
    ("progress.level_up", "Level {level}!"),
    ("progress.boss_incoming", "Warning: {boss} approaching"),
    ("progress.boss_defeated", "{boss} destroyed!"),
    ("progress.game_over", "Game over"),
    ("achievement.unlocked", "Achievement unlocked: {name}"),
    ("achievement.first_blood", "First Blood"),
    ("achievement.sharpshooter", "Sharpshooter"),
    ("achievement.boss_hunter", "Boss Hunter"),
    ("achievement.coin_collector", "Coin Collector"),
    ("achievement.veteran", "Veteran"),
    ("boss.destroyer", "Destroyer"),
    ("boss.carrier", "Carrier"),
];

/// Flat key → text table, loaded from JSON
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StringTable(HashMap<String, String>);

impl StringTable {
    pub fn english() -> Self {
        Self(
            ENGLISH
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        )
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

struct Tables {
    active: Language,
    loaded: HashMap<Language, StringTable>,
}

/// Localization manager
pub struct LanguageManager {
    fallback: StringTable,
    tables: RwLock<Tables>,
}

impl std::fmt::Debug for LanguageManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LanguageManager")
            .field("active", &self.active())
            .finish_non_exhaustive()
    }
}

impl Default for LanguageManager {
    fn default() -> Self {
        Self::new(Language::English)
    }
}

impl LanguageManager {
    pub fn new(active: Language) -> Self {
        Self {
            fallback: StringTable::english(),
            tables: RwLock::new(Tables {
                active,
                loaded: HashMap::new(),
            }),
        }
    }

    pub fn active(&self) -> Language {
        self.tables.read().unwrap_or_else(|e| e.into_inner()).active
    }

    pub fn set_active(&self, language: Language) {
        self.tables.write().unwrap_or_else(|e| e.into_inner()).active = language;
    }

    /// Install (or replace) the table for a language
    pub fn load_table(&self, language: Language, table: StringTable) {
        log::info!("Loaded {} strings for '{}'", table.len(), language.code());
        self.tables
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .loaded
            .insert(language, table);
    }

    /// Text for `key` in the active language
    pub fn text(&self, key: &str) -> String {
        let tables = self.tables.read().unwrap_or_else(|e| e.into_inner());
        tables
            .loaded
            .get(&tables.active)
            .and_then(|t| t.get(key))
            .or_else(|| self.fallback.get(key))
            .map(str::to_string)
            .unwrap_or_else(|| {
                log::debug!("Missing string '{key}'");
                format!("[{key}]")
            })
    }

    /// Text for `key` with `{name}` arguments substituted
    pub fn format(&self, key: &str, args: &[(&str, &str)]) -> String {
        args.iter().fold(self.text(key), |text, (name, value)| {
            text.replace(&format!("{{{name}}}"), value)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_key_is_placeholder() {
        let lang = LanguageManager::default();
        assert_eq!(lang.text("no.such.key"), "[no.such.key]");
    }

    #[test]
    fn test_format_substitutes() {
        let lang = LanguageManager::default();
        assert_eq!(lang.format("progress.level_up", &[("level", "4")]), "Level 4!");
    }

    #[test]
    fn test_active_table_with_english_fallback() {
        let lang = LanguageManager::new(Language::Spanish);
        let table = StringTable::from_json(r#"{"progress.level_up": "¡Nivel {level}!"}"#).unwrap();
        lang.load_table(Language::Spanish, table);

        assert_eq!(lang.format("progress.level_up", &[("level", "2")]), "¡Nivel 2!");
        assert_eq!(lang.text("progress.game_over"), "Game over");

        lang.set_active(Language::English);
        assert_eq!(lang.format("progress.level_up", &[("level", "2")]), "Level 2!");
    }

    #[test]
    fn test_language_codes() {
        for lang in [Language::English, Language::Spanish, Language::French, Language::German] {
            assert_eq!(Language::from_code(lang.code()), Some(lang));
        }
        assert_eq!(Language::from_code("xx"), None);
    }
}
