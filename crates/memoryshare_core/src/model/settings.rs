//! Display settings: language and theme.
//!
//! Both enums are closed sets; parsing anything else yields `None` so an
//! invalid value can never be held in memory.

use serde::{Deserialize, Serialize};

/// Supported UI languages.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    /// English.
    #[default]
    En,
    /// Norwegian.
    No,
}

impl Language {
    pub const ALL: [Language; 2] = [Language::En, Language::No];

    /// Locale code persisted and exchanged with the UI.
    pub fn code(self) -> &'static str {
        match self {
            Self::En => "en",
            Self::No => "no",
        }
    }

    /// Parses an exact locale code.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "en" => Some(Self::En),
            "no" => Some(Self::No),
            _ => None,
        }
    }
}

/// Display mode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemeMode {
    #[default]
    Light,
    Dark,
}

impl ThemeMode {
    pub fn code(self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Dark => "dark",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "light" => Some(Self::Light),
            "dark" => Some(Self::Dark),
            _ => None,
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Self::Light => Self::Dark,
            Self::Dark => Self::Light,
        }
    }
}
