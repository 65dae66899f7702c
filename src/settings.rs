use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::categorizer::{CategoryRule, CategoryTable};
use crate::error::{FintrackError, Result};

pub const CONFIG_ENV: &str = "FINTRACK_CONFIG";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Spreadsheet loaded when no file is given.
    #[serde(default = "default_fallback_file")]
    pub fallback_file: String,
    #[serde(default = "default_currency_symbol")]
    pub currency_symbol: String,
    /// Net savings below this are reported as low.
    #[serde(default = "default_low_savings_threshold")]
    pub low_savings_threshold: f64,
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Replaces the built-in keyword table when present. Order is significant.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub categories: Option<Vec<CategoryRule>>,
}

fn default_fallback_file() -> String {
    "data/transactions_3months.xlsx".to_string()
}

fn default_currency_symbol() -> String {
    "\u{20b9}".to_string()
}

fn default_low_savings_threshold() -> f64 {
    5000.0
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8501
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            fallback_file: default_fallback_file(),
            currency_symbol: default_currency_symbol(),
            low_savings_threshold: default_low_savings_threshold(),
            host: default_host(),
            port: default_port(),
            categories: None,
        }
    }
}

impl Settings {
    pub fn category_table(&self) -> CategoryTable {
        match &self.categories {
            Some(rules) => CategoryTable::new(rules.clone()),
            None => CategoryTable::builtin(),
        }
    }
}

fn config_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config")
        .join("fintrack")
}

pub fn settings_path() -> PathBuf {
    match std::env::var_os(CONFIG_ENV) {
        Some(p) if !p.is_empty() => PathBuf::from(p),
        _ => config_dir().join("settings.json"),
    }
}

pub fn load_settings() -> Settings {
    let path = settings_path();
    if !path.exists() {
        return Settings::default();
    }
    let content = std::fs::read_to_string(&path).unwrap_or_default();
    match serde_json::from_str(&content) {
        Ok(s) => s,
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "Ignoring unreadable settings file");
            Settings::default()
        }
    }
}

pub fn save_settings(settings: &Settings) -> Result<PathBuf> {
    let path = settings_path();
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir)?;
    }
    let json = serde_json::to_string_pretty(settings)
        .map_err(|e| FintrackError::Settings(e.to_string()))?;
    std::fs::write(&path, format!("{json}\n"))?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let s = Settings::default();
        assert_eq!(s.fallback_file, "data/transactions_3months.xlsx");
        assert_eq!(s.low_savings_threshold, 5000.0);
        assert!(s.categories.is_none());
    }

    #[test]
    fn test_load_merges_with_defaults() {
        let json = r#"{"currency_symbol": "$", "port": 9000}"#;
        let s: Settings = serde_json::from_str(json).unwrap();
        assert_eq!(s.currency_symbol, "$");
        assert_eq!(s.port, 9000);
        assert_eq!(s.host, "127.0.0.1");
        assert_eq!(s.low_savings_threshold, 5000.0);
    }

    #[test]
    fn test_custom_categories_keep_order() {
        let json = r#"{"categories": [
            {"name": "Coffee", "keywords": ["starbucks"]},
            {"name": "Food", "keywords": ["starbucks", "pizza"]}
        ]}"#;
        let s: Settings = serde_json::from_str(json).unwrap();
        let table = s.category_table();
        assert_eq!(table.categorize("STARBUCKS #12"), "Coffee");
        assert_eq!(table.categorize("Pizza Hut"), "Food");
    }

    #[test]
    fn test_roundtrip_through_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        let settings = Settings {
            currency_symbol: "EUR ".to_string(),
            ..Settings::default()
        };
        let json = serde_json::to_string_pretty(&settings).unwrap();
        std::fs::write(&path, &json).unwrap();
        let loaded: Settings = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(loaded.currency_symbol, "EUR ");
        assert_eq!(loaded.port, 8501);
    }
}
