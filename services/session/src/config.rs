//! Session configuration
//!
//! Loaded from TOML. Carries the symbol table (symbol and tick size per
//! instrument) and the session's operational knobs.

use std::path::Path;

use rust_decimal::Decimal;
use serde::Deserialize;
use thiserror::Error;
use types::symbol::{SymbolSpec, SymbolTable};

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
}

#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    /// Levels returned by depth queries.
    #[serde(default = "default_depth_levels")]
    pub depth_levels: usize,
    /// Optional cap on resting orders per book.
    #[serde(default)]
    pub book_capacity: Option<usize>,
    pub symbols: Vec<SymbolConfig>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SymbolConfig {
    pub symbol: String,
    pub tick: Decimal,
}

fn default_depth_levels() -> usize {
    10
}

impl SessionConfig {
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        Self::from_toml_str(&std::fs::read_to_string(path)?)
    }

    pub fn symbol_table(&self) -> SymbolTable {
        self.symbols
            .iter()
            .map(|config| SymbolSpec::new(config.symbol.as_str(), config.tick))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use types::symbol::Symbol;

    #[test]
    fn test_parse_config() {
        let config = SessionConfig::from_toml_str(
            r#"
            depth_levels = 5

            [[symbols]]
            symbol = "ACME"
            tick = "0.01"

            [[symbols]]
            symbol = "WIDG"
            tick = "0.25"
            "#,
        )
        .unwrap();

        assert_eq!(config.depth_levels, 5);
        assert_eq!(config.book_capacity, None);

        let table = config.symbol_table();
        assert_eq!(table.len(), 2);
        assert!(table.contains(&Symbol::new("WIDG")));
    }

    #[test]
    fn test_defaults() {
        let config = SessionConfig::from_toml_str(
            r#"
            [[symbols]]
            symbol = "ACME"
            tick = "0.01"
            "#,
        )
        .unwrap();

        assert_eq!(config.depth_levels, 10);
    }

    #[test]
    fn test_invalid_toml_is_an_error() {
        assert!(SessionConfig::from_toml_str("symbols = 3").is_err());
    }
}
