//! Front-end configuration that extends the base `Config` from core.
//!
//! This configuration includes:
//! - All engine options from `libtable_core::Config` (flattened via serde)
//! - Paths of the table source and the optional phonetic source
//! - Seed values for the per-IME toggle store, one TOML table per section
//!
//! # Example
//!
//! ```rust
//! use libtable::TableConfig;
//!
//! let config = TableConfig::from_toml_str(r#"
//! page_size = 9
//! table = "wubi.txt"
//!
//! [settings."engine/Table/Wubi"]
//! AutoCommit = true
//! "#).unwrap();
//! assert_eq!(config.base().page_size, 9);
//! ```

use anyhow::{Context, Result};
use libtable_core::MemoryConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct TableConfig {
    /// Base engine fields (page size, select keys, cache size, etc.)
    #[serde(flatten)]
    pub base: libtable_core::Config,

    /// Table source file
    pub table: Option<PathBuf>,

    /// Phonetic source file, used when the table declares `PINYIN_MODE`
    pub pinyin: Option<PathBuf>,

    /// Initial toggle values keyed by config section
    pub settings: toml::Table,
}

impl TableConfig {
    /// Load from a TOML file. Relative source paths are resolved against the
    /// file's directory.
    pub fn load_toml<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("read config {}", path.display()))?;
        let mut config = Self::from_toml_str(&content)
            .with_context(|| format!("parse config {}", path.display()))?;
        if let Some(dir) = path.parent() {
            config.table = config.table.map(|p| dir.join(p));
            config.pinyin = config.pinyin.map(|p| dir.join(p));
        }
        Ok(config)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Build a toggle store seeded from `settings`.
    pub fn store(&self) -> Result<MemoryConfig> {
        let seed = toml::to_string(&self.settings).context("serialize settings")?;
        MemoryConfig::from_toml_str(&seed)
    }

    /// Fill the engine locale from host variables unless the file set one.
    /// `LC_CTYPE` takes precedence over `LANG`; empty values are skipped.
    pub fn fill_locale(&mut self, lc_ctype: Option<String>, lang: Option<String>) {
        if self.base.locale.is_none() {
            self.base.locale = lc_ctype.into_iter().chain(lang).find(|v| !v.is_empty());
        }
    }

    /// Get a reference to the base config
    pub fn base(&self) -> &libtable_core::Config {
        &self.base
    }

    /// Convert into the base config for use with `TableEngine::new()`
    pub fn into_base(self) -> libtable_core::Config {
        self.base
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use libtable_core::{ConfigStore, ConfigValue};

    #[test]
    fn test_flattened_base_and_settings() {
        let config = TableConfig::from_toml_str(
            r#"
select_keys = "asdf"
pinyin = "pinyin.txt"

[settings."engine/Table/Wubi"]
AutoCommit = true
LookupTableSize = 9
"#,
        )
        .unwrap();
        assert_eq!(config.base().select_keys, "asdf");
        assert_eq!(config.base().page_size, 6);
        assert_eq!(config.pinyin.as_deref(), Some(Path::new("pinyin.txt")));
        assert!(config.table.is_none());

        let store = config.store().unwrap();
        assert_eq!(
            store.get("engine/Table/Wubi", "AutoCommit").unwrap(),
            Some(ConfigValue::Bool(true))
        );
        assert_eq!(
            store.get("engine/Table/Wubi", "LookupTableSize").unwrap(),
            Some(ConfigValue::Int(9))
        );
    }

    #[test]
    fn test_fill_locale() {
        let mut config = TableConfig::default();
        config.fill_locale(Some(String::new()), Some("zh_TW.UTF-8".into()));
        assert_eq!(config.base().locale.as_deref(), Some("zh_TW.UTF-8"));

        let mut config = TableConfig::from_toml_str("locale = \"zh_CN\"").unwrap();
        config.fill_locale(Some("en_US".into()), None);
        assert_eq!(config.base().locale.as_deref(), Some("zh_CN"));
    }

    #[test]
    fn test_empty_config() {
        let config = TableConfig::from_toml_str("").unwrap();
        assert_eq!(config.base().max_length, 64);
        assert!(config.settings.is_empty());
        assert!(config.store().is_ok());
    }
}
