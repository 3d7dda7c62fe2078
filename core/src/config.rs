//! Persisted per-IME settings and change notification.
//!
//! Settings live under a section named after the IME
//! (`engine/Table/<Name>`). The engine reads initial toggles from the store,
//! writes toggles back when the user flips them, and picks up changes made by
//! other parties through a subscription channel.

use anyhow::{Context, Result};
use std::collections::HashMap;
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Mutex;

/// Setting names understood by the engine.
pub mod keys {
    pub const LOOKUP_TABLE_SIZE: &str = "LookupTableSize";
    pub const LOOKUP_TABLE_ORIENTATION: &str = "LookupTableOrientation";
    pub const LOOKUP_TABLE_SELECT_KEYS: &str = "LookupTableSelectKeys";
    pub const ONE_CHAR: &str = "OneChar";
    pub const AUTO_SELECT: &str = "AutoSelect";
    pub const AUTO_COMMIT: &str = "AutoCommit";
    pub const CHINESE_MODE: &str = "ChineseMode";
    pub const EN_FULL_WIDTH_LETTER: &str = "EnDefFullWidthLetter";
    pub const EN_FULL_WIDTH_PUNCT: &str = "EnDefFullWidthPunct";
    pub const TAB_FULL_WIDTH_LETTER: &str = "TabDefFullWidthLetter";
    pub const TAB_FULL_WIDTH_PUNCT: &str = "TabDefFullWidthPunct";
}

/// Config section for an IME name.
pub fn section_for(ime_name: &str) -> String {
    format!("engine/Table/{}", ime_name.replace(' ', "_"))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigValue {
    Bool(bool),
    Int(i64),
    Str(String),
}

impl ConfigValue {
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            _ => None,
        }
    }
}

impl From<bool> for ConfigValue {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<i64> for ConfigValue {
    fn from(i: i64) -> Self {
        Self::Int(i)
    }
}

impl From<&str> for ConfigValue {
    fn from(s: &str) -> Self {
        Self::Str(s.to_string())
    }
}

/// A `(section, name, value)` change event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigChange {
    pub section: String,
    pub name: String,
    pub value: ConfigValue,
}

/// Config store capability handed to the engine.
pub trait ConfigStore {
    fn get(&self, section: &str, name: &str) -> Result<Option<ConfigValue>>;

    fn set(&self, section: &str, name: &str, value: ConfigValue) -> Result<()>;

    /// Receive every subsequent change, including the subscriber's own.
    fn subscribe(&self) -> Receiver<ConfigChange>;
}

/// In-memory config store.
#[derive(Debug, Default)]
pub struct MemoryConfig {
    values: Mutex<HashMap<(String, String), ConfigValue>>,
    subscribers: Mutex<Vec<Sender<ConfigChange>>>,
}

impl MemoryConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a store from TOML. Each top-level table is a section; booleans,
    /// integers and strings inside it become values, anything else is
    /// skipped.
    ///
    /// ```toml
    /// ["engine/Table/Wubi"]
    /// AutoCommit = true
    /// LookupTableSize = 9
    /// ```
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let table: toml::Table = toml::from_str(content).context("parse config TOML")?;
        let store = Self::new();
        {
            let mut values = store.lock_values()?;
            for (section, body) in table {
                let Some(body) = body.as_table() else {
                    continue;
                };
                for (name, value) in body {
                    let value = match value {
                        toml::Value::Boolean(b) => ConfigValue::Bool(*b),
                        toml::Value::Integer(i) => ConfigValue::Int(*i),
                        toml::Value::String(s) => ConfigValue::Str(s.clone()),
                        _ => continue,
                    };
                    values.insert((section.clone(), name.clone()), value);
                }
            }
        }
        Ok(store)
    }

    fn lock_values(
        &self,
    ) -> Result<std::sync::MutexGuard<'_, HashMap<(String, String), ConfigValue>>> {
        self.values
            .lock()
            .map_err(|_| anyhow::anyhow!("config store lock poisoned"))
    }
}

impl ConfigStore for MemoryConfig {
    fn get(&self, section: &str, name: &str) -> Result<Option<ConfigValue>> {
        let values = self.lock_values()?;
        Ok(values
            .get(&(section.to_string(), name.to_string()))
            .cloned())
    }

    fn set(&self, section: &str, name: &str, value: ConfigValue) -> Result<()> {
        self.lock_values()?
            .insert((section.to_string(), name.to_string()), value.clone());

        let change = ConfigChange {
            section: section.to_string(),
            name: name.to_string(),
            value,
        };
        let mut subscribers = self
            .subscribers
            .lock()
            .map_err(|_| anyhow::anyhow!("config subscriber lock poisoned"))?;
        // Dropped receivers are pruned here.
        subscribers.retain(|tx| tx.send(change.clone()).is_ok());
        Ok(())
    }

    fn subscribe(&self) -> Receiver<ConfigChange> {
        let (tx, rx) = mpsc::channel();
        if let Ok(mut subscribers) = self.subscribers.lock() {
            subscribers.push(tx);
        }
        rx
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_section_name() {
        assert_eq!(section_for("Wubi 86"), "engine/Table/Wubi_86");
    }

    #[test]
    fn test_get_set() {
        let store = MemoryConfig::new();
        assert_eq!(store.get("s", keys::AUTO_COMMIT).unwrap(), None);
        store.set("s", keys::AUTO_COMMIT, true.into()).unwrap();
        assert_eq!(
            store.get("s", keys::AUTO_COMMIT).unwrap(),
            Some(ConfigValue::Bool(true))
        );
    }

    #[test]
    fn test_subscribers_see_changes_in_order() {
        let store = MemoryConfig::new();
        let rx = store.subscribe();
        store.set("s", keys::CHINESE_MODE, 2i64.into()).unwrap();
        store.set("s", keys::CHINESE_MODE, 3i64.into()).unwrap();
        let seen: Vec<i64> = rx.try_iter().filter_map(|c| c.value.as_int()).collect();
        assert_eq!(seen, vec![2, 3]);
    }

    #[test]
    fn test_dropped_subscriber_is_pruned() {
        let store = MemoryConfig::new();
        drop(store.subscribe());
        store.set("s", "k", true.into()).unwrap();
        assert!(store.subscribers.lock().unwrap().is_empty());
    }

    #[test]
    fn test_from_toml() {
        let store = MemoryConfig::from_toml_str(
            r#"
            ["engine/Table/Wubi"]
            AutoCommit = true
            LookupTableSize = 9
            LookupTableSelectKeys = "asdfghjkl"
            Ignored = 1.5
            "#,
        )
        .unwrap();
        let s = "engine/Table/Wubi";
        assert_eq!(store.get(s, "AutoCommit").unwrap(), Some(ConfigValue::Bool(true)));
        assert_eq!(store.get(s, "LookupTableSize").unwrap(), Some(ConfigValue::Int(9)));
        assert_eq!(
            store.get(s, "LookupTableSelectKeys").unwrap().unwrap().as_str(),
            Some("asdfghjkl")
        );
        assert_eq!(store.get(s, "Ignored").unwrap(), None);
    }
}
