//! libtable-core
//!
//! Composition engine for table-based input methods (Wubi, Cangjie, Zhengma
//! and friends). The engine turns key events into preedit text, a paged
//! candidate list, auxiliary hints and committed strings. Phrase storage and
//! settings persistence are collaborators behind the [`Lexicon`] and
//! [`ConfigStore`] traits.
//!
//! Public API:
//! - `TableEngine` - key dispatch, mode handling and UI state
//! - `Editor` - input buffer, preedit segments and candidate retrieval
//! - `Lexicon` / `MemoryLexicon` - phrase lookup and learning
//! - `ConfigStore` / `MemoryConfig` - persisted toggles and change events
//! - `ImeContext` - data handed to the host after each key
//! - `Config` - engine-level tuning loaded from TOML
use serde::{Deserialize, Serialize};

pub mod key_event;
pub use key_event::{keysym, KeyEvent, ModifierType};

pub mod parser;
pub use parser::{CodeParser, ParsedCode, TabKeyParser};

pub mod candidate;
pub use candidate::{Candidate, CharsetRestriction, PhraseOrigin};

pub mod lookup_table;
pub use lookup_table::{LookupTable, Orientation};

pub mod input_buffer;
pub use input_buffer::InputBuffer;

pub mod preedit;
pub use preedit::{PreeditCursor, PreeditStore};

pub mod composition;
pub use composition::{Composition, PreeditSpan, SpanKind};

pub mod config;
pub use config::{ConfigChange, ConfigStore, ConfigValue, MemoryConfig};

pub mod lexicon;
pub use lexicon::{ImeProperties, Lexicon, MemoryLexicon};

pub mod mode;
pub use mode::{CharsetMode, InputMode, ModeController, Property, ToggleRequest};

pub mod editor;
pub use editor::{CommitOutcome, Editor, EditorState};

pub mod context;
pub use context::ImeContext;

pub mod engine;
pub use engine::{KeyResult, TableEngine};

/// Engine-level configuration.
///
/// Per-IME toggles (full-width modes, charset mode and so on) live in the
/// [`ConfigStore`]; this struct carries the defaults and limits that are not
/// user toggles.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    /// Candidates per lookup table page, unless the store overrides it
    pub page_size: usize,

    /// Lookup table orientation, unless the store overrides it
    pub orientation: Orientation,

    /// Keys for selecting candidates (default "123456789").
    /// First char selects the 1st candidate on the page, and so on.
    pub select_keys: String,

    // Cache Management
    /// Maximum number of entries in the code -> candidates cache
    pub max_cache_size: usize,

    /// Most characters typed before a commit is forced
    pub max_length: usize,

    /// Longest spelling accepted in phonetic sub-mode, tone included
    pub phonetic_max_key_length: usize,

    /// Host locale (`zh_TW.UTF-8` and the like), consulted for the default
    /// charset mode when neither the store nor the table sets one
    pub locale: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            page_size: 6,
            orientation: Orientation::Vertical,
            select_keys: "123456789".to_string(),
            max_cache_size: 1000,
            max_length: 64,
            phonetic_max_key_length: 7,
            locale: None,
        }
    }
}

impl Config {
    /// Load configuration from TOML string.
    pub fn from_toml_str(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Set the selection keys from a plain key string (`"asdfghjkl"`) or a
    /// comma separated list (`"1,2,3"`). Returns false and keeps the current
    /// keys when `value` names no key.
    ///
    /// # Example
    /// ```
    /// # use libtable_core::Config;
    /// let mut config = Config::default();
    /// assert!(config.set_select_keys("a, s, d"));
    /// assert_eq!(config.selection_key_index('d'), Some(2));
    /// assert!(!config.set_select_keys(" "));
    /// assert_eq!(config.select_keys, "asd");
    /// ```
    pub fn set_select_keys(&mut self, value: &str) -> bool {
        let keys: String = if value.contains(',') {
            value
                .split(',')
                .filter_map(|part| part.trim().chars().next())
                .collect()
        } else {
            value.chars().filter(|c| !c.is_whitespace()).collect()
        };
        if keys.is_empty() {
            return false;
        }
        self.select_keys = keys;
        true
    }

    /// Check if a character is a selection key and return its index (0-based).
    pub fn selection_key_index(&self, ch: char) -> Option<usize> {
        self.select_keys.chars().position(|c| c == ch)
    }
}

/// Utility helpers.
pub mod utils {
    /// `(first half-width code point, first full-width code point, run length)`
    const HALF_FULL_RUNS: &[(u32, u32, u32)] = &[
        (0x0020, 0x3000, 1),
        (0x0021, 0xFF01, 0x5E),
        (0x00A2, 0xFFE0, 2),
        (0x00A5, 0xFFE5, 1),
        (0x00A6, 0xFFE4, 1),
        (0x00AC, 0xFFE2, 1),
        (0x00AF, 0xFFE3, 1),
        (0x20A9, 0xFFE6, 1),
        (0xFF61, 0x3002, 1),
        (0xFF62, 0x300C, 2),
        (0xFF64, 0x3001, 1),
        (0xFF65, 0x30FB, 1),
        (0xFF66, 0x30F2, 1),
        (0xFF67, 0x30A1, 1),
        (0xFF68, 0x30A3, 1),
        (0xFF69, 0x30A5, 1),
        (0xFF6A, 0x30A7, 1),
        (0xFF6B, 0x30A9, 1),
        (0xFF6C, 0x30E3, 1),
        (0xFF6D, 0x30E5, 1),
        (0xFF6E, 0x30E7, 1),
        (0xFF6F, 0x30C3, 1),
        (0xFF70, 0x30FC, 1),
        (0xFF71, 0x30A2, 1),
        (0xFF72, 0x30A4, 1),
        (0xFF73, 0x30A6, 1),
        (0xFF74, 0x30A8, 1),
        (0xFF75, 0x30AA, 2),
        (0xFF77, 0x30AD, 1),
        (0xFF78, 0x30AF, 1),
        (0xFF79, 0x30B1, 1),
        (0xFF7A, 0x30B3, 1),
        (0xFF7B, 0x30B5, 1),
        (0xFF7C, 0x30B7, 1),
        (0xFF7D, 0x30B9, 1),
        (0xFF7E, 0x30BB, 1),
        (0xFF7F, 0x30BD, 1),
        (0xFF80, 0x30BF, 1),
        (0xFF81, 0x30C1, 1),
        (0xFF82, 0x30C4, 1),
        (0xFF83, 0x30C6, 1),
        (0xFF84, 0x30C8, 1),
        (0xFF85, 0x30CA, 6),
        (0xFF8B, 0x30D2, 1),
        (0xFF8C, 0x30D5, 1),
        (0xFF8D, 0x30D8, 1),
        (0xFF8E, 0x30DB, 1),
        (0xFF8F, 0x30DE, 5),
        (0xFF94, 0x30E4, 1),
        (0xFF95, 0x30E6, 1),
        (0xFF96, 0x30E8, 6),
        (0xFF9C, 0x30EF, 1),
        (0xFF9D, 0x30F3, 1),
        (0xFFA0, 0x3164, 1),
        (0xFFA1, 0x3131, 30),
        (0xFFC2, 0x314F, 6),
        (0xFFCA, 0x3155, 6),
        (0xFFD2, 0x315B, 9),
        (0xFFE9, 0x2190, 4),
        (0xFFED, 0x25A0, 1),
        (0xFFEE, 0x25CB, 1),
    ];

    /// Full-width (or wide) form of a character; characters without one
    /// come back unchanged.
    pub fn half_to_full(ch: char) -> char {
        let code = ch as u32;
        HALF_FULL_RUNS
            .iter()
            .find(|&&(half, _, len)| code >= half && code < half + len)
            .and_then(|&(half, full, _)| char::from_u32(full + (code - half)))
            .unwrap_or(ch)
    }

    /// Convert a string to full-width form, see [`half_to_full`].
    pub fn to_fullwidth(s: &str) -> String {
        s.chars().map(half_to_full).collect()
    }
}
