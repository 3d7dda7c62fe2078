//! Key-code parsing for table grammars.
//!
//! A table addresses phrases by sequences of `ParsedCode`s. The parser decides
//! which characters belong to the grammar; characters it rejects end up in
//! the editor's invalid tail instead of raising an error.

use serde::{Deserialize, Serialize};

/// Characters accepted in phonetic sub-mode: pinyin letters plus the tone
/// symbols `!@#$%` standing for tones 1-5.
pub const PHONETIC_CHARS: &str = "abcdefghijklmnopqrstuvwxyz!@#$%";

/// Tone symbols used in phonetic sub-mode, in tone order.
pub const TONE_SYMBOLS: [char; 5] = ['!', '@', '#', '$', '%'];

/// Default key list; a code's ordinal is its 1-based position here.
pub const DEFAULT_TAB_KEYS: &str =
    "abcdefghijklmnopqrstuvwxyz,./;'[]\\-=`0123456789!@#$%^&*()_+{}|:\"<>?~";

/// A single parsed key code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ParsedCode {
    key: char,
    ordinal: u16,
}

impl ParsedCode {
    pub fn new(key: char, ordinal: u16) -> Self {
        Self { key, ordinal }
    }

    /// The key character this code was parsed from.
    pub fn key(&self) -> char {
        self.key
    }

    /// Position of the key in the parser's key list (1-based).
    pub fn ordinal(&self) -> u16 {
        self.ordinal
    }
}

/// Parser/deparser pair for a table grammar.
pub trait CodeParser {
    /// Parse one input character. `None` means the character is outside the
    /// grammar.
    fn parse(&self, ch: char) -> Option<ParsedCode>;

    /// Display fragment for a code (used for the code remainder column).
    fn deparse(&self, code: &ParsedCode) -> String;

    /// Parse a run of characters, skipping those outside the grammar.
    fn parse_all(&self, chars: &[char]) -> Vec<ParsedCode> {
        chars.iter().filter_map(|&c| self.parse(c)).collect()
    }

    /// Deparse a code sequence into a display string.
    fn deparse_all(&self, codes: &[ParsedCode]) -> String {
        codes.iter().map(|c| self.deparse(c)).collect()
    }
}

/// Parser over a fixed key list, one code per key.
#[derive(Debug, Clone)]
pub struct TabKeyParser {
    keys: Vec<char>,
}

impl TabKeyParser {
    pub fn new(keys: &str) -> Self {
        Self {
            keys: keys.chars().collect(),
        }
    }

    /// The key list in ordinal order.
    pub fn keys(&self) -> &[char] {
        &self.keys
    }

    /// Whether a character appears in the key list.
    pub fn contains(&self, ch: char) -> bool {
        self.keys.contains(&ch)
    }
}

impl Default for TabKeyParser {
    fn default() -> Self {
        Self::new(DEFAULT_TAB_KEYS)
    }
}

impl CodeParser for TabKeyParser {
    fn parse(&self, ch: char) -> Option<ParsedCode> {
        self.keys
            .iter()
            .position(|&k| k == ch)
            .map(|idx| ParsedCode::new(ch, (idx + 1) as u16))
    }

    fn deparse(&self, code: &ParsedCode) -> String {
        code.key().to_string()
    }
}

/// Render tone symbols as `↑1`..`↑5` for candidate code remainders.
pub fn restore_tone_marks(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match TONE_SYMBOLS.iter().position(|&t| t == ch) {
            Some(idx) => {
                out.push('↑');
                out.push(char::from(b'1' + idx as u8));
            }
            None => out.push(ch),
        }
    }
    out
}

/// Render tone symbols as plain digits for auxiliary text.
pub fn tone_symbols_to_digits(s: &str) -> String {
    s.chars()
        .map(|ch| match TONE_SYMBOLS.iter().position(|&t| t == ch) {
            Some(idx) => char::from(b'1' + idx as u8),
            None => ch,
        })
        .collect()
}
