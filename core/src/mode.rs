//! Input mode state: English/Table, full-width flags, charset mode.
//!
//! Full-width letter and punctuation flags are kept per top-level mode and
//! persisted through the config store whenever the user flips them.

use crate::candidate::{category, CharsetRestriction};
use crate::config::{keys, ConfigChange, ConfigStore, ConfigValue};
use crate::lexicon::ImeProperties;
use crate::utils;
use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InputMode {
    English,
    #[default]
    Table,
}

impl InputMode {
    fn index(self) -> usize {
        match self {
            Self::English => 0,
            Self::Table => 1,
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Self::English => Self::Table,
            Self::Table => Self::English,
        }
    }
}

/// Candidate charset preference, persisted as 0-4.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CharsetMode {
    Simplified,
    Traditional,
    SimplifiedFirst,
    TraditionalFirst,
    All,
}

impl CharsetMode {
    pub fn from_index(index: i64) -> Option<Self> {
        match index {
            0 => Some(Self::Simplified),
            1 => Some(Self::Traditional),
            2 => Some(Self::SimplifiedFirst),
            3 => Some(Self::TraditionalFirst),
            4 => Some(Self::All),
            _ => None,
        }
    }

    pub fn index(self) -> i64 {
        match self {
            Self::Simplified => 0,
            Self::Traditional => 1,
            Self::SimplifiedFirst => 2,
            Self::TraditionalFirst => 3,
            Self::All => 4,
        }
    }

    /// Cycle 0 → 1 → 2 → 3 → 4 → 0.
    pub fn next(self) -> Self {
        Self::from_index((self.index() + 1) % 5).unwrap_or(Self::Simplified)
    }

    /// Restriction the lexicon applies itself.
    pub fn restriction(self) -> CharsetRestriction {
        match self {
            Self::Simplified => CharsetRestriction::SimplifiedOnly,
            Self::Traditional => CharsetRestriction::TraditionalOnly,
            _ => CharsetRestriction::None,
        }
    }

    /// Local reordering as `(first, second)` category bits.
    pub fn priority(self) -> Option<(u8, u8)> {
        match self {
            Self::SimplifiedFirst => Some((category::SIMPLIFIED, category::TRADITIONAL)),
            Self::TraditionalFirst => Some((category::TRADITIONAL, category::SIMPLIFIED)),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Simplified => "Simplified Chinese Mode",
            Self::Traditional => "Traditional Chinese Mode",
            Self::SimplifiedFirst => "Simplified Chinese First Big Charset Mode",
            Self::TraditionalFirst => "Traditional Chinese First Big Charset Mode",
            Self::All => "Big Chinese Mode",
        }
    }
}

/// Default charset mode from the host locale name. Chinese tables fall back
/// to simplified when the locale says nothing.
pub fn charset_from_locale(locale: Option<&str>, is_chinese: bool) -> Option<CharsetMode> {
    let locale = locale.unwrap_or("");
    let locale = locale.split('.').next().unwrap_or("").to_lowercase();
    if locale.contains("_cn") {
        Some(CharsetMode::Simplified)
    } else if locale.contains("_hk") || locale.contains("_tw") || locale.contains("_mo") {
        Some(CharsetMode::Traditional)
    } else if is_chinese {
        Some(CharsetMode::Simplified)
    } else {
        None
    }
}

/// Closed set of user-facing toggles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ToggleRequest {
    InputMode,
    PhoneticMode,
    SingleChar,
    AutoCommit,
    FullWidthLetter,
    FullWidthPunct,
    CharsetMode,
}

/// Current state of a toggle, for the host to display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Property {
    pub request: ToggleRequest,
    pub active: bool,
    pub label: String,
    pub tooltip: String,
}

impl Property {
    pub fn new(request: ToggleRequest, active: bool, label: &str, tooltip: &str) -> Self {
        Self {
            request,
            active,
            label: label.to_string(),
            tooltip: tooltip.to_string(),
        }
    }
}

/// Mode flags of one engine session.
#[derive(Clone)]
pub struct ModeController {
    config: Arc<dyn ConfigStore>,
    section: String,
    mode: InputMode,
    /// Indexed by `InputMode::index`
    full_width_letter: [bool; 2],
    full_width_punct: [bool; 2],
    auto_commit: bool,
    double_quote_open: bool,
    single_quote_open: bool,
}

impl std::fmt::Debug for ModeController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModeController")
            .field("section", &self.section)
            .field("mode", &self.mode)
            .field("full_width_letter", &self.full_width_letter)
            .field("full_width_punct", &self.full_width_punct)
            .field("auto_commit", &self.auto_commit)
            .finish()
    }
}

fn read_bool(config: &dyn ConfigStore, section: &str, name: &str) -> Result<Option<bool>> {
    Ok(config
        .get(section, name)
        .with_context(|| format!("read {}", name))?
        .and_then(|v| v.as_bool()))
}

impl ModeController {
    pub fn new(config: Arc<dyn ConfigStore>, section: &str, props: &ImeProperties) -> Result<Self> {
        let store = config.as_ref();
        let en_letter = read_bool(store, section, keys::EN_FULL_WIDTH_LETTER)?.unwrap_or(false);
        let tab_letter =
            read_bool(store, section, keys::TAB_FULL_WIDTH_LETTER)?.unwrap_or(props.full_width_letter);
        let en_punct = read_bool(store, section, keys::EN_FULL_WIDTH_PUNCT)?.unwrap_or(false);
        let tab_punct =
            read_bool(store, section, keys::TAB_FULL_WIDTH_PUNCT)?.unwrap_or(props.full_width_punct);
        let auto_commit = read_bool(store, section, keys::AUTO_COMMIT)?.unwrap_or(props.auto_commit);

        Ok(Self {
            config,
            section: section.to_string(),
            mode: InputMode::Table,
            full_width_letter: [en_letter, tab_letter],
            full_width_punct: [en_punct, tab_punct],
            auto_commit,
            double_quote_open: false,
            single_quote_open: false,
        })
    }

    pub fn mode(&self) -> InputMode {
        self.mode
    }

    pub fn is_table(&self) -> bool {
        self.mode == InputMode::Table
    }

    pub fn toggle_mode(&mut self) {
        self.mode = self.mode.toggled();
        debug!(mode = ?self.mode, "input mode switched");
    }

    pub fn full_width_letter(&self) -> bool {
        self.full_width_letter[self.mode.index()]
    }

    pub fn full_width_punct(&self) -> bool {
        self.full_width_punct[self.mode.index()]
    }

    pub fn auto_commit(&self) -> bool {
        self.auto_commit
    }

    pub fn toggle_full_width_letter(&mut self) -> Result<()> {
        let idx = self.mode.index();
        let value = !self.full_width_letter[idx];
        let name = match self.mode {
            InputMode::English => keys::EN_FULL_WIDTH_LETTER,
            InputMode::Table => keys::TAB_FULL_WIDTH_LETTER,
        };
        self.persist(name, value)?;
        self.full_width_letter[idx] = value;
        Ok(())
    }

    pub fn toggle_full_width_punct(&mut self) -> Result<()> {
        let idx = self.mode.index();
        let value = !self.full_width_punct[idx];
        let name = match self.mode {
            InputMode::English => keys::EN_FULL_WIDTH_PUNCT,
            InputMode::Table => keys::TAB_FULL_WIDTH_PUNCT,
        };
        self.persist(name, value)?;
        self.full_width_punct[idx] = value;
        Ok(())
    }

    pub fn toggle_auto_commit(&mut self) -> Result<()> {
        let value = !self.auto_commit;
        self.persist(keys::AUTO_COMMIT, value)?;
        self.auto_commit = value;
        Ok(())
    }

    fn persist(&self, name: &str, value: bool) -> Result<()> {
        debug!(name, value, "toggle");
        self.config
            .set(&self.section, name, ConfigValue::Bool(value))
            .with_context(|| format!("persist {}", name))
    }

    /// Apply a change notification. Returns true when a flag changed.
    pub fn apply_change(&mut self, change: &ConfigChange) -> bool {
        let Some(value) = change.value.as_bool() else {
            return false;
        };
        let slot = match change.name.as_str() {
            keys::AUTO_COMMIT => &mut self.auto_commit,
            keys::EN_FULL_WIDTH_LETTER => &mut self.full_width_letter[0],
            keys::TAB_FULL_WIDTH_LETTER => &mut self.full_width_letter[1],
            keys::EN_FULL_WIDTH_PUNCT => &mut self.full_width_punct[0],
            keys::TAB_FULL_WIDTH_PUNCT => &mut self.full_width_punct[1],
            _ => return false,
        };
        let changed = *slot != value;
        *slot = value;
        changed
    }

    /// Forget open quotation marks.
    pub fn reset_quotes(&mut self) {
        self.double_quote_open = false;
        self.single_quote_open = false;
    }

    /// Convert a typed character to its full-width form.
    ///
    /// `after_digit` is true when the previous key typed a digit that was
    /// committed as is; a `.` then stays a decimal point.
    pub fn to_full_width(&mut self, c: char, after_digit: bool) -> String {
        match c {
            '.' if after_digit => ".".to_string(),
            '.' => "\u{3002}".to_string(),
            '\\' => "\u{3001}".to_string(),
            '^' => "\u{2026}\u{2026}".to_string(),
            '_' => "\u{2014}\u{2014}".to_string(),
            '$' => "\u{ffe5}".to_string(),
            '"' => {
                self.double_quote_open = !self.double_quote_open;
                let quote = if self.double_quote_open { "\u{201c}" } else { "\u{201d}" };
                quote.to_string()
            }
            '\'' => {
                self.single_quote_open = !self.single_quote_open;
                let quote = if self.single_quote_open { "\u{2018}" } else { "\u{2019}" };
                quote.to_string()
            }
            '<' if self.is_table() => "\u{300a}".to_string(),
            '>' if self.is_table() => "\u{300b}".to_string(),
            _ => utils::half_to_full(c).to_string(),
        }
    }

    /// Letter or digit, converted when full-width letters are on.
    pub fn cond_letter(&mut self, c: char, after_digit: bool) -> String {
        if self.full_width_letter() {
            self.to_full_width(c, after_digit)
        } else {
            c.to_string()
        }
    }

    /// Punctuation, converted when full-width punctuation is on.
    pub fn cond_punct(&mut self, c: char, after_digit: bool) -> String {
        if self.full_width_punct() {
            self.to_full_width(c, after_digit)
        } else {
            c.to_string()
        }
    }

    /// Letter/punct conversion picked by character class.
    pub fn convert(&mut self, c: char, after_digit: bool) -> String {
        if c.is_ascii_punctuation() {
            self.cond_punct(c, after_digit)
        } else {
            self.cond_letter(c, after_digit)
        }
    }
}
