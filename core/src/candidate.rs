//! Candidate phrases returned by the lexicon, and charset-priority filtering.

use crate::parser::ParsedCode;
use serde::{Deserialize, Serialize};

/// Charset category bits carried by each candidate.
pub mod category {
    pub const SIMPLIFIED: u8 = 1;
    pub const TRADITIONAL: u8 = 1 << 1;
    pub const EXTENDED: u8 = 1 << 2;
}

/// A phrase matching the typed code prefix.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candidate {
    pub phrase: String,
    /// Full code of the phrase as stored in the lexicon.
    pub codes: Vec<ParsedCode>,
    /// Display string for the codes beyond what has been typed.
    /// Filled in by the editor when the candidate enters the lookup table.
    pub code_remainder: String,
    /// Charset membership bits, see [`category`].
    pub category: u8,
    /// System frequency (higher ranks first).
    pub freq: i64,
    /// Phrase was defined by the user rather than shipped with the table.
    pub user_defined: bool,
    /// System phrase the user has selected before.
    pub used_by_user: bool,
}

/// Where a candidate came from, for display styling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhraseOrigin {
    User,
    UsedSystem,
    System,
}

impl Candidate {
    pub fn new<T: Into<String>>(phrase: T, codes: Vec<ParsedCode>) -> Self {
        Candidate {
            phrase: phrase.into(),
            codes,
            code_remainder: String::new(),
            category: category::SIMPLIFIED | category::TRADITIONAL,
            freq: 0,
            user_defined: false,
            used_by_user: false,
        }
    }

    pub fn with_category(mut self, category: u8) -> Self {
        self.category = category;
        self
    }

    pub fn with_freq(mut self, freq: i64) -> Self {
        self.freq = freq;
        self
    }

    pub fn user_defined(mut self) -> Self {
        self.user_defined = true;
        self
    }

    pub fn origin(&self) -> PhraseOrigin {
        if self.user_defined {
            PhraseOrigin::User
        } else if self.used_by_user {
            PhraseOrigin::UsedSystem
        } else {
            PhraseOrigin::System
        }
    }

    /// Text shown in the lookup table: phrase followed by the code remainder.
    pub fn label(&self) -> String {
        format!("{}{}", self.phrase, self.code_remainder)
    }

    pub fn has_category(&self, bits: u8) -> bool {
        self.category & bits != 0
    }
}

/// Charset restriction the lexicon applies on its side of a query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CharsetRestriction {
    #[default]
    None,
    SimplifiedOnly,
    TraditionalOnly,
}

impl CharsetRestriction {
    /// Whether a candidate with `category` passes this restriction.
    pub fn admits(&self, category: u8) -> bool {
        match self {
            Self::None => true,
            Self::SimplifiedOnly => category & category::SIMPLIFIED != 0,
            Self::TraditionalOnly => category & category::TRADITIONAL != 0,
        }
    }
}

/// Reorder candidates into `first` bucket, then `second`-only, then the
/// remaining extended candidates. Relative order is kept in each bucket;
/// candidates carrying none of the bits are dropped.
pub fn prioritize(candidates: Vec<Candidate>, first: u8, second: u8) -> Vec<Candidate> {
    let mut head = Vec::new();
    let mut middle = Vec::new();
    let mut tail = Vec::new();
    for cand in candidates {
        if cand.has_category(first) {
            head.push(cand);
        } else if cand.has_category(second) {
            middle.push(cand);
        } else if cand.has_category(category::EXTENDED) {
            tail.push(cand);
        }
    }
    head.extend(middle);
    head.extend(tail);
    head
}
