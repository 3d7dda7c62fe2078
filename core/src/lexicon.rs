//! Lexicon collaborator: phrase lookup by code prefix and learning.
//!
//! The engine only talks to the [`Lexicon`] trait. [`MemoryLexicon`] is the
//! in-memory implementation used by tests and by the table loader; it ranks
//! candidates by code length, then learned frequency, then table frequency.

use crate::candidate::{category, Candidate, CharsetRestriction};
use crate::mode::CharsetMode;
use crate::parser::{CodeParser, ParsedCode, TabKeyParser};
use ahash::AHashSet;
use anyhow::{Context, Result};
use std::sync::RwLock;
use unicode_normalization::UnicodeNormalization;

/// Scalar properties an IME table declares.
#[derive(Debug, Clone)]
pub struct ImeProperties {
    pub name: String,
    /// Longest table code
    pub max_key_length: usize,
    /// Code lengths at which a phrase is considered complete
    pub complete_lengths: AHashSet<usize>,
    /// Characters that may appear in a table code
    pub valid_input_chars: String,
    /// First keystroke must be one of these when non-empty
    pub start_chars: AHashSet<char>,
    pub phonetic_supported: bool,
    pub auto_select: bool,
    pub auto_commit: bool,
    pub full_width_letter: bool,
    pub full_width_punct: bool,
    pub is_chinese: bool,
    /// Charset mode declared by the table, if any
    pub charset_mode: Option<CharsetMode>,
    pub user_can_define_phrase: bool,
    /// Short label shown for table mode
    pub status_prompt: String,
}

impl Default for ImeProperties {
    fn default() -> Self {
        Self {
            name: "Table".to_string(),
            max_key_length: 4,
            complete_lengths: AHashSet::new(),
            valid_input_chars: "abcdefghijklmnopqrstuvwxyz".to_string(),
            start_chars: AHashSet::new(),
            phonetic_supported: false,
            auto_select: false,
            auto_commit: false,
            full_width_letter: false,
            full_width_punct: true,
            is_chinese: true,
            charset_mode: None,
            user_can_define_phrase: false,
            status_prompt: "CN".to_string(),
        }
    }
}

/// Phrase store consumed by the editor.
///
/// Methods take `&self`; implementations that learn use interior mutability.
pub trait Lexicon {
    fn properties(&self) -> &ImeProperties;

    /// Phrases whose code starts with `codes`, best first.
    fn select_phrases(
        &self,
        codes: &[ParsedCode],
        single_char: bool,
        restriction: CharsetRestriction,
    ) -> Result<Vec<Candidate>>;

    /// Single characters whose phonetic spelling starts with `codes`.
    fn select_by_phonetic(&self, codes: &[ParsedCode]) -> Result<Vec<Candidate>>;

    /// Record that `phrase` was committed from the raw `input` keys.
    fn check_phrase(&self, phrase: &str, input: &str) -> Result<()>;

    /// Delete a user-defined phrase.
    fn remove_phrase(&self, candidate: &Candidate) -> Result<()>;

    /// Table codes of a single character.
    fn lookup_code_for_char(&self, ch: char) -> Result<Vec<String>>;

    /// Code a user-defined phrase would get. Empty when some character has
    /// no code.
    fn codes_for_phrase(&self, phrase: &str) -> Result<String>;
}

#[derive(Debug, Clone)]
struct Entry {
    code: String,
    codes: Vec<ParsedCode>,
    phrase: String,
    freq: i64,
    user_freq: i64,
    category: u8,
    user_defined: bool,
    seq: usize,
}

impl Entry {
    fn to_candidate(&self) -> Candidate {
        let mut cand = Candidate::new(self.phrase.clone(), self.codes.clone())
            .with_category(self.category)
            .with_freq(self.freq);
        cand.user_defined = self.user_defined;
        cand.used_by_user = self.user_freq > 0;
        cand
    }

    fn rank_key(&self) -> (usize, i64, i64, usize) {
        (self.codes.len(), -self.user_freq, -self.freq, self.seq)
    }
}

#[derive(Debug, Default)]
struct Tables {
    phrases: Vec<Entry>,
    phonetic: Vec<Entry>,
    next_seq: usize,
}

/// In-memory lexicon.
#[derive(Debug)]
pub struct MemoryLexicon {
    properties: ImeProperties,
    parser: TabKeyParser,
    inner: RwLock<Tables>,
}

impl MemoryLexicon {
    pub fn new(properties: ImeProperties) -> Self {
        Self::with_parser(properties, TabKeyParser::default())
    }

    pub fn with_parser(properties: ImeProperties, parser: TabKeyParser) -> Self {
        Self {
            properties,
            parser,
            inner: RwLock::new(Tables::default()),
        }
    }

    fn parse_code(&self, code: &str) -> Result<Vec<ParsedCode>> {
        code.chars()
            .map(|c| {
                self.parser
                    .parse(c)
                    .with_context(|| format!("key {:?} in code {:?} is not a table key", c, code))
            })
            .collect()
    }

    fn read(&self) -> Result<std::sync::RwLockReadGuard<'_, Tables>> {
        self.inner
            .read()
            .map_err(|_| anyhow::anyhow!("lexicon lock poisoned"))
    }

    fn write(&self) -> Result<std::sync::RwLockWriteGuard<'_, Tables>> {
        self.inner
            .write()
            .map_err(|_| anyhow::anyhow!("lexicon lock poisoned"))
    }

    fn make_entry(&self, tables: &mut Tables, code: &str, phrase: &str, freq: i64) -> Result<Entry> {
        let codes = self.parse_code(code)?;
        let seq = tables.next_seq;
        tables.next_seq += 1;
        Ok(Entry {
            code: code.to_string(),
            codes,
            phrase: phrase.nfc().collect(),
            freq,
            user_freq: 0,
            category: category::SIMPLIFIED | category::TRADITIONAL,
            user_defined: false,
            seq,
        })
    }

    /// Add a table phrase.
    pub fn insert(&self, code: &str, phrase: &str, freq: i64) -> Result<()> {
        self.insert_with_category(code, phrase, freq, category::SIMPLIFIED | category::TRADITIONAL)
    }

    /// Add a table phrase with explicit charset bits.
    pub fn insert_with_category(&self, code: &str, phrase: &str, freq: i64, bits: u8) -> Result<()> {
        let mut tables = self.write()?;
        let mut entry = self.make_entry(&mut tables, code, phrase, freq)?;
        entry.category = bits;
        tables.phrases.push(entry);
        Ok(())
    }

    /// Add a user-defined phrase.
    pub fn insert_user_phrase(&self, code: &str, phrase: &str) -> Result<()> {
        let mut tables = self.write()?;
        let mut entry = self.make_entry(&mut tables, code, phrase, 0)?;
        entry.user_defined = true;
        entry.user_freq = 1;
        tables.phrases.push(entry);
        Ok(())
    }

    /// Add a phonetic spelling for a character.
    pub fn insert_phonetic(&self, spelling: &str, ch: char, freq: i64) -> Result<()> {
        let mut tables = self.write()?;
        let entry = self.make_entry(&mut tables, spelling, &ch.to_string(), freq)?;
        tables.phonetic.push(entry);
        Ok(())
    }

    /// Number of table phrases, user phrases included.
    pub fn len(&self) -> usize {
        self.read().map(|t| t.phrases.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Learned frequency of a phrase (sum over its codes).
    pub fn user_frequency(&self, phrase: &str) -> i64 {
        self.read()
            .map(|t| {
                t.phrases
                    .iter()
                    .filter(|e| e.phrase == phrase)
                    .map(|e| e.user_freq)
                    .sum()
            })
            .unwrap_or(0)
    }

    /// Longest code of a single character.
    fn longest_char_codes(tables: &Tables, ch: char) -> Option<Vec<ParsedCode>> {
        tables
            .phrases
            .iter()
            .filter(|e| {
                let mut chars = e.phrase.chars();
                chars.next() == Some(ch) && chars.next().is_none()
            })
            .max_by_key(|e| (e.codes.len(), std::cmp::Reverse(e.seq)))
            .map(|e| e.codes.clone())
    }

    fn phrase_codes(tables: &Tables, phrase: &str) -> Option<Vec<ParsedCode>> {
        let chars: Vec<char> = phrase.chars().collect();
        let per_char: Option<Vec<Vec<ParsedCode>>> = chars
            .iter()
            .map(|&c| Self::longest_char_codes(tables, c))
            .collect();
        let per_char = per_char?;
        let take = |idx: usize, n: usize| per_char[idx].iter().take(n).copied();
        let codes: Vec<ParsedCode> = match per_char.len() {
            0 => return None,
            1 => per_char[0].clone(),
            2 => take(0, 2).chain(take(1, 2)).collect(),
            3 => take(0, 1).chain(take(1, 1)).chain(take(2, 2)).collect(),
            n => take(0, 1)
                .chain(take(1, 1))
                .chain(take(2, 1))
                .chain(take(n - 1, 1))
                .collect(),
        };
        Some(codes)
    }
}

fn sorted_matches<'a>(
    entries: impl Iterator<Item = &'a Entry>,
    limit_one_char: bool,
    restriction: CharsetRestriction,
    codes: &[ParsedCode],
) -> Vec<Candidate> {
    let mut hits: Vec<&Entry> = entries
        .filter(|e| e.codes.starts_with(codes))
        .filter(|e| !limit_one_char || e.phrase.chars().count() == 1)
        .filter(|e| restriction.admits(e.category))
        .collect();
    hits.sort_by_key(|e| e.rank_key());
    hits.into_iter().map(Entry::to_candidate).collect()
}

impl Lexicon for MemoryLexicon {
    fn properties(&self) -> &ImeProperties {
        &self.properties
    }

    fn select_phrases(
        &self,
        codes: &[ParsedCode],
        single_char: bool,
        restriction: CharsetRestriction,
    ) -> Result<Vec<Candidate>> {
        let tables = self.read()?;
        Ok(sorted_matches(tables.phrases.iter(), single_char, restriction, codes))
    }

    fn select_by_phonetic(&self, codes: &[ParsedCode]) -> Result<Vec<Candidate>> {
        let tables = self.read()?;
        Ok(sorted_matches(
            tables.phonetic.iter(),
            true,
            CharsetRestriction::None,
            codes,
        ))
    }

    fn check_phrase(&self, phrase: &str, input: &str) -> Result<()> {
        let phrase: String = phrase.nfc().collect();
        if phrase.is_empty() {
            return Ok(());
        }
        let mut tables = self.write()?;

        let exact: Vec<usize> = tables
            .phrases
            .iter()
            .enumerate()
            .filter(|(_, e)| e.phrase == phrase && e.code == input)
            .map(|(i, _)| i)
            .collect();
        let targets = if exact.is_empty() {
            tables
                .phrases
                .iter()
                .enumerate()
                .filter(|(_, e)| e.phrase == phrase)
                .min_by_key(|(_, e)| e.rank_key())
                .map(|(i, _)| vec![i])
                .unwrap_or_default()
        } else {
            exact
        };

        if !targets.is_empty() {
            for idx in targets {
                tables.phrases[idx].user_freq += 1;
            }
            return Ok(());
        }

        if phrase.chars().count() < 2 || !self.properties.user_can_define_phrase {
            return Ok(());
        }
        let Some(codes) = Self::phrase_codes(&tables, &phrase) else {
            return Ok(());
        };
        let seq = tables.next_seq;
        tables.next_seq += 1;
        tables.phrases.push(Entry {
            code: self.parser.deparse_all(&codes),
            codes,
            phrase,
            freq: 0,
            user_freq: 1,
            category: category::SIMPLIFIED | category::TRADITIONAL,
            user_defined: true,
            seq,
        });
        Ok(())
    }

    fn remove_phrase(&self, candidate: &Candidate) -> Result<()> {
        let mut tables = self.write()?;
        tables
            .phrases
            .retain(|e| !(e.user_defined && e.phrase == candidate.phrase && e.codes == candidate.codes));
        Ok(())
    }

    fn lookup_code_for_char(&self, ch: char) -> Result<Vec<String>> {
        let tables = self.read()?;
        let mut codes: Vec<&Entry> = tables
            .phrases
            .iter()
            .filter(|e| {
                let mut chars = e.phrase.chars();
                chars.next() == Some(ch) && chars.next().is_none()
            })
            .collect();
        codes.sort_by_key(|e| (e.codes.len(), e.seq));
        let mut out: Vec<String> = Vec::new();
        for e in codes {
            if !out.contains(&e.code) {
                out.push(e.code.clone());
            }
        }
        Ok(out)
    }

    fn codes_for_phrase(&self, phrase: &str) -> Result<String> {
        let tables = self.read()?;
        Ok(Self::phrase_codes(&tables, phrase)
            .map(|codes| self.parser.deparse_all(&codes))
            .unwrap_or_default())
    }
}
