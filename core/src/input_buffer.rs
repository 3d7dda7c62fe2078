//! Key buffer for the code currently being typed.
//!
//! Three parts are tracked:
//! - `valid`: characters the parser accepted, with their parsed codes
//! - `invalid`: the rejected tail; once non-empty every further character
//!   lands here until the buffer is cleared. The editor keeps both parts
//!   together within the table's max key length
//! - `last_queried`: snapshot of `valid` at the last lexicon query, used to
//!   skip redundant queries

use crate::parser::ParsedCode;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InputBuffer {
    valid: Vec<char>,
    invalid: Vec<char>,
    last_queried: Option<Vec<char>>,
    codes: Vec<ParsedCode>,
}

impl InputBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn valid(&self) -> &[char] {
        &self.valid
    }

    pub fn invalid(&self) -> &[char] {
        &self.invalid
    }

    pub fn codes(&self) -> &[ParsedCode] {
        &self.codes
    }

    /// Number of valid characters.
    pub fn len(&self) -> usize {
        self.valid.len()
    }

    /// Valid and invalid characters combined.
    pub fn total_len(&self) -> usize {
        self.valid.len() + self.invalid.len()
    }

    /// No valid or invalid characters are held.
    pub fn is_empty(&self) -> bool {
        self.valid.is_empty() && self.invalid.is_empty()
    }

    pub fn has_invalid(&self) -> bool {
        !self.invalid.is_empty()
    }

    /// Valid followed by invalid characters.
    pub fn chars(&self) -> Vec<char> {
        self.valid.iter().chain(self.invalid.iter()).copied().collect()
    }

    pub fn valid_string(&self) -> String {
        self.valid.iter().collect()
    }

    /// Append an accepted character. Ignored if the invalid tail is
    /// non-empty, in which case the character joins the tail instead.
    pub fn push_valid(&mut self, ch: char, code: ParsedCode) {
        if self.has_invalid() {
            self.invalid.push(ch);
            return;
        }
        self.valid.push(ch);
        self.codes.push(code);
    }

    pub fn push_invalid(&mut self, ch: char) {
        self.invalid.push(ch);
    }

    /// Pop the last character: from the invalid tail first, else from the
    /// valid part together with its code.
    pub fn pop(&mut self) -> Option<char> {
        if let Some(ch) = self.invalid.pop() {
            return Some(ch);
        }
        let ch = self.valid.pop()?;
        self.codes.pop();
        Some(ch)
    }

    /// Drop the last valid character and its code without moving it.
    pub fn discard_last_valid(&mut self) -> Option<char> {
        let ch = self.valid.pop()?;
        self.codes.pop();
        Some(ch)
    }

    /// Move the last valid character to the (empty) invalid tail.
    pub fn demote_last_valid(&mut self) {
        if let Some(ch) = self.discard_last_valid() {
            self.invalid.push(ch);
        }
    }

    /// Replace the valid part with a restored snapshot and its codes.
    pub fn restore(&mut self, valid: Vec<char>, codes: Vec<ParsedCode>) {
        self.valid = valid;
        self.codes = codes;
        self.invalid.clear();
    }

    /// The valid part is unchanged since the last query.
    pub fn is_query_fresh(&self) -> bool {
        self.last_queried.as_deref() == Some(self.valid.as_slice())
    }

    pub fn mark_queried(&mut self) {
        self.last_queried = Some(self.valid.clone());
    }

    /// Force the next candidate update to query the lexicon.
    pub fn invalidate_query(&mut self) {
        self.last_queried = None;
    }

    pub fn clear(&mut self) {
        self.valid.clear();
        self.invalid.clear();
        self.codes.clear();
        self.last_queried = None;
    }
}
