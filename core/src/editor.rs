//! Composition state machine.
//!
//! The editor owns everything typed since the last commit:
//! - the [`InputBuffer`] with the code being typed
//! - the stack of auto-committed buffers (`pending`), so backspace can step
//!   back into a phrase that was placed automatically
//! - the [`PreeditStore`] with placed phrases
//! - the candidate set and its [`LookupTable`] view
//!
//! All mutable session state lives in [`EditorState`], which is `Clone` so
//! the engine can snapshot it before a key and restore it if a collaborator
//! fails halfway.

use crate::candidate::{prioritize, Candidate};
use crate::composition::{Composition, SpanKind};
use crate::config::{keys, ConfigChange, ConfigStore, ConfigValue};
use crate::input_buffer::InputBuffer;
use crate::lexicon::Lexicon;
use crate::lookup_table::{LookupTable, Orientation};
use crate::mode::{charset_from_locale, CharsetMode};
use crate::parser::{
    restore_tone_marks, tone_symbols_to_digits, CodeParser, ParsedCode, PHONETIC_CHARS,
    TONE_SYMBOLS,
};
use crate::preedit::PreeditStore;
use crate::Config;
use ahash::AHashSet;
use anyhow::{Context, Result};
use lru::LruCache;
use std::num::NonZeroUsize;
use std::sync::Arc;
use tracing::{debug, trace};

/// Text produced by an explicit commit: the preedit text and the raw keys
/// that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitOutcome {
    pub text: String,
    pub input: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct QueryKey {
    codes: Vec<ParsedCode>,
    phonetic: bool,
    single_char: bool,
    charset: Option<CharsetMode>,
}

/// Snapshot-able session state.
#[derive(Debug, Clone)]
pub struct EditorState {
    input: InputBuffer,
    pending: Vec<Vec<char>>,
    /// Everything typed since the last full clear, bounded by `max_length`
    typed: Vec<char>,
    preedit: PreeditStore,
    table: LookupTable,
    candidates: Vec<Candidate>,
    previous: Vec<Candidate>,
    phonetic: bool,
    /// Character last placed from phonetic mode, for the code hint
    phonetic_pick: Option<String>,
    single_char: bool,
    auto_select: bool,
    charset: Option<CharsetMode>,
}

pub struct Editor<L: Lexicon, P: CodeParser> {
    lexicon: Arc<L>,
    parser: P,
    config: Arc<dyn ConfigStore>,
    section: String,
    valid_input_chars: AHashSet<char>,
    max_key_length: usize,
    phonetic_max_key_length: usize,
    max_length: usize,
    cache: LruCache<QueryKey, Vec<Candidate>>,
    cache_hits: usize,
    cache_misses: usize,
    state: EditorState,
}

impl<L: Lexicon, P: CodeParser> Editor<L, P> {
    /// Create an editor, reading persisted toggles from `config`.
    pub fn new(
        lexicon: Arc<L>,
        parser: P,
        config: Arc<dyn ConfigStore>,
        section: &str,
        settings: &Config,
    ) -> Result<Self> {
        let props = lexicon.properties();
        let get = |name: &str| {
            config
                .get(section, name)
                .with_context(|| format!("read {}", name))
        };

        let page_size = get(keys::LOOKUP_TABLE_SIZE)?
            .and_then(|v| v.as_int())
            .map(|n| n.max(1) as usize)
            .unwrap_or(settings.page_size);
        let orientation = get(keys::LOOKUP_TABLE_ORIENTATION)?
            .and_then(|v| v.as_int())
            .map(Orientation::from_index)
            .unwrap_or(settings.orientation);
        let single_char = get(keys::ONE_CHAR)?
            .and_then(|v| v.as_bool())
            .unwrap_or(false);
        let auto_select = get(keys::AUTO_SELECT)?
            .and_then(|v| v.as_bool())
            .unwrap_or(props.auto_select);
        let charset = match get(keys::CHINESE_MODE)?.and_then(|v| v.as_int()) {
            Some(index) => CharsetMode::from_index(index),
            None => props
                .charset_mode
                .or_else(|| charset_from_locale(settings.locale.as_deref(), props.is_chinese)),
        };

        let valid_input_chars = props
            .valid_input_chars
            .chars()
            .filter(|&c| parser.parse(c).is_some())
            .collect();

        let mut table = LookupTable::new(page_size);
        table.set_orientation(orientation);

        let capacity = NonZeroUsize::new(settings.max_cache_size)
            .unwrap_or(NonZeroUsize::MIN);
        let max_key_length = props.max_key_length.max(1);

        Ok(Self {
            lexicon,
            parser,
            config,
            section: section.to_string(),
            valid_input_chars,
            max_key_length,
            phonetic_max_key_length: settings.phonetic_max_key_length.max(1),
            max_length: settings.max_length,
            cache: LruCache::new(capacity),
            cache_hits: 0,
            cache_misses: 0,
            state: EditorState {
                input: InputBuffer::new(),
                pending: Vec::new(),
                typed: Vec::new(),
                preedit: PreeditStore::new(),
                table,
                candidates: Vec::new(),
                previous: Vec::new(),
                phonetic: false,
                phonetic_pick: None,
                single_char,
                auto_select,
                charset,
            },
        })
    }

    // ========== State access ==========

    pub fn snapshot(&self) -> EditorState {
        self.state.clone()
    }

    pub fn restore(&mut self, state: EditorState) {
        self.state = state;
    }

    pub fn input(&self) -> &InputBuffer {
        &self.state.input
    }

    pub fn preedit(&self) -> &PreeditStore {
        &self.state.preedit
    }

    /// Auto-committed buffers that backspace can return to.
    pub fn pending(&self) -> &[Vec<char>] {
        &self.state.pending
    }

    pub fn lookup_table(&self) -> &LookupTable {
        &self.state.table
    }

    pub fn candidates(&self) -> &[Candidate] {
        &self.state.candidates
    }

    pub fn has_candidates(&self) -> bool {
        !self.state.candidates.is_empty()
    }

    /// Exactly one candidate is left.
    pub fn one_candidate(&self) -> bool {
        self.state.candidates.len() == 1
    }

    /// Nothing typed since the last clear.
    pub fn is_empty(&self) -> bool {
        self.state.typed.is_empty()
    }

    /// Valid, invalid and pending input are all empty.
    pub fn is_input_empty(&self) -> bool {
        self.state.input.is_empty() && self.state.pending.is_empty()
    }

    pub fn is_phonetic(&self) -> bool {
        self.state.phonetic
    }

    pub fn single_char(&self) -> bool {
        self.state.single_char
    }

    pub fn auto_select(&self) -> bool {
        self.state.auto_select
    }

    pub fn charset_mode(&self) -> Option<CharsetMode> {
        self.state.charset
    }

    pub fn max_key_length(&self) -> usize {
        self.max_key_length
    }

    pub fn is_valid_input_char(&self, ch: char) -> bool {
        self.valid_input_chars.contains(&ch)
    }

    /// Whether `ch` goes into the input buffer in the current sub-mode.
    pub fn accepts(&self, ch: char) -> bool {
        self.is_valid_input_char(ch) || (self.state.phonetic && PHONETIC_CHARS.contains(ch))
    }

    /// Cache statistics as `(hits, misses)`.
    pub fn cache_stats(&self) -> (usize, usize) {
        (self.cache_hits, self.cache_misses)
    }

    pub fn clear_cache(&mut self) {
        self.cache.clear();
    }

    /// Report a committed phrase to the lexicon. Cached results are dropped
    /// since the ranking may have changed.
    pub fn check_phrase(&mut self, phrase: &str, input: &str) -> Result<()> {
        self.lexicon
            .check_phrase(phrase, input)
            .context("record committed phrase")?;
        self.cache.clear();
        Ok(())
    }

    // ========== Toggles ==========

    pub fn toggle_phonetic(&mut self) {
        self.state.phonetic = !self.state.phonetic;
    }

    pub fn toggle_single_char(&mut self) -> Result<()> {
        let value = !self.state.single_char;
        self.config
            .set(&self.section, keys::ONE_CHAR, ConfigValue::Bool(value))
            .context("persist OneChar")?;
        self.state.single_char = value;
        Ok(())
    }

    /// Step to the next charset mode. IMEs without one never cycle.
    pub fn next_charset_mode(&mut self) -> Result<()> {
        let Some(mode) = self.state.charset else {
            return Ok(());
        };
        let next = mode.next();
        self.config
            .set(&self.section, keys::CHINESE_MODE, ConfigValue::Int(next.index()))
            .context("persist ChineseMode")?;
        self.state.charset = Some(next);
        debug!(charset = next.index(), "charset mode");
        Ok(())
    }

    /// Apply a change notification. Returns true when something changed.
    pub fn apply_change(&mut self, change: &ConfigChange) -> bool {
        match change.name.as_str() {
            keys::ONE_CHAR => change.value.as_bool().map(|v| self.state.single_char = v),
            keys::AUTO_SELECT => change.value.as_bool().map(|v| self.state.auto_select = v),
            keys::CHINESE_MODE => change
                .value
                .as_int()
                .map(|v| self.state.charset = CharsetMode::from_index(v)),
            keys::LOOKUP_TABLE_ORIENTATION => change
                .value
                .as_int()
                .map(|v| self.state.table.set_orientation(Orientation::from_index(v))),
            keys::LOOKUP_TABLE_SIZE => change
                .value
                .as_int()
                .map(|v| self.state.table.set_page_size(v.max(1) as usize)),
            _ => None,
        }
        .is_some()
    }

    // ========== Buffers ==========

    /// Full reset: input, pending segments, preedit and phonetic sub-mode.
    pub fn clear(&mut self) {
        self.over_input();
        self.state.typed.clear();
        self.state.preedit.clear();
        self.state.phonetic = false;
        self.state.phonetic_pick = None;
    }

    fn clear_input(&mut self) {
        let state = &mut self.state;
        state.input.clear();
        state.table.clear();
        state.table.set_cursor_visible(true);
        state.candidates.clear();
        state.previous.clear();
    }

    /// Drop the input and the pending stack, keeping placed phrases.
    fn over_input(&mut self) {
        self.clear_input();
        self.state.pending.clear();
    }

    /// Raw keys not yet committed: pending buffers, valid and invalid input.
    pub fn all_input_string(&self) -> String {
        let state = &self.state;
        state
            .pending
            .iter()
            .flatten()
            .chain(state.input.valid())
            .chain(state.input.invalid())
            .collect()
    }

    fn selected_candidate(&self) -> Option<&Candidate> {
        self.state.candidates.get(self.state.table.cursor_pos())
    }

    /// Preedit, pending or candidate text would be displayed.
    pub fn has_preedit(&self) -> bool {
        !self.state.candidates.is_empty()
            || !self.state.input.is_empty()
            || !self.state.preedit.is_empty()
    }

    /// Keep derived bookkeeping consistent after direct preedit edits.
    fn sync_after_preedit_edit(&mut self) {
        let state = &mut self.state;
        state.pending.truncate(state.preedit.cursor().segment);
        if state.preedit.is_empty() && state.input.is_empty() {
            state.typed.clear();
        }
    }

    /// Append a typed character.
    ///
    /// Returns false when the character ended the current code without any
    /// candidate to commit; the caller then commits the input literally.
    pub fn add_input(&mut self, ch: char) -> Result<bool> {
        if self.state.typed.len() >= self.max_length {
            return Ok(true);
        }
        self.state.phonetic_pick = None;
        if self.state.preedit.cursor().offset != 0 {
            self.state.preedit.split();
        }

        let limit = if self.state.phonetic {
            self.phonetic_max_key_length
        } else {
            self.max_key_length
        };
        if self.state.input.len() >= limit && self.auto_commit_to_preedit()? {
            return self.add_input(ch);
        }
        if self.state.input.total_len() >= limit {
            // buffer full: the key is swallowed
            return Ok(true);
        }
        if self.state.input.has_invalid() {
            self.state.input.push_invalid(ch);
        } else {
            match self.parser.parse(ch).filter(|_| self.accepts(ch)) {
                Some(code) => self.state.input.push_valid(ch, code),
                None => self.state.input.push_invalid(ch),
            }
        }
        self.state.typed.push(ch);
        self.update_candidates()
    }

    /// Remove the last typed character. When this empties the valid input
    /// and an auto-committed buffer is pending, that buffer is restored and
    /// its phrase taken back out of the preedit.
    pub fn pop_input(&mut self) -> Result<Option<char>> {
        let state = &mut self.state;
        let popped = if state.input.has_invalid() {
            state.input.pop()
        } else {
            let popped = state.input.discard_last_valid();
            if popped.is_some() && state.input.valid().is_empty() {
                if let Some(prev) = state.pending.pop() {
                    let codes = self.parser.parse_all(&prev);
                    state.input.restore(prev, codes);
                    state.preedit.remove_segment_before();
                }
            }
            popped
        };
        state.typed.pop();
        self.update_candidates()?;
        Ok(popped)
    }

    fn query(&mut self) -> Result<Vec<Candidate>> {
        let key = QueryKey {
            codes: self.state.input.codes().to_vec(),
            phonetic: self.state.phonetic,
            single_char: self.state.single_char,
            charset: self.state.charset,
        };
        if let Some(hit) = self.cache.get(&key) {
            self.cache_hits += 1;
            trace!(codes = key.codes.len(), "candidate cache hit");
            return Ok(hit.clone());
        }
        self.cache_misses += 1;
        trace!(codes = key.codes.len(), "candidate cache miss");

        let found = if key.phonetic {
            self.lexicon.select_by_phonetic(&key.codes)
        } else {
            let restriction = if self.lexicon.properties().is_chinese {
                key.charset.map(CharsetMode::restriction).unwrap_or_default()
            } else {
                Default::default()
            };
            self.lexicon
                .select_phrases(&key.codes, key.single_char, restriction)
        }
        .context("query lexicon")?;

        let found = match key.charset.and_then(CharsetMode::priority) {
            Some((first, second)) => prioritize(found, first, second),
            None => found,
        };
        self.cache.put(key, found.clone());
        Ok(found)
    }

    fn fill_table(&mut self) {
        let typed = self.state.input.codes().len();
        let phonetic = self.state.phonetic;
        for cand in &self.state.candidates {
            let mut cand = cand.clone();
            let rest = &cand.codes[typed.min(cand.codes.len())..];
            let remainder = self.parser.deparse_all(rest);
            cand.code_remainder = if phonetic {
                restore_tone_marks(&remainder)
            } else {
                remainder
            };
            self.state.table.append_candidate(cand);
        }
    }

    /// Refresh the candidate set after the input changed.
    ///
    /// When the new input has no candidates, one of three things happens:
    /// - the input so far is committed automatically and the last key starts
    ///   a new code
    /// - the call returns false so the caller commits literally
    /// - the last key is moved to the invalid tail
    pub fn update_candidates(&mut self) -> Result<bool> {
        let props = self.lexicon.properties();
        let valid = self.state.input.valid();
        if !props.start_chars.is_empty()
            && valid.len() == 1
            && !self.state.input.has_invalid()
            && !props.start_chars.contains(&valid[0])
        {
            let ch = valid[0];
            self.state.pending.push(vec![ch]);
            self.state.preedit.insert_at_cursor(ch.to_string());
            self.clear_input();
            return Ok(true);
        }

        if (self.state.input.is_query_fresh() && !self.state.candidates.is_empty())
            || self.state.input.has_invalid()
        {
            return Ok(true);
        }

        let only_one_last = self.one_candidate();
        self.state.table.clear();
        self.state.table.set_cursor_visible(true);
        if self.state.input.codes().is_empty() {
            self.state.candidates.clear();
        } else {
            self.state.candidates = self.query()?;
            self.state.input.mark_queried();
        }

        if !self.state.candidates.is_empty() {
            self.fill_table();
        } else if let Some(&last) = self.state.input.valid().last() {
            let head_len = self.state.input.len() - 1;
            let at_boundary = last.is_ascii_punctuation()
                || self.lexicon.properties().complete_lengths.contains(&head_len)
                || only_one_last
                || self.state.auto_select;
            if at_boundary {
                if self.state.phonetic && TONE_SYMBOLS.contains(&last) {
                    self.state.input.discard_last_valid();
                    return Ok(true);
                }
                if !self.state.previous.is_empty() {
                    self.state.candidates = std::mem::take(&mut self.state.previous);
                    let last_input = self.pop_input()?;
                    self.auto_commit_to_preedit()?;
                    return match last_input {
                        Some(ch) => self.add_input(ch),
                        None => Ok(true),
                    };
                }
                self.pop_input()?;
                self.state.table.clear();
                self.state.table.set_cursor_visible(true);
                return Ok(false);
            }
            self.state.input.demote_last_valid();
            self.state.candidates.clear();
        }
        self.state.previous = self.state.candidates.clone();
        Ok(true)
    }

    /// Place the highlighted candidate into the preedit and drop the input.
    pub fn commit_to_preedit(&mut self) -> Result<()> {
        if let Some(phrase) = self.selected_candidate().map(|c| c.phrase.clone()) {
            debug!(%phrase, "commit to preedit");
            if self.state.phonetic {
                self.state.phonetic_pick = Some(phrase.clone());
            }
            self.state.preedit.insert_at_cursor(phrase);
        }
        self.over_input();
        self.update_candidates()?;
        Ok(())
    }

    /// Place the highlighted candidate and remember the input, so backspace
    /// can return to it. Returns false when there is no candidate.
    pub fn auto_commit_to_preedit(&mut self) -> Result<bool> {
        let Some(phrase) = self.selected_candidate().map(|c| c.phrase.clone()) else {
            return Ok(false);
        };
        debug!(%phrase, "auto commit to preedit");
        self.state.pending.push(self.state.input.valid().to_vec());
        self.state.preedit.insert_at_cursor(phrase);
        self.clear_input();
        self.update_candidates()?;
        Ok(true)
    }

    // ========== Display ==========

    /// Render the preedit. The preview is the highlighted candidate, or the
    /// raw input when there is none.
    pub fn composition(&self) -> Composition {
        let state = &self.state;
        let preview: String = match self.selected_candidate() {
            Some(cand) => cand.phrase.clone(),
            None => state.input.chars().into_iter().collect(),
        };
        let caret = state.preedit.chars_before_cursor() + preview.chars().count();
        let segments = state.preedit.segments();
        let cursor = state.preedit.cursor().segment.min(segments.len());
        let pending = state.pending.len();

        if pending > cursor {
            let mut text = segments[..cursor].concat();
            text.push_str(&preview);
            text.push_str(&segments[cursor..].concat());
            return Composition::plain(text, caret);
        }

        let mut comp = Composition::new();
        comp.push(SpanKind::Confirmed, segments[..cursor - pending].concat());
        comp.push(SpanKind::Pending, segments[cursor - pending..cursor].concat());
        comp.push(SpanKind::CandidatePreview, preview);
        comp.push(SpanKind::Confirmed, segments[cursor..].concat());
        comp.caret = caret;
        comp
    }

    /// Plain preedit text.
    pub fn preedit_text(&self) -> String {
        self.composition().text()
    }

    /// Auxiliary text: the typed code while composing, otherwise code hints
    /// for the last phonetic pick and for the phrase being built.
    pub fn aux_text(&self) -> Result<String> {
        let state = &self.state;
        if !state.input.is_empty() {
            let valid = state.input.valid_string();
            return Ok(if state.phonetic {
                tone_symbols_to_digits(&valid)
            } else {
                valid
            });
        }

        let mut aux = String::new();
        if let Some(ch) = state.phonetic_pick.as_deref().and_then(|p| p.chars().next()) {
            let codes = self
                .lexicon
                .lookup_code_for_char(ch)
                .context("look up character codes")?;
            aux = codes.join(" ");
        }
        let text = state.preedit.text();
        if self.lexicon.properties().user_can_define_phrase && text.chars().count() > 1 {
            let code = self
                .lexicon
                .codes_for_phrase(&text)
                .context("derive phrase code")?;
            aux.push_str("\t#: ");
            aux.push_str(&code);
        }
        Ok(aux)
    }

    // ========== Key operations ==========

    fn navigate(&mut self, step: fn(&mut PreeditStore)) -> Result<bool> {
        if !self.has_preedit() {
            return Ok(false);
        }
        if self.is_input_empty() {
            step(&mut self.state.preedit);
            self.update_candidates()?;
        }
        Ok(true)
    }

    pub fn arrow_left(&mut self) -> Result<bool> {
        self.navigate(PreeditStore::move_left)
    }

    pub fn arrow_right(&mut self) -> Result<bool> {
        self.navigate(PreeditStore::move_right)
    }

    pub fn control_arrow_left(&mut self) -> Result<bool> {
        self.navigate(PreeditStore::move_segment_left)
    }

    pub fn control_arrow_right(&mut self) -> Result<bool> {
        self.navigate(PreeditStore::move_segment_right)
    }

    fn move_table(&mut self, step: fn(&mut LookupTable) -> bool) -> Result<bool> {
        let moved = step(&mut self.state.table);
        self.update_candidates()?;
        Ok(moved || self.has_candidates())
    }

    pub fn arrow_down(&mut self) -> Result<bool> {
        self.move_table(LookupTable::cursor_down)
    }

    pub fn arrow_up(&mut self) -> Result<bool> {
        self.move_table(LookupTable::cursor_up)
    }

    pub fn page_down(&mut self) -> Result<bool> {
        self.move_table(LookupTable::page_down)
    }

    pub fn page_up(&mut self) -> Result<bool> {
        self.move_table(LookupTable::page_up)
    }

    /// Select the candidate at `index` on the current page into the preedit.
    /// Returns false if there is no candidate there.
    pub fn number(&mut self, index: usize) -> Result<bool> {
        if !self.state.table.set_cursor_pos_in_current_page(index) {
            return Ok(false);
        }
        self.commit_to_preedit()?;
        Ok(true)
    }

    /// Delete the user-defined candidate at `index` on the current page.
    /// System phrases and stale indices are left alone and return false.
    pub fn alt_number(&mut self, index: usize) -> Result<bool> {
        let pos = self.state.table.current_page_start() + index;
        let Some(cand) = self.state.candidates.get(pos) else {
            return Ok(false);
        };
        if !cand.user_defined {
            return Ok(false);
        }
        let cand = cand.clone();
        debug!(phrase = %cand.phrase, "remove user phrase");
        self.lexicon
            .remove_phrase(&cand)
            .context("remove user phrase")?;
        self.cache.clear();
        self.state.input.invalidate_query();
        self.update_candidates()?;
        Ok(true)
    }

    pub fn backspace(&mut self) -> Result<bool> {
        self.state.phonetic_pick = None;
        if !self.state.input.is_empty() {
            self.pop_input()?;
            Ok(true)
        } else if self.has_preedit() {
            self.state.preedit.remove_char_before();
            self.sync_after_preedit_edit();
            Ok(true)
        } else {
            Ok(false)
        }
    }

    pub fn control_backspace(&mut self) -> Result<bool> {
        self.state.phonetic_pick = None;
        if !self.state.input.is_empty() {
            self.over_input();
            self.sync_after_preedit_edit();
            Ok(true)
        } else if self.has_preedit() {
            self.state.preedit.remove_segment_before();
            self.sync_after_preedit_edit();
            Ok(true)
        } else {
            Ok(false)
        }
    }

    pub fn delete(&mut self) -> Result<bool> {
        self.state.phonetic_pick = None;
        if !self.state.input.is_empty() {
            Ok(true)
        } else if self.has_preedit() {
            self.state.preedit.remove_char_after();
            self.sync_after_preedit_edit();
            Ok(true)
        } else {
            Ok(false)
        }
    }

    pub fn control_delete(&mut self) -> Result<bool> {
        self.state.phonetic_pick = None;
        if !self.state.input.is_empty() {
            Ok(true)
        } else if self.has_preedit() {
            self.state.preedit.remove_segment_after();
            self.sync_after_preedit_edit();
            Ok(true)
        } else {
            Ok(false)
        }
    }

    /// Commit the current input to the preedit.
    pub fn l_shift(&mut self) -> Result<bool> {
        if self.state.input.valid().is_empty() {
            return Ok(false);
        }
        self.commit_to_preedit()?;
        Ok(true)
    }

    /// Commit the current input to the preedit and flip phonetic sub-mode.
    pub fn r_shift(&mut self) -> Result<bool> {
        self.state.phonetic_pick = None;
        if !self.state.input.valid().is_empty() {
            self.commit_to_preedit()?;
        }
        self.toggle_phonetic();
        Ok(true)
    }

    /// Commit everything typed so far. Returns nothing when the input has an
    /// invalid tail or nothing was typed.
    pub fn space(&mut self) -> Result<Option<CommitOutcome>> {
        if self.state.input.has_invalid() || self.state.typed.is_empty() {
            return Ok(None);
        }
        let input = self.all_input_string();
        self.commit_to_preedit()?;
        let text = self.state.preedit.text();
        self.clear();
        Ok(Some(CommitOutcome { text, input }))
    }
}
