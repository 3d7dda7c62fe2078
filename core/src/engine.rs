// core/src/engine.rs
//
// Key dispatch for a table IME session: mode hot-keys, English and table
// handling, host lifecycle calls and the UI state handed back in ImeContext.

use crate::candidate::Candidate;
use crate::config::{keys, section_for, ConfigChange, ConfigStore};
use crate::context::{ImeContext, TableView};
use crate::editor::{CommitOutcome, Editor};
use crate::key_event::{keysym, KeyEvent, ModifierType};
use crate::lexicon::Lexicon;
use crate::mode::{ModeController, Property, ToggleRequest};
use crate::parser::CodeParser;
use crate::Config;
use anyhow::{Context, Result};
use std::sync::mpsc::Receiver;
use std::sync::Arc;
use tracing::{debug, debug_span, warn};

/// Result of processing a key event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyResult {
    /// Key was handled by the IME
    Handled,
    /// Key was not handled (pass through to application)
    NotHandled,
}

impl KeyResult {
    pub fn is_handled(self) -> bool {
        self == Self::Handled
    }
}

impl From<bool> for KeyResult {
    fn from(handled: bool) -> Self {
        if handled {
            Self::Handled
        } else {
            Self::NotHandled
        }
    }
}

/// One table IME session.
///
/// Type parameters are the lexicon and the code parser of the loaded table.
/// The engine is single-threaded: the host feeds it one key at a time and
/// reads [`ImeContext`] afterwards.
pub struct TableEngine<L: Lexicon, P: CodeParser> {
    editor: Editor<L, P>,
    modes: ModeController,
    lexicon: Arc<L>,
    config_rx: Receiver<ConfigChange>,
    section: String,
    settings: Config,
    page_down_keys: Vec<u32>,
    page_up_keys: Vec<u32>,
    prev_key: Option<KeyEvent>,
    /// Last character committed to the application
    prev_char: Option<char>,
    enabled: bool,
    context: ImeContext,
}

impl<L: Lexicon, P: CodeParser> TableEngine<L, P> {
    /// Create a session for the table behind `lexicon`.
    ///
    /// Toggles are read from `config` under the table's section; the engine
    /// subscribes to the store so later changes are picked up between keys.
    pub fn new(
        lexicon: Arc<L>,
        parser: P,
        config: Arc<dyn ConfigStore>,
        mut settings: Config,
    ) -> Result<Self> {
        let props = lexicon.properties();
        let section = section_for(&props.name);
        let config_rx = config.subscribe();

        if let Some(value) = config
            .get(&section, keys::LOOKUP_TABLE_SELECT_KEYS)
            .context("read select keys")?
        {
            if let Some(keys) = value.as_str() {
                settings.set_select_keys(keys);
            }
        }

        let modes = ModeController::new(config.clone(), &section, props)?;
        let editor = Editor::new(lexicon.clone(), parser, config.clone(), &section, &settings)?;

        let mut page_down_keys = vec![keysym::PAGE_DOWN, keysym::KP_PAGE_DOWN];
        let mut page_up_keys = vec![keysym::PAGE_UP, keysym::KP_PAGE_UP];
        if !editor.is_valid_input_char('=') && !editor.is_valid_input_char('-') {
            page_down_keys.push(keysym::EQUAL);
            page_up_keys.push(keysym::MINUS);
        }

        debug!(%section, "table engine created");
        let mut engine = Self {
            editor,
            modes,
            lexicon,
            config_rx,
            section,
            settings,
            page_down_keys,
            page_up_keys,
            prev_key: None,
            prev_char: None,
            enabled: true,
            context: ImeContext::new(),
        };
        engine.refresh_properties();
        Ok(engine)
    }

    // ========== Accessors ==========

    pub fn context(&self) -> &ImeContext {
        &self.context
    }

    pub fn context_mut(&mut self) -> &mut ImeContext {
        &mut self.context
    }

    /// Take the text committed by the last call.
    pub fn take_commit(&mut self) -> String {
        self.context.take_commit()
    }

    pub fn editor(&self) -> &Editor<L, P> {
        &self.editor
    }

    pub fn modes(&self) -> &ModeController {
        &self.modes
    }

    pub fn properties(&self) -> &[Property] {
        &self.context.properties
    }

    /// Config section this session reads and writes.
    pub fn section(&self) -> &str {
        &self.section
    }

    pub fn select_keys(&self) -> &str {
        &self.settings.select_keys
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    // ========== Key processing ==========

    /// Process a raw host key triple. Returns whether the key was consumed.
    pub fn process_key_event(&mut self, keyval: u32, is_press: bool, state: u32) -> Result<bool> {
        let key = KeyEvent::from_raw(keyval, is_press, state);
        Ok(self.process_key(key)?.is_handled())
    }

    /// Process a key event.
    ///
    /// The commit text in the context is cleared first and holds whatever
    /// this key committed afterwards. If a collaborator fails, the session
    /// is put back to its state before the key and the error is returned.
    pub fn process_key(&mut self, key: KeyEvent) -> Result<KeyResult> {
        let span = debug_span!("process_key", code = key.code, mask = key.mask.bits());
        let _enter = span.enter();

        self.drain_config_changes();
        self.context.commit_text.clear();
        if !self.enabled {
            return Ok(KeyResult::NotHandled);
        }

        let editor_state = self.editor.snapshot();
        let modes = self.modes.clone();
        let prev_char = self.prev_char;

        let result = self.dispatch(&key).and_then(|handled| {
            self.refresh()?;
            Ok(handled)
        });
        self.prev_key = Some(key);

        match result {
            Ok(handled) => Ok(handled.into()),
            Err(err) => {
                warn!(error = %err, "key processing failed, session state restored");
                self.editor.restore(editor_state);
                self.modes = modes;
                self.prev_char = prev_char;
                self.context.commit_text.clear();
                if let Err(err) = self.refresh() {
                    warn!(error = %err, "refresh after restore failed");
                }
                Err(err)
            }
        }
    }

    fn dispatch(&mut self, key: &KeyEvent) -> Result<bool> {
        let prev = self.prev_key;
        let shift_release = ModifierType::SHIFT | ModifierType::RELEASE;

        if self.editor.is_empty()
            && key.matches_hotkey(keysym::SHIFT_L, shift_release, prev.as_ref())
        {
            self.change_mode();
            return Ok(true);
        }
        if key.matches_hotkey(keysym::SPACE, ModifierType::SHIFT, prev.as_ref()) {
            self.toggle(ToggleRequest::FullWidthLetter)?;
            return Ok(true);
        }
        if key.matches_hotkey(keysym::PERIOD, ModifierType::CONTROL, prev.as_ref()) {
            self.toggle(ToggleRequest::FullWidthPunct)?;
            return Ok(true);
        }

        if self.modes.is_table() {
            self.table_mode_key(key)
        } else {
            Ok(self.english_mode_key(key))
        }
    }

    fn english_mode_key(&mut self, key: &KeyEvent) -> bool {
        if key.is_release() {
            return true;
        }
        let Some(ch) = key.printable_char() else {
            return false;
        };
        if key.has_control() || key.has_alt() {
            return false;
        }
        let after_digit = self.after_digit();
        if ch.is_ascii_punctuation() {
            let text = self.modes.cond_punct(ch, after_digit);
            self.commit_string(&text);
            return true;
        }
        if self.modes.full_width_letter() {
            let text = self.modes.to_full_width(ch, after_digit);
            self.commit_string(&text);
            return true;
        }
        false
    }

    fn table_mode_key(&mut self, key: &KeyEvent) -> Result<bool> {
        let prev = self.prev_key;
        let shift_release = ModifierType::SHIFT | ModifierType::RELEASE;
        let phonetic_supported = self.lexicon.properties().phonetic_supported;

        // Release hot-keys come first, all other releases are swallowed below
        if phonetic_supported && key.matches_hotkey(keysym::SHIFT_R, shift_release, prev.as_ref()) {
            return self.editor.r_shift();
        }
        if key.matches_hotkey(keysym::SHIFT_R, shift_release, prev.as_ref())
            || key.matches_hotkey(keysym::SHIFT_L, shift_release, prev.as_ref())
        {
            return self.editor.l_shift();
        }
        if key.matches_hotkey(keysym::COMMA, ModifierType::CONTROL, prev.as_ref()) {
            self.toggle(ToggleRequest::SingleChar)?;
            return Ok(true);
        }
        if key.matches_hotkey(keysym::SLASH, ModifierType::CONTROL, prev.as_ref()) {
            self.toggle(ToggleRequest::AutoCommit)?;
            return Ok(true);
        }
        if key.matches_hotkey(keysym::SEMICOLON, ModifierType::CONTROL, prev.as_ref()) {
            self.toggle(ToggleRequest::CharsetMode)?;
            return Ok(true);
        }
        if key.is_release() {
            return Ok(true);
        }

        let ch = key.printable_char();
        let plain = !key.has_control() && !key.has_alt();
        if self.editor.is_empty() {
            let is_input = ch.is_some_and(|c| self.editor.is_valid_input_char(c));
            if (0x20..=0x7f).contains(&key.code) && !is_input && plain {
                let after_digit = self.after_digit();
                if let Some(c) = ch {
                    if key.code == keysym::SPACE {
                        if !self.modes.full_width_letter() {
                            return Ok(false);
                        }
                        let text = self.modes.cond_letter(c, after_digit);
                        self.commit_string(&text);
                        return Ok(true);
                    }
                    if c.is_ascii_punctuation() {
                        let text = self.modes.cond_punct(c, after_digit);
                        self.commit_string(&text);
                        return Ok(true);
                    }
                    if c.is_ascii_digit() {
                        let text = self.modes.cond_letter(c, after_digit);
                        self.commit_string(&text);
                        return Ok(true);
                    }
                }
            } else if !(0x20..=0x7f).contains(&key.code) && !is_input && !self.editor.is_phonetic() {
                return Ok(false);
            }
        }

        match key.code {
            keysym::ESCAPE => {
                self.reset_session();
                return Ok(true);
            }
            keysym::RETURN | keysym::KP_ENTER => {
                let text = if self.editor.is_input_empty() {
                    self.editor.preedit_text()
                } else {
                    self.editor.all_input_string()
                };
                self.commit_string(&text);
                return Ok(true);
            }
            keysym::DOWN | keysym::KP_DOWN => return self.editor.arrow_down(),
            keysym::UP | keysym::KP_UP => return self.editor.arrow_up(),
            keysym::LEFT | keysym::KP_LEFT if key.has_control() => {
                return self.editor.control_arrow_left()
            }
            keysym::RIGHT | keysym::KP_RIGHT if key.has_control() => {
                return self.editor.control_arrow_right()
            }
            keysym::LEFT | keysym::KP_LEFT => return self.editor.arrow_left(),
            keysym::RIGHT | keysym::KP_RIGHT => return self.editor.arrow_right(),
            keysym::BACKSPACE if key.has_control() => return self.editor.control_backspace(),
            keysym::BACKSPACE => return self.editor.backspace(),
            keysym::DELETE if key.has_control() => return self.editor.control_delete(),
            keysym::DELETE => return self.editor.delete(),
            _ => {}
        }

        let select = ch.and_then(|c| self.settings.selection_key_index(c));
        if let Some(index) = select.filter(|_| self.editor.has_candidates()) {
            if key.has_control() {
                return self.editor.number(index);
            }
            if key.has_alt() {
                return self.editor.alt_number(index);
            }
        }

        if key.code == keysym::SPACE {
            if let Some(out) = self.editor.space()? {
                let text = if self.editor.auto_select() {
                    format!("{} ", out.text)
                } else {
                    out.text.clone()
                };
                self.commit_string(&text);
                self.editor.check_phrase(&out.text, &out.input)?;
            }
            return Ok(true);
        }

        if !plain {
            return Ok(false);
        }

        if let Some(c) = ch.filter(|&c| self.editor.accepts(c)) {
            return self.input_key(c);
        }

        if self.editor.has_candidates() {
            if self.page_down_keys.contains(&key.code) {
                return self.editor.page_down();
            }
            if self.page_up_keys.contains(&key.code) {
                return self.editor.page_up();
            }
            if let Some(index) = select {
                let input = self.editor.all_input_string();
                if !self.editor.number(index)? {
                    return Ok(false);
                }
                let text = self.editor.preedit_text();
                self.commit_string(&text);
                self.editor.check_phrase(&text, &input)?;
                return Ok(true);
            }
        }

        if let Some(c) = ch {
            let text = if self.editor.has_candidates() {
                self.editor.commit_to_preedit()?;
                self.editor.preedit_text()
            } else if self.editor.is_input_empty() {
                self.editor.preedit_text()
            } else {
                self.editor.all_input_string()
            };
            self.editor.clear();
            let after_digit = self.after_digit();
            let key_text = self.modes.convert(c, after_digit);
            self.commit_string(&format!("{}{}", text, key_text));
            return Ok(true);
        }
        Ok(false)
    }

    /// A character that goes into the input buffer.
    fn input_key(&mut self, c: char) -> Result<bool> {
        let len = self.editor.input().len();
        let at_complete_length = self.lexicon.properties().complete_lengths.contains(&len);
        let is_chinese = self.lexicon.properties().is_chinese;
        let max_key_length = self.editor.max_key_length();

        if self.modes.auto_commit()
            && !self.editor.is_phonetic()
            && (len == max_key_length || at_complete_length)
        {
            self.commit_space()?;
        }

        if !self.editor.add_input(c)? {
            let after_digit = self.after_digit();
            let key_text = self.modes.convert(c, after_digit);
            match self.editor.space()? {
                Some(out) => {
                    self.commit_string(&format!("{}{}", out.text, key_text));
                    self.editor.check_phrase(&out.text, &out.input)?;
                }
                None => self.commit_string(&key_text),
            }
            return Ok(true);
        }

        if self.modes.auto_commit()
            && self.editor.one_candidate()
            && (self.editor.input().len() == max_key_length || !is_chinese)
        {
            self.commit_space()?;
        }
        Ok(true)
    }

    /// Commit everything typed, as space does without auto-select.
    fn commit_space(&mut self) -> Result<Option<CommitOutcome>> {
        let out = self.editor.space()?;
        if let Some(out) = &out {
            self.commit_string(&out.text);
            self.editor.check_phrase(&out.text, &out.input)?;
        }
        Ok(out)
    }

    /// Append `text` to the commit text and clear the editor.
    fn commit_string(&mut self, text: &str) {
        self.editor.clear();
        if text.is_empty() {
            return;
        }
        debug!(%text, "commit");
        self.context.commit_text.push_str(text);
        self.prev_char = text.chars().last();
    }

    /// The previous key typed a digit that went straight to the application.
    fn after_digit(&self) -> bool {
        match (self.prev_char, self.prev_key) {
            (Some(c), Some(key)) => c.is_ascii_digit() && key.code == c as u32,
            _ => false,
        }
    }

    // ========== Modes and toggles ==========

    fn change_mode(&mut self) {
        self.modes.toggle_mode();
        self.reset_session();
    }

    fn toggle(&mut self, request: ToggleRequest) -> Result<()> {
        debug!(?request, "toggle");
        match request {
            ToggleRequest::InputMode => self.change_mode(),
            ToggleRequest::PhoneticMode => {
                if self.lexicon.properties().phonetic_supported {
                    self.editor.r_shift()?;
                }
            }
            ToggleRequest::SingleChar => self.editor.toggle_single_char()?,
            ToggleRequest::AutoCommit => self.modes.toggle_auto_commit()?,
            ToggleRequest::FullWidthLetter => self.modes.toggle_full_width_letter()?,
            ToggleRequest::FullWidthPunct => self.modes.toggle_full_width_punct()?,
            ToggleRequest::CharsetMode => {
                self.editor.next_charset_mode()?;
                self.reset_session();
            }
        }
        Ok(())
    }

    /// Host request to flip a toggle (status area click).
    pub fn activate_property(&mut self, request: ToggleRequest) -> Result<()> {
        self.drain_config_changes();
        self.toggle(request)?;
        self.refresh()
    }

    /// Apply a config change event. Changes for other sections are ignored.
    pub fn config_changed(&mut self, change: &ConfigChange) -> bool {
        if change.section != self.section {
            return false;
        }
        let changed = if change.name == keys::LOOKUP_TABLE_SELECT_KEYS {
            change
                .value
                .as_str()
                .is_some_and(|value| self.settings.set_select_keys(value))
        } else {
            self.modes.apply_change(change) || self.editor.apply_change(change)
        };
        if changed {
            debug!(name = %change.name, value = ?change.value, "config changed");
            self.refresh_properties();
        }
        changed
    }

    fn drain_config_changes(&mut self) {
        while let Ok(change) = self.config_rx.try_recv() {
            self.config_changed(&change);
        }
    }

    // ========== Host lifecycle ==========

    fn reset_session(&mut self) {
        self.editor.clear();
        self.modes.reset_quotes();
        self.prev_key = None;
    }

    /// Drop all composition state.
    pub fn reset(&mut self) -> Result<()> {
        self.reset_session();
        self.refresh()
    }

    pub fn focus_in(&mut self) -> Result<()> {
        if !self.enabled {
            return Ok(());
        }
        self.drain_config_changes();
        self.refresh()
    }

    /// Commit the visible preedit and reset.
    pub fn focus_out(&mut self) -> Result<()> {
        self.context.commit_text.clear();
        let text = self.editor.preedit_text();
        self.commit_string(&text);
        self.reset()
    }

    pub fn enable(&mut self) -> Result<()> {
        self.enabled = true;
        self.focus_in()
    }

    pub fn disable(&mut self) -> Result<()> {
        self.reset()?;
        self.enabled = false;
        Ok(())
    }

    /// Host page-up button. Always consumed.
    pub fn page_up(&mut self) -> Result<bool> {
        self.editor.page_up()?;
        self.refresh()?;
        Ok(true)
    }

    /// Host page-down button.
    pub fn page_down(&mut self) -> Result<bool> {
        let moved = self.editor.page_down()?;
        self.refresh()?;
        Ok(moved)
    }

    // ========== UI state ==========

    fn refresh(&mut self) -> Result<()> {
        let composition = self.editor.composition();
        self.context.preedit_visible = !composition.is_empty();
        self.context.composition = composition;

        let aux = self.editor.aux_text()?;
        self.context.auxiliary_visible = !aux.is_empty();
        self.context.auxiliary_text = aux;

        let table = self.editor.lookup_table();
        let labels: Vec<String> = table
            .current_page_candidates()
            .iter()
            .map(Candidate::label)
            .collect();
        let select_keys = self.settings.select_keys.chars().take(labels.len()).collect();
        self.context.table = TableView {
            labels,
            select_keys,
            cursor: table.cursor_pos_in_current_page(),
            cursor_visible: table.is_cursor_visible(),
            orientation: table.orientation(),
            page: table.cursor_pos() / table.page_size().max(1),
            pages: table.num_pages(),
        };
        self.context.table_visible = !table.is_empty() && !self.editor.is_empty();
        self.refresh_properties();
        Ok(())
    }

    fn refresh_properties(&mut self) {
        let props = self.lexicon.properties();
        let table_mode = self.modes.is_table();
        let mut list = vec![Property::new(
            ToggleRequest::InputMode,
            table_mode,
            if table_mode { props.status_prompt.as_str() } else { "EN" },
            "Switch to English/Table mode",
        )];
        if props.is_chinese {
            if let Some(mode) = self.editor.charset_mode() {
                list.push(Property::new(
                    ToggleRequest::CharsetMode,
                    true,
                    mode.label(),
                    "Switch Chinese charset mode",
                ));
            }
        }
        let letter = self.modes.full_width_letter();
        list.push(Property::new(
            ToggleRequest::FullWidthLetter,
            letter,
            if letter { "Full width letter" } else { "Half width letter" },
            "Switch full/half width letter",
        ));
        let punct = self.modes.full_width_punct();
        list.push(Property::new(
            ToggleRequest::FullWidthPunct,
            punct,
            if punct { "Full width punct" } else { "Half width punct" },
            "Switch full/half width punctuation",
        ));
        if props.phonetic_supported {
            let phonetic = self.editor.is_phonetic();
            list.push(Property::new(
                ToggleRequest::PhoneticMode,
                phonetic,
                if phonetic { "Phonetic mode" } else { "Table mode" },
                "Switch phonetic/table code",
            ));
        }
        let single = self.editor.single_char();
        list.push(Property::new(
            ToggleRequest::SingleChar,
            single,
            if single { "Single char mode" } else { "Phrase mode" },
            "Switch single char/phrase candidates",
        ));
        let auto_commit = self.modes.auto_commit();
        list.push(Property::new(
            ToggleRequest::AutoCommit,
            auto_commit,
            if auto_commit { "Direct commit mode" } else { "Normal commit mode" },
            "Switch direct/normal commit",
        ));

        if list != self.context.properties {
            self.context.properties = list;
            self.context.properties_changed = true;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ConfigValue, MemoryConfig};
    use crate::lexicon::{ImeProperties, MemoryLexicon};
    use crate::parser::TabKeyParser;

    fn engine_with(props: ImeProperties) -> (Arc<MemoryConfig>, TableEngine<MemoryLexicon, TabKeyParser>) {
        let lex = MemoryLexicon::new(props);
        lex.insert("zh", "中", 100).unwrap();
        lex.insert("zhg", "中国", 80).unwrap();
        lex.insert("wn", "文", 90).unwrap();
        let store = Arc::new(MemoryConfig::new());
        store
            .set("engine/Table/Table", keys::CHINESE_MODE, ConfigValue::Int(4))
            .unwrap();
        let engine = TableEngine::new(
            Arc::new(lex),
            TabKeyParser::default(),
            store.clone(),
            Config::default(),
        )
        .unwrap();
        (store, engine)
    }

    fn engine() -> TableEngine<MemoryLexicon, TabKeyParser> {
        engine_with(ImeProperties::default()).1
    }

    fn press(engine: &mut TableEngine<MemoryLexicon, TabKeyParser>, s: &str) -> String {
        let mut out = String::new();
        for ch in s.chars() {
            engine.process_key(KeyEvent::char(ch)).unwrap();
            out.push_str(&engine.take_commit());
        }
        out
    }

    #[test]
    fn test_select_key_commits() {
        let mut e = engine();
        assert_eq!(press(&mut e, "zh"), "");
        assert!(e.context().table_visible);
        assert_eq!(e.context().table.labels, vec!["中", "中国g"]);
        assert_eq!(e.context().table.select_keys, vec!['1', '2']);
        assert_eq!(press(&mut e, "2"), "中国");
        assert!(!e.context().preedit_visible);
        assert!(!e.context().table_visible);
    }

    #[test]
    fn test_select_key_past_candidates_not_consumed() {
        let mut e = engine();
        press(&mut e, "zh");
        assert_eq!(e.editor().candidates().len(), 2);
        let res = e.process_key(KeyEvent::char('5')).unwrap();
        assert_eq!(res, KeyResult::NotHandled);
        assert_eq!(e.take_commit(), "");
        assert_eq!(e.editor().input().valid(), &['z', 'h']);
        assert!(e.context().table_visible);
        // a slot that holds a candidate still commits
        assert_eq!(press(&mut e, "1"), "中");
    }

    #[test]
    fn test_space_and_punct_after_code() {
        let mut e = engine();
        assert_eq!(press(&mut e, "zh "), "中");
        // ',' is not table input: best candidate plus full-width comma
        assert_eq!(press(&mut e, "wn,"), "文，");
    }

    #[test]
    fn test_empty_editor_direct_commits() {
        let mut e = engine();
        assert_eq!(press(&mut e, "1"), "1");
        assert_eq!(press(&mut e, "."), ".");
        assert_eq!(press(&mut e, "."), "。");
        let res = e.process_key(KeyEvent::char(' ')).unwrap();
        assert_eq!(res, KeyResult::NotHandled);
        let res = e.process_key(KeyEvent::press(keysym::BACKSPACE, ModifierType::empty())).unwrap();
        assert_eq!(res, KeyResult::NotHandled);
    }

    #[test]
    fn test_shift_l_toggles_mode() {
        let mut e = engine();
        e.process_key(KeyEvent::press(keysym::SHIFT_L, ModifierType::empty())).unwrap();
        let res = e
            .process_key(KeyEvent::release(keysym::SHIFT_L, ModifierType::SHIFT))
            .unwrap();
        assert!(res.is_handled());
        assert!(!e.modes().is_table());
        assert_eq!(e.properties()[0].label, "EN");
        // English mode passes letters through
        let res = e.process_key(KeyEvent::char('z')).unwrap();
        assert_eq!(res, KeyResult::NotHandled);
    }

    #[test]
    fn test_escape_and_return() {
        let mut e = engine();
        press(&mut e, "zh");
        e.process_key(KeyEvent::press(keysym::ESCAPE, ModifierType::empty())).unwrap();
        assert!(e.editor().is_empty());
        assert!(!e.context().preedit_visible);

        press(&mut e, "zh");
        e.process_key(KeyEvent::press(keysym::RETURN, ModifierType::empty())).unwrap();
        assert_eq!(e.take_commit(), "zh");
    }

    #[test]
    fn test_toggle_persists_and_reports_property() {
        let (store, mut e) = engine_with(ImeProperties::default());
        e.context_mut().properties_changed = false;
        e.process_key(KeyEvent::press(keysym::SLASH, ModifierType::CONTROL)).unwrap();
        assert!(e.modes().auto_commit());
        assert_eq!(
            store.get(e.section(), keys::AUTO_COMMIT).unwrap(),
            Some(ConfigValue::Bool(true))
        );
        assert!(e.context().properties_changed);
    }

    #[test]
    fn test_external_change_applied_before_next_key() {
        let (store, mut e) = engine_with(ImeProperties::default());
        store
            .set(e.section(), keys::TAB_FULL_WIDTH_LETTER, ConfigValue::Bool(true))
            .unwrap();
        assert_eq!(press(&mut e, "1"), "１");
    }

    #[test]
    fn test_disabled_engine_passes_keys() {
        let mut e = engine();
        e.disable().unwrap();
        assert_eq!(e.process_key(KeyEvent::char('z')).unwrap(), KeyResult::NotHandled);
        e.enable().unwrap();
        assert!(e.process_key(KeyEvent::char('z')).unwrap().is_handled());
    }

    #[test]
    fn test_focus_out_commits_preedit() {
        let mut e = engine();
        press(&mut e, "zh");
        e.focus_out().unwrap();
        assert_eq!(e.take_commit(), "中");
        assert!(e.editor().is_empty());
    }
}
