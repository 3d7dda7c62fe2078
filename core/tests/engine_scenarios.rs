// core/tests/engine_scenarios.rs
//
// End-to-end key sequences through TableEngine.
//
// Tests cover:
// - Selection commit and phrase learning calls
// - Auto-commit at the max key length and backspacing into it
// - User phrase deletion with Alt+number
// - Charset priority ordering and paging on short lists
// - Config change notification
// - Rollback when the lexicon fails mid-key

use libtable_core::candidate::{category, CharsetRestriction};
use libtable_core::{
    keysym, Candidate, Config, ConfigStore, ConfigValue, ImeProperties, KeyEvent, KeyResult,
    Lexicon, MemoryConfig, MemoryLexicon, ModifierType, ParsedCode, SpanKind, TabKeyParser,
    TableEngine,
};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

const SECTION: &str = "engine/Table/Table";

/// Lexicon wrapper that records learning calls and can be made to fail.
struct RecordingLexicon {
    inner: MemoryLexicon,
    checked: Mutex<Vec<(String, String)>>,
    removed: Mutex<Vec<String>>,
    fail: AtomicBool,
}

impl RecordingLexicon {
    fn new(inner: MemoryLexicon) -> Self {
        Self {
            inner,
            checked: Mutex::new(Vec::new()),
            removed: Mutex::new(Vec::new()),
            fail: AtomicBool::new(false),
        }
    }

    fn check_fail(&self) -> anyhow::Result<()> {
        if self.fail.load(Ordering::SeqCst) {
            anyhow::bail!("lexicon unavailable");
        }
        Ok(())
    }

    fn checked(&self) -> Vec<(String, String)> {
        self.checked.lock().unwrap().clone()
    }

    fn removed(&self) -> Vec<String> {
        self.removed.lock().unwrap().clone()
    }
}

impl Lexicon for RecordingLexicon {
    fn properties(&self) -> &ImeProperties {
        self.inner.properties()
    }

    fn select_phrases(
        &self,
        codes: &[ParsedCode],
        single_char: bool,
        restriction: CharsetRestriction,
    ) -> anyhow::Result<Vec<Candidate>> {
        self.check_fail()?;
        self.inner.select_phrases(codes, single_char, restriction)
    }

    fn select_by_phonetic(&self, codes: &[ParsedCode]) -> anyhow::Result<Vec<Candidate>> {
        self.check_fail()?;
        self.inner.select_by_phonetic(codes)
    }

    fn check_phrase(&self, phrase: &str, input: &str) -> anyhow::Result<()> {
        self.check_fail()?;
        self.checked
            .lock()
            .unwrap()
            .push((phrase.to_string(), input.to_string()));
        self.inner.check_phrase(phrase, input)
    }

    fn remove_phrase(&self, candidate: &Candidate) -> anyhow::Result<()> {
        self.check_fail()?;
        self.removed.lock().unwrap().push(candidate.phrase.clone());
        self.inner.remove_phrase(candidate)
    }

    fn lookup_code_for_char(&self, ch: char) -> anyhow::Result<Vec<String>> {
        self.inner.lookup_code_for_char(ch)
    }

    fn codes_for_phrase(&self, phrase: &str) -> anyhow::Result<String> {
        self.inner.codes_for_phrase(phrase)
    }
}

type Engine = TableEngine<RecordingLexicon, TabKeyParser>;

fn setup(props: ImeProperties, rows: &[(&str, &str, i64)]) -> (Arc<RecordingLexicon>, Arc<MemoryConfig>, Engine) {
    let inner = MemoryLexicon::new(props);
    for (code, phrase, freq) in rows {
        inner.insert(code, phrase, *freq).unwrap();
    }
    setup_with(inner, 4)
}

fn setup_with(inner: MemoryLexicon, charset: i64) -> (Arc<RecordingLexicon>, Arc<MemoryConfig>, Engine) {
    let lex = Arc::new(RecordingLexicon::new(inner));
    let store = Arc::new(MemoryConfig::new());
    store.set(SECTION, "ChineseMode", ConfigValue::Int(charset)).unwrap();
    let engine = TableEngine::new(lex.clone(), TabKeyParser::default(), store.clone(), Config::default()).unwrap();
    (lex, store, engine)
}

fn type_keys(engine: &mut Engine, keys: &str) -> String {
    let mut out = String::new();
    for ch in keys.chars() {
        engine.process_key(KeyEvent::char(ch)).unwrap();
        out.push_str(&engine.take_commit());
    }
    out
}

fn key(engine: &mut Engine, code: u32, mask: ModifierType) -> KeyResult {
    engine.process_key(KeyEvent::press(code, mask)).unwrap()
}

#[test]
fn test_select_commits_and_learns() {
    let (lex, _store, mut engine) = setup(ImeProperties::default(), &[("zh", "中", 100)]);

    assert_eq!(type_keys(&mut engine, "zh"), "");
    assert_eq!(engine.context().table.labels, vec!["中"]);
    assert_eq!(engine.context().auxiliary_text, "zh");

    assert_eq!(type_keys(&mut engine, "1"), "中");
    assert!(engine.editor().input().is_empty());
    assert!(engine.editor().is_empty());
    assert_eq!(lex.checked(), vec![("中".to_string(), "zh".to_string())]);
}

#[test]
fn test_auto_commit_at_max_key_length() {
    let props = ImeProperties {
        max_key_length: 2,
        ..ImeProperties::default()
    };
    let (lex, _store, mut engine) = setup(props, &[("zh", "中", 100), ("wn", "文", 90)]);

    type_keys(&mut engine, "zhw");
    assert!(engine.editor().input().len() <= 2);
    let comp = &engine.context().composition;
    assert_eq!(comp.text(), "中文");
    assert_eq!(
        comp.highlights(),
        vec![(SpanKind::Pending, 0..1), (SpanKind::CandidatePreview, 1..2)]
    );
    assert_eq!(comp.caret, 2);

    assert_eq!(type_keys(&mut engine, "n "), "中文");
    assert_eq!(lex.checked(), vec![("中文".to_string(), "zhwn".to_string())]);
}

#[test]
fn test_backspace_returns_into_auto_commit() {
    let props = ImeProperties {
        max_key_length: 2,
        ..ImeProperties::default()
    };
    let (_lex, _store, mut engine) = setup(props, &[("zh", "中", 100), ("wn", "文", 90)]);

    type_keys(&mut engine, "zhw");
    key(&mut engine, keysym::BACKSPACE, ModifierType::empty());
    assert_eq!(engine.editor().input().valid(), &['z', 'h']);
    assert_eq!(engine.context().preedit_text(), "中");
    assert_eq!(engine.context().auxiliary_text, "zh");
}

#[test]
fn test_alt_number_deletes_only_user_phrases() {
    let inner = MemoryLexicon::new(ImeProperties::default());
    inner.insert("zh", "中", 100).unwrap();
    inner.insert_user_phrase("zh", "中华").unwrap();
    let (lex, _store, mut engine) = setup_with(inner, 4);

    type_keys(&mut engine, "zh");
    // user phrases rank first
    assert_eq!(engine.context().table.labels, vec!["中华", "中"]);

    let res = key(&mut engine, '2' as u32, ModifierType::MOD1);
    assert_eq!(res, KeyResult::NotHandled);
    assert!(lex.removed().is_empty());
    assert_eq!(engine.editor().candidates().len(), 2);

    let res = key(&mut engine, '1' as u32, ModifierType::MOD1);
    assert_eq!(res, KeyResult::Handled);
    assert_eq!(lex.removed(), vec!["中华".to_string()]);
    assert_eq!(engine.context().table.labels, vec!["中"]);
}

#[test]
fn test_ctrl_number_places_without_commit() {
    let (_lex, _store, mut engine) = setup(ImeProperties::default(), &[("zh", "中", 100), ("zhg", "中国", 1)]);
    type_keys(&mut engine, "zh");
    let res = key(&mut engine, '2' as u32, ModifierType::CONTROL);
    assert!(res.is_handled());
    assert_eq!(engine.take_commit(), "");
    assert_eq!(engine.context().preedit_text(), "中国");
    assert_eq!(engine.editor().preedit().cursor().segment, 1);
}

#[test]
fn test_charset_priority_ordering() {
    let inner = MemoryLexicon::new(ImeProperties::default());
    inner.insert_with_category("ab", "甲", 0, category::SIMPLIFIED).unwrap();
    inner.insert_with_category("ab", "乙", 0, category::TRADITIONAL).unwrap();
    inner.insert_with_category("ab", "丙", 0, category::EXTENDED).unwrap();
    inner
        .insert_with_category("ab", "丁", 0, category::SIMPLIFIED | category::TRADITIONAL)
        .unwrap();
    let (_lex, _store, mut engine) = setup_with(inner, 2);

    type_keys(&mut engine, "ab");
    assert_eq!(engine.context().table.labels, vec!["甲", "丁", "乙", "丙"]);
}

#[test]
fn test_simplified_only_restricts() {
    let inner = MemoryLexicon::new(ImeProperties::default());
    inner.insert_with_category("ab", "甲", 0, category::SIMPLIFIED).unwrap();
    inner.insert_with_category("ab", "乙", 0, category::TRADITIONAL).unwrap();
    let (_lex, _store, mut engine) = setup_with(inner, 0);

    type_keys(&mut engine, "ab");
    assert_eq!(engine.context().table.labels, vec!["甲"]);
}

#[test]
fn test_paging_short_list_is_idempotent() {
    let (_lex, _store, mut engine) = setup(
        ImeProperties::default(),
        &[("zh", "中", 100), ("zhg", "中国", 80), ("zhw", "中文", 70)],
    );
    type_keys(&mut engine, "zh");
    let before = engine.context().table.clone();

    assert!(key(&mut engine, keysym::PAGE_DOWN, ModifierType::empty()).is_handled());
    assert_eq!(engine.context().table, before);
    assert!(key(&mut engine, keysym::PAGE_UP, ModifierType::empty()).is_handled());
    assert_eq!(engine.context().table, before);
    // '=' pages too, since it is not table input here
    assert!(key(&mut engine, keysym::EQUAL, ModifierType::empty()).is_handled());
    assert_eq!(engine.editor().lookup_table().cursor_pos(), 0);
}

#[test]
fn test_cursor_keys_move_highlight() {
    let (_lex, _store, mut engine) = setup(ImeProperties::default(), &[("zh", "中", 100), ("zhg", "中国", 80)]);
    type_keys(&mut engine, "zh");
    key(&mut engine, keysym::DOWN, ModifierType::empty());
    assert_eq!(engine.context().table.cursor, 1);
    assert_eq!(engine.context().composition.preview(), Some("中国"));
    assert_eq!(type_keys(&mut engine, " "), "中国");
}

#[test]
fn test_config_change_notification() {
    let inner = MemoryLexicon::new(ImeProperties::default());
    inner.insert_with_category("ab", "甲", 0, category::SIMPLIFIED).unwrap();
    inner.insert_with_category("ab", "乙", 0, category::TRADITIONAL).unwrap();
    let (_lex, store, mut engine) = setup_with(inner, 0);

    store.set(SECTION, "ChineseMode", ConfigValue::Int(1)).unwrap();
    store.set("engine/Table/Other", "ChineseMode", ConfigValue::Int(0)).unwrap();
    type_keys(&mut engine, "ab");
    assert_eq!(engine.context().table.labels, vec!["乙"]);

    store.set(SECTION, "LookupTableSelectKeys", ConfigValue::Str("a,s,d".into())).unwrap();
    key(&mut engine, keysym::ESCAPE, ModifierType::empty());
    assert_eq!(engine.select_keys(), "asd");
}

#[test]
fn test_charset_hotkey_cycles_and_persists() {
    let (_lex, store, mut engine) = setup(ImeProperties::default(), &[("zh", "中", 100)]);
    type_keys(&mut engine, "zh");
    key(&mut engine, keysym::SEMICOLON, ModifierType::CONTROL);
    assert_eq!(store.get(SECTION, "ChineseMode").unwrap(), Some(ConfigValue::Int(0)));
    // cycling resets the session
    assert!(engine.editor().is_empty());
}

#[test]
fn test_failure_rolls_back_key() {
    let (lex, _store, mut engine) = setup(ImeProperties::default(), &[("zh", "中", 100), ("z", "在", 10)]);
    type_keys(&mut engine, "z");
    let before = engine.context().preedit_text();

    lex.fail.store(true, Ordering::SeqCst);
    assert!(engine.process_key(KeyEvent::char('h')).is_err());
    assert_eq!(engine.editor().input().valid(), &['z']);
    assert_eq!(engine.context().preedit_text(), before);
    assert_eq!(engine.take_commit(), "");

    lex.fail.store(false, Ordering::SeqCst);
    type_keys(&mut engine, "h");
    assert_eq!(engine.context().table.labels, vec!["中"]);
}

#[test]
fn test_auto_commit_single_candidate() {
    let props = ImeProperties {
        max_key_length: 2,
        auto_commit: true,
        ..ImeProperties::default()
    };
    let (_lex, _store, mut engine) = setup(props, &[("zh", "中", 100), ("wn", "文", 90)]);
    assert_eq!(type_keys(&mut engine, "zh"), "中");
    assert!(engine.editor().is_empty());
}

#[test]
fn test_invalid_tail_blocks_space() {
    let (_lex, _store, mut engine) = setup(ImeProperties::default(), &[("zh", "中", 100), ("zhg", "中国", 80)]);
    type_keys(&mut engine, "zq");
    assert_eq!(engine.editor().input().invalid(), &['q']);
    assert!(engine.process_key(KeyEvent::char(' ')).unwrap().is_handled());
    assert_eq!(engine.take_commit(), "");
    assert_eq!(engine.context().preedit_text(), "zq");
}
