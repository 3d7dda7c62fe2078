// core/tests/preedit_caret.rs
//
// Editor preedit segments, cursor movement and caret placement.
//
// Tests cover:
// - Caret after committing, moving and typing in the middle of the preedit
// - Segment-wise navigation wrapping at both ends
// - add/pop inverse over several buffers, with and without invalid tails

use libtable_core::config::keys;
use libtable_core::{
    Config, ConfigStore, ConfigValue, Editor, ImeProperties, MemoryConfig, MemoryLexicon,
    PreeditCursor, SpanKind, TabKeyParser,
};
use std::sync::Arc;

fn editor() -> Editor<MemoryLexicon, TabKeyParser> {
    let lex = MemoryLexicon::new(ImeProperties::default());
    for (code, phrase, freq) in [("zh", "中", 100), ("wn", "文", 90), ("gu", "国", 70)] {
        lex.insert(code, phrase, freq).unwrap();
    }
    let store = Arc::new(MemoryConfig::new());
    store.set("s", keys::CHINESE_MODE, ConfigValue::Int(4)).unwrap();
    Editor::new(Arc::new(lex), TabKeyParser::default(), store, "s", &Config::default()).unwrap()
}

fn type_str(ed: &mut Editor<MemoryLexicon, TabKeyParser>, s: &str) {
    for ch in s.chars() {
        ed.add_input(ch).unwrap();
    }
}

#[test]
fn test_typing_in_the_middle_of_the_preedit() {
    let mut ed = editor();
    type_str(&mut ed, "zh");
    ed.commit_to_preedit().unwrap();
    type_str(&mut ed, "wn");
    ed.commit_to_preedit().unwrap();
    assert_eq!(ed.preedit().cursor(), PreeditCursor::new(2, 0));
    assert_eq!(ed.composition().caret, 2);

    assert!(ed.arrow_left().unwrap());
    assert_eq!(ed.preedit().cursor(), PreeditCursor::new(1, 0));
    assert_eq!(ed.composition().caret, 1);

    type_str(&mut ed, "gu");
    let comp = ed.composition();
    let kinds: Vec<(SpanKind, &str)> = comp.spans.iter().map(|s| (s.kind, s.text.as_str())).collect();
    assert_eq!(
        kinds,
        vec![
            (SpanKind::Confirmed, "中"),
            (SpanKind::CandidatePreview, "国"),
            (SpanKind::Confirmed, "文"),
        ]
    );
    assert_eq!(comp.caret, 2);

    ed.commit_to_preedit().unwrap();
    assert_eq!(ed.preedit().segments(), &["中", "国", "文"]);
    assert_eq!(ed.preedit().cursor(), PreeditCursor::new(2, 0));
    assert_eq!(ed.preedit_text(), "中国文");
}

#[test]
fn test_segment_navigation_wraps() {
    let mut ed = editor();
    for code in ["zh", "gu", "wn"] {
        type_str(&mut ed, code);
        ed.commit_to_preedit().unwrap();
    }
    assert_eq!(ed.preedit().cursor(), PreeditCursor::new(3, 0));

    // from the end, wrap to just after the first segment
    assert!(ed.control_arrow_right().unwrap());
    assert_eq!(ed.preedit().cursor(), PreeditCursor::new(1, 0));
    assert!(ed.control_arrow_left().unwrap());
    assert_eq!(ed.preedit().cursor(), PreeditCursor::new(0, 0));
    // from the start, wrap to the last segment
    assert!(ed.control_arrow_left().unwrap());
    assert_eq!(ed.preedit().cursor(), PreeditCursor::new(2, 0));
    assert_eq!(ed.composition().caret, 2);

    // plain arrows step over a one-char segment, then wrap
    assert!(ed.arrow_right().unwrap());
    assert_eq!(ed.preedit().cursor(), PreeditCursor::new(3, 0));
    assert!(ed.arrow_right().unwrap());
    assert_eq!(ed.preedit().cursor(), PreeditCursor::new(0, 0));
}

#[test]
fn test_add_pop_inverse_over_buffers() {
    for (prefix, suffix) in [("", "zh"), ("z", "hg"), ("zh", "x"), ("w", "nq"), ("g", "u")] {
        let mut ed = editor();
        type_str(&mut ed, prefix);
        let before = (ed.input().valid().to_vec(), ed.input().invalid().to_vec());
        type_str(&mut ed, suffix);
        for _ in suffix.chars() {
            ed.pop_input().unwrap();
        }
        let after = (ed.input().valid().to_vec(), ed.input().invalid().to_vec());
        assert_eq!(after, before, "prefix {:?} suffix {:?}", prefix, suffix);
    }
}
