// libtable/tests/typing_session.rs
//
// A table loaded from source text driven through key lines.
//
// Tests cover:
// - Selection, space and punctuation commits on a loaded table
// - Seeded toggles from the front-end config
// - Escape/Return and the English mode toggle
// - Named keys for Ctrl hot-keys

use libtable::{engine_for, load_table, parse_key_line, Engine, KeyResult, TableConfig};
use std::sync::Arc;

const TABLE: &str = "\
### test table
BEGIN_DEFINITION
NAME = Wubi Mini
MAX_KEY_LENGTH = 4
VALID_INPUT_CHARS = abcdefghijklmnopqrstuvwxy
LANGUAGES = zh_CN
END_DEFINITION
BEGIN_TABLE
g\t一\t100
gg\t王\t80
wq\t你\t90
wqiy\t你们\t40
END_TABLE
";

const CONFIG: &str = r#"
page_size = 5

[settings."engine/Table/Wubi_Mini"]
ChineseMode = 4
"#;

fn engine() -> Engine {
    let config = TableConfig::from_toml_str(CONFIG).unwrap();
    let store = Arc::new(config.store().unwrap());
    engine_for(load_table(TABLE, None).unwrap(), store, config.into_base()).unwrap()
}

/// Type a key line; returns the text committed by the engine.
fn type_line(engine: &mut Engine, line: &str) -> String {
    let mut out = String::new();
    for key in parse_key_line(line).unwrap() {
        engine.process_key(key).unwrap();
        out.push_str(&engine.take_commit());
    }
    out
}

#[test]
fn test_select_from_loaded_table() {
    let mut e = engine();
    assert_eq!(e.section(), "engine/Table/Wubi_Mini");
    assert_eq!(type_line(&mut e, "wq"), "");
    assert!(e.context().table_visible);
    assert_eq!(e.context().table.labels, vec!["你", "你们iy"]);
    assert_eq!(e.context().auxiliary_text, "wq");
    assert_eq!(type_line(&mut e, "2"), "你们");
    assert!(e.editor().is_empty());
}

#[test]
fn test_space_and_punctuation_commit() {
    let mut e = engine();
    assert_eq!(type_line(&mut e, "gg<space>"), "王");
    assert_eq!(type_line(&mut e, "wq,"), "你，");
}

#[test]
fn test_escape_and_return() {
    let mut e = engine();
    type_line(&mut e, "wq<Escape>");
    assert!(e.editor().is_empty());
    assert!(!e.context().table_visible);
    assert_eq!(type_line(&mut e, "wq<Return>"), "wq");
}

#[test]
fn test_shift_l_switches_to_english() {
    let mut e = engine();
    type_line(&mut e, "<Shift_L>");
    assert!(!e.modes().is_table());
    let keys = parse_key_line("a").unwrap();
    assert_eq!(e.process_key(keys[0]).unwrap(), KeyResult::NotHandled);
    type_line(&mut e, "<Shift_L>");
    assert!(e.modes().is_table());
}

#[test]
fn test_ctrl_hotkeys_by_name() {
    let mut e = engine();
    assert!(!e.modes().auto_commit());
    type_line(&mut e, "<C-slash>");
    assert!(e.modes().auto_commit());
    assert!(!e.editor().single_char());
    type_line(&mut e, "<C-comma>");
    assert!(e.editor().single_char());
    // single-char mode keeps 你们 out of the list
    type_line(&mut e, "wq");
    assert_eq!(e.context().table.labels, vec!["你"]);
}
