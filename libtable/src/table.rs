//! Table source loader.
//!
//! Reads the plain-text table format: `###` comments, a property header of
//! `KEY = VALUE` lines, phrase lines `code<TAB>phrase<TAB>freq` and optional
//! construction-code lines `phrase<TAB>code`. Sections may be delimited with
//! `BEGIN_DEFINITION`/`END_DEFINITION`, `BEGIN_TABLE`/`END_TABLE` and
//! `BEGIN_GOUCI`/`END_GOUCI`; outside a section each line is classified by
//! its shape, properties first.
//!
//! The phonetic source (for tables with `PINYIN_MODE = TRUE`) holds
//! `char<WS>spelling<WS>freq` lines with tone digits 1-5, `#` comments.

use anyhow::{bail, Context, Result};
use libtable_core::parser::{DEFAULT_TAB_KEYS, TONE_SYMBOLS};
use libtable_core::{CharsetMode, ImeProperties, MemoryLexicon, TabKeyParser};
use once_cell::sync::Lazy;
use regex::Regex;
use std::path::Path;
use tracing::{debug, trace, warn};

static COMMENT: Lazy<Regex> = Lazy::new(|| Regex::new(r"^###").expect("valid regex"));
static BLANK: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[ \t]*$").expect("valid regex"));
static SECTION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(BEGIN|END)_(DEFINITION|TABLE|GOUCI)\s*$").expect("valid regex"));
static PROPERTY: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[^\t]*=[^\t]*$").expect("valid regex"));
static PHRASE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([^\t]+)\t([^\t]+)\t[ \t]*(-?\d+)[ \t]*$").expect("valid regex"));
static PHRASE_SHAPE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^.*\t.*\t.*$").expect("valid regex"));
static GOUCI: Lazy<Regex> = Lazy::new(|| Regex::new(r"^.*\t.*$").expect("valid regex"));
static PINYIN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\S)\s+([a-z]+[1-5]?)\s+(-?\d+)\s*$").expect("valid regex"));

/// One phrase line of the table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhraseRow {
    pub code: String,
    pub phrase: String,
    pub freq: i64,
}

/// One line of the phonetic source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PinyinRow {
    pub ch: char,
    /// Spelling with the tone as a tone symbol (`!@#$%`)
    pub spelling: String,
    pub freq: i64,
}

/// Parsed table source, before it is turned into a lexicon.
#[derive(Debug, Clone, Default)]
pub struct TableSource {
    /// `(lowercased key, value)` in file order
    pub attributes: Vec<(String, String)>,
    pub phrases: Vec<PhraseRow>,
    /// Construction-code lines seen; codes are derived from the phrases
    pub goucima_lines: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    None,
    Definition,
    Table,
    Gouci,
}

fn parse_attribute(line: &str) -> Option<(String, String)> {
    let (key, value) = line.split_once("==").or_else(|| line.split_once('='))?;
    Some((key.trim().to_lowercase(), value.trim().to_string()))
}

fn parse_phrase(line: &str, lineno: usize) -> Result<PhraseRow> {
    let caps = PHRASE
        .captures(line)
        .with_context(|| format!("line {}: expected code<TAB>phrase<TAB>freq", lineno))?;
    let freq = caps[3]
        .parse::<i64>()
        .with_context(|| format!("line {}: bad frequency {:?}", lineno, &caps[3]))?;
    Ok(PhraseRow {
        code: caps[1].trim().to_string(),
        phrase: caps[2].trim().to_string(),
        freq,
    })
}

/// Split a table source into attributes and phrase rows.
pub fn parse_source(text: &str) -> Result<TableSource> {
    let mut source = TableSource::default();
    let mut section = Section::None;

    for (idx, raw) in text.lines().enumerate() {
        let lineno = idx + 1;
        let line = raw.trim_end_matches('\r');
        if COMMENT.is_match(line) || BLANK.is_match(line) {
            continue;
        }
        if let Some(caps) = SECTION.captures(line) {
            let named = match &caps[2] {
                "DEFINITION" => Section::Definition,
                "TABLE" => Section::Table,
                _ => Section::Gouci,
            };
            section = if &caps[1] == "BEGIN" {
                named
            } else if section == named {
                Section::None
            } else {
                bail!("line {}: {} closes a section that is not open", lineno, line);
            };
            continue;
        }

        match section {
            Section::Definition => match parse_attribute(line) {
                Some(attr) => source.attributes.push(attr),
                None => bail!("line {}: expected KEY = VALUE", lineno),
            },
            Section::Table => source.phrases.push(parse_phrase(line, lineno)?),
            Section::Gouci => source.goucima_lines += 1,
            Section::None => {
                if PROPERTY.is_match(line) {
                    if let Some(attr) = parse_attribute(line) {
                        source.attributes.push(attr);
                    }
                } else if PHRASE_SHAPE.is_match(line) {
                    source.phrases.push(parse_phrase(line, lineno)?);
                } else if GOUCI.is_match(line) {
                    source.goucima_lines += 1;
                } else {
                    trace!(lineno, line, "skipping unrecognized line");
                }
            }
        }
    }
    if section != Section::None {
        bail!("unterminated {:?} section", section);
    }
    Ok(source)
}

fn parse_bool(value: &str) -> bool {
    value.eq_ignore_ascii_case("true")
}

/// Map table attributes onto engine properties.
///
/// Unknown attributes are ignored. `MAX_KEY_LENGTH` defaults to the longest
/// phrase code and the complete lengths are the code lengths of the
/// multi-character phrases.
pub fn properties_from(source: &TableSource) -> Result<ImeProperties> {
    let mut props = ImeProperties::default();
    let mut max_key_length = None;

    for (key, value) in &source.attributes {
        match key.as_str() {
            "name" => props.name = value.clone(),
            "max_key_length" => {
                let len = value
                    .parse::<usize>()
                    .with_context(|| format!("MAX_KEY_LENGTH {:?} is not a number", value))?;
                max_key_length = Some(len);
            }
            "valid_input_chars" => props.valid_input_chars = value.clone(),
            "start_chars" => props.start_chars = value.chars().collect(),
            "pinyin_mode" => props.phonetic_supported = parse_bool(value),
            "auto_select" => props.auto_select = parse_bool(value),
            "auto_commit" => props.auto_commit = parse_bool(value),
            "def_full_width_letter" => props.full_width_letter = parse_bool(value),
            "def_full_width_punct" => props.full_width_punct = parse_bool(value),
            "user_can_define_phrase" => props.user_can_define_phrase = parse_bool(value),
            "status_prompt" => props.status_prompt = value.clone(),
            "languages" => {
                props.is_chinese = value
                    .split(',')
                    .any(|lang| lang.trim().to_lowercase().contains("zh"));
            }
            "language_filter" => {
                props.charset_mode = value
                    .trim()
                    .strip_prefix("cm")
                    .and_then(|n| n.parse::<i64>().ok())
                    .and_then(CharsetMode::from_index);
            }
            other => trace!(key = other, "ignoring table attribute"),
        }
    }

    let longest = source
        .phrases
        .iter()
        .map(|row| row.code.chars().count())
        .max()
        .unwrap_or(0);
    props.max_key_length = max_key_length.unwrap_or(longest.max(1));
    props.complete_lengths = source
        .phrases
        .iter()
        .filter(|row| row.phrase.chars().count() > 1)
        .map(|row| row.code.chars().count())
        .collect();
    Ok(props)
}

/// Parse the phonetic source.
pub fn parse_pinyin(text: &str) -> Result<Vec<PinyinRow>> {
    let mut rows = Vec::new();
    for (idx, raw) in text.lines().enumerate() {
        let line = raw.trim_end_matches('\r');
        if line.starts_with('#') || BLANK.is_match(line) {
            continue;
        }
        let caps = PINYIN
            .captures(line)
            .with_context(|| format!("pinyin line {}: expected char spelling freq", idx + 1))?;
        let Some(ch) = caps[1].chars().next() else {
            continue;
        };
        rows.push(PinyinRow {
            ch,
            spelling: digits_to_tone_symbols(&caps[2]),
            freq: caps[3].parse().with_context(|| format!("pinyin line {}", idx + 1))?,
        });
    }
    Ok(rows)
}

/// `zhong1` -> `zhong!`
pub fn digits_to_tone_symbols(spelling: &str) -> String {
    spelling
        .chars()
        .map(|c| match c.to_digit(10) {
            Some(d @ 1..=5) => TONE_SYMBOLS[d as usize - 1],
            _ => c,
        })
        .collect()
}

/// Key parser covering the default key list plus anything else the table
/// uses.
fn parser_for(props: &ImeProperties, source: &TableSource) -> TabKeyParser {
    let mut keys = DEFAULT_TAB_KEYS.to_string();
    let used = props
        .valid_input_chars
        .chars()
        .chain(source.phrases.iter().flat_map(|row| row.code.chars()));
    for ch in used {
        if !keys.contains(ch) {
            keys.push(ch);
        }
    }
    TabKeyParser::new(&keys)
}

/// A lexicon built from a table source, with the parser that produced its
/// codes. Hand both to `TableEngine::new`.
#[derive(Debug)]
pub struct LoadedTable {
    pub lexicon: MemoryLexicon,
    pub parser: TabKeyParser,
}

/// Build a lexicon from table source text and, for phonetic tables, the
/// phonetic source.
pub fn load_table(source: &str, pinyin: Option<&str>) -> Result<LoadedTable> {
    let source = parse_source(source)?;
    let props = properties_from(&source)?;
    let parser = parser_for(&props, &source);
    let phonetic = props.phonetic_supported;
    let name = props.name.clone();
    let lexicon = MemoryLexicon::with_parser(props, parser.clone());

    for row in &source.phrases {
        lexicon
            .insert(&row.code, &row.phrase, row.freq)
            .with_context(|| format!("phrase {:?} ({})", row.phrase, row.code))?;
    }

    match (phonetic, pinyin) {
        (true, Some(text)) => {
            let rows = parse_pinyin(text)?;
            for row in &rows {
                lexicon.insert_phonetic(&row.spelling, row.ch, row.freq)?;
            }
            debug!(count = rows.len(), "loaded phonetic spellings");
        }
        (true, None) => warn!(%name, "table supports phonetic mode but no phonetic source was given"),
        (false, Some(_)) => debug!(%name, "table has no phonetic mode, ignoring phonetic source"),
        (false, None) => {}
    }

    debug!(
        %name,
        phrases = source.phrases.len(),
        goucima = source.goucima_lines,
        "table loaded"
    );
    Ok(LoadedTable { lexicon, parser })
}

/// Read and load a table from disk.
pub fn load_table_file<P: AsRef<Path>>(path: P, pinyin: Option<&Path>) -> Result<LoadedTable> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("read table {}", path.display()))?;
    let pinyin_text = match pinyin {
        Some(p) => Some(
            std::fs::read_to_string(p).with_context(|| format!("read pinyin {}", p.display()))?,
        ),
        None => None,
    };
    load_table(&text, pinyin_text.as_deref()).with_context(|| format!("load {}", path.display()))
}
