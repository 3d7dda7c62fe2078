use anyhow::{bail, Context, Result};
use clap::Parser;
use libtable::{engine_for, load_table_file, parse_key_line, Engine, TableConfig, ToggleRequest};
use libtable_core::SpanKind;
use std::env;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "libtable")]
#[command(about = "Drive a table input method from the terminal", long_about = None)]
struct Cli {
    /// Table source file (overrides `table` in the config file)
    table: Option<PathBuf>,

    /// Phonetic source for tables with PINYIN_MODE
    #[arg(long)]
    pinyin: Option<PathBuf>,

    /// TOML config: engine options, source paths and initial toggles
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Print the property list after every line
    #[arg(long)]
    properties: bool,
}

fn toggle_from_name(name: &str) -> Option<ToggleRequest> {
    Some(match name {
        "mode" => ToggleRequest::InputMode,
        "phonetic" => ToggleRequest::PhoneticMode,
        "onechar" => ToggleRequest::SingleChar,
        "autocommit" => ToggleRequest::AutoCommit,
        "letter" => ToggleRequest::FullWidthLetter,
        "punct" => ToggleRequest::FullWidthPunct,
        "charset" => ToggleRequest::CharsetMode,
        _ => return None,
    })
}

/// Render the preedit with `[...]` around pending text, `<...>` around the
/// candidate preview and `|` at the caret.
fn render_preedit(engine: &Engine) -> String {
    let comp = &engine.context().composition;
    let mut out = String::new();
    let mut pos = 0;
    let mut caret_drawn = false;
    for span in &comp.spans {
        let (open, close) = match span.kind {
            SpanKind::Confirmed => ("", ""),
            SpanKind::Pending => ("[", "]"),
            SpanKind::CandidatePreview => ("<", ">"),
        };
        out.push_str(open);
        for ch in span.text.chars() {
            if pos == comp.caret && !caret_drawn {
                out.push('|');
                caret_drawn = true;
            }
            out.push(ch);
            pos += 1;
        }
        out.push_str(close);
    }
    if !caret_drawn {
        out.push('|');
    }
    out
}

fn print_state(engine: &Engine, commit: &str, show_properties: bool) {
    let ctx = engine.context();
    if !commit.is_empty() {
        println!("commit:  {}", commit);
    }
    if ctx.preedit_visible {
        println!("preedit: {}", render_preedit(engine));
    }
    if ctx.auxiliary_visible {
        println!("aux:     {}", ctx.auxiliary_text);
    }
    if ctx.table_visible {
        let view = &ctx.table;
        for (i, label) in view.labels.iter().enumerate() {
            let key = view.select_keys.get(i).copied().unwrap_or(' ');
            let marker = if view.cursor_visible && i == view.cursor { '>' } else { ' ' };
            println!(" {}{}. {}", marker, key, label);
        }
        if view.pages > 1 {
            println!("  ({}/{})", view.page + 1, view.pages);
        }
    }
    if show_properties || ctx.properties_changed {
        let labels: Vec<String> = ctx
            .properties
            .iter()
            .map(|p| if p.active { format!("[{}]", p.label) } else { p.label.clone() })
            .collect();
        println!("status:  {}", labels.join(" "));
    }
}

/// Handle a `:command` line.
fn run_command(engine: &mut Engine, line: &str) -> Result<bool> {
    let mut words = line.split_whitespace();
    match words.next() {
        Some(":quit") | Some(":q") => return Ok(false),
        Some(":reset") => engine.reset()?,
        Some(":focus-out") => engine.focus_out()?,
        Some(":focus-in") => engine.focus_in()?,
        Some(":toggle") => {
            let name = words.next().unwrap_or("");
            match toggle_from_name(name) {
                Some(request) => engine.activate_property(request)?,
                None => bail!("unknown toggle {:?}", name),
            }
        }
        Some(other) => bail!("unknown command {}", other),
        None => {}
    }
    Ok(true)
}

/// Send a key line to the engine and collect everything committed, including
/// keys the engine let through to the application.
fn type_line(engine: &mut Engine, line: &str) -> Result<String> {
    let mut committed = String::new();
    for key in parse_key_line(line)? {
        let handled = engine.process_key(key)?;
        committed.push_str(&engine.take_commit());
        if !handled.is_handled() && !key.is_release() {
            if let Some(ch) = key.printable_char() {
                committed.push(ch);
            }
        }
    }
    Ok(committed)
}

fn run_repl(engine: &mut Engine, show_properties: bool) -> Result<()> {
    println!("Type keys, <Name> for named keys (<space>, <C-comma>, <Shift_L>).");
    println!("Commands: :toggle NAME, :reset, :focus-out, :focus-in, :quit");
    let stdin = io::stdin();
    loop {
        print!("> ");
        io::stdout().flush()?;
        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        let line = line.trim_end_matches(['\n', '\r']);

        let outcome = if line.starts_with(':') {
            run_command(engine, line).map(|keep| (keep, String::new()))
        } else {
            type_line(engine, line).map(|commit| (true, commit))
        };
        match outcome {
            Ok((true, commit)) => print_state(engine, &commit, show_properties),
            Ok((false, _)) => break,
            Err(err) => eprintln!("error: {:#}", err),
        }
    }
    Ok(())
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let mut config = match &cli.config {
        Some(path) => TableConfig::load_toml(path)?,
        None => TableConfig::default(),
    };
    if cli.table.is_some() {
        config.table = cli.table.clone();
    }
    if cli.pinyin.is_some() {
        config.pinyin = cli.pinyin.clone();
    }
    config.fill_locale(env::var("LC_CTYPE").ok(), env::var("LANG").ok());
    let table_path = config
        .table
        .clone()
        .context("no table given: pass a table file or set `table` in the config")?;

    let table = load_table_file(&table_path, config.pinyin.as_deref())?;
    info!(table = %table_path.display(), phrases = table.lexicon.len(), "loaded table");
    let store = Arc::new(config.store()?);
    let mut engine = engine_for(table, store, config.into_base())?;
    println!("{} ready", engine.section());
    run_repl(&mut engine, cli.properties)
}
