//! libtable crate root
//!
//! This crate loads plain-text table definitions (Wubi, Cangjie, Zhengma and
//! the like) into the in-memory lexicon of `libtable-core`, and provides
//! symbolic key names for scripted sessions.
//!
//! Public API exported here:
//! - `load_table`, `load_table_file` and `LoadedTable` from `table`
//! - `TableConfig` from `config`
//! - `parse_key_line` from `keys`

pub mod config;
pub mod keys;
pub mod table;

// Re-export the engine types a front end needs from core.
pub use libtable_core::{
    Composition, Config, ImeContext, KeyEvent, KeyResult, MemoryConfig, MemoryLexicon,
    TabKeyParser, TableEngine, ToggleRequest,
};

pub use config::TableConfig;
pub use keys::parse_key_line;
pub use table::{load_table, load_table_file, LoadedTable};

/// Engine over a loaded table.
pub type Engine = TableEngine<MemoryLexicon, TabKeyParser>;

/// Create an engine for a loaded table with a toggle store.
pub fn engine_for(
    table: LoadedTable,
    store: std::sync::Arc<dyn libtable_core::ConfigStore>,
    config: Config,
) -> anyhow::Result<Engine> {
    TableEngine::new(std::sync::Arc::new(table.lexicon), table.parser, store, config)
}
