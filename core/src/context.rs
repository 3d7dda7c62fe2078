//! IME context for host communication.
//!
//! The `ImeContext` struct is a simple data container with public fields the
//! host reads after each `process_key()` call to update its UI. The engine
//! rewrites every field when it refreshes; hosts only consume `commit_text`.

use crate::composition::Composition;
use crate::lookup_table::Orientation;
use crate::mode::Property;

/// Lookup table as shown to the host: the visible page only.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TableView {
    /// Labels of the current page (phrase plus code remainder)
    pub labels: Vec<String>,
    /// Selection key shown next to each label
    pub select_keys: Vec<char>,
    /// Highlighted entry within the page
    pub cursor: usize,
    pub cursor_visible: bool,
    pub orientation: Orientation,
    /// 0-based page and page count, for "1/3" style indicators
    pub page: usize,
    pub pages: usize,
}

/// Everything the host needs to render the IME after a key.
///
/// # Fields
///
/// - `commit_text`: Text to commit to the application (consume and clear)
/// - `composition`: Preedit spans and caret
/// - `auxiliary_text`: Typed code or code hints
/// - `table`: Visible lookup table page
/// - `properties`: Toggle states for the host's status area
#[derive(Debug, Clone, Default)]
pub struct ImeContext {
    /// Text to commit to the application
    pub commit_text: String,

    pub composition: Composition,
    pub preedit_visible: bool,

    pub auxiliary_text: String,
    pub auxiliary_visible: bool,

    pub table: TableView,
    pub table_visible: bool,

    pub properties: Vec<Property>,
    /// Set when `properties` changed since the host last looked
    pub properties_changed: bool,
}

impl ImeContext {
    /// Create a new empty IME context.
    pub fn new() -> Self {
        Self::default()
    }

    /// Take the commit text, leaving an empty string.
    pub fn take_commit(&mut self) -> String {
        std::mem::take(&mut self.commit_text)
    }

    /// Plain preedit text.
    pub fn preedit_text(&self) -> String {
        self.composition.text()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_take_commit() {
        let mut ctx = ImeContext::new();
        assert_eq!(ctx.take_commit(), "");
        ctx.commit_text.push_str("中文");
        assert_eq!(ctx.take_commit(), "中文");
        assert!(ctx.commit_text.is_empty());
    }
}
