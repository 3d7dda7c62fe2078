//! Preedit composition with typed spans for display.
//!
//! The editor renders its state into a `Composition`: a run of spans tagged
//! by kind plus a caret position. Host adapters turn the kinds into their own
//! colour or underline attributes; nothing here knows about markup.

use std::ops::Range;

/// Role of a span in the preedit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SpanKind {
    /// Phrases already placed by explicit selection
    Confirmed,
    /// Phrases placed by auto-commit that can still be backspaced into
    Pending,
    /// Highlighted candidate, or the raw input when there is none
    CandidatePreview,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreeditSpan {
    pub kind: SpanKind,
    pub text: String,
}

impl PreeditSpan {
    pub fn new<T: Into<String>>(kind: SpanKind, text: T) -> Self {
        Self {
            kind,
            text: text.into(),
        }
    }
}

/// Preedit composition for display.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Composition {
    /// Spans in display order; empty spans are never stored
    pub spans: Vec<PreeditSpan>,
    /// Caret position in chars
    pub caret: usize,
}

impl Composition {
    pub fn new() -> Self {
        Self::default()
    }

    /// A single confirmed span with the caret at `caret`.
    pub fn plain<T: Into<String>>(text: T, caret: usize) -> Self {
        let mut comp = Self::new();
        comp.push(SpanKind::Confirmed, text);
        comp.caret = caret;
        comp
    }

    /// Append a span, skipping empty text.
    pub fn push<T: Into<String>>(&mut self, kind: SpanKind, text: T) {
        let text = text.into();
        if !text.is_empty() {
            self.spans.push(PreeditSpan::new(kind, text));
        }
    }

    pub fn is_empty(&self) -> bool {
        self.spans.is_empty()
    }

    /// The full preedit text.
    pub fn text(&self) -> String {
        self.spans.iter().map(|s| s.text.as_str()).collect()
    }

    /// Char ranges of each span, for attribute lists.
    pub fn highlights(&self) -> Vec<(SpanKind, Range<usize>)> {
        let mut start = 0;
        self.spans
            .iter()
            .map(|span| {
                let end = start + span.text.chars().count();
                let range = start..end;
                start = end;
                (span.kind, range)
            })
            .collect()
    }

    /// Text of the candidate preview span, if any.
    pub fn preview(&self) -> Option<&str> {
        self.spans
            .iter()
            .find(|s| s.kind == SpanKind::CandidatePreview)
            .map(|s| s.text.as_str())
    }
}
