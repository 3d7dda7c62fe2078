//! Paged lookup table view over the current candidates.
//!
//! The cursor is a global index into the candidate list; the visible page is
//! the one containing the cursor. With `round` set (the default) paging and
//! cursor movement wrap around, so a list that fits on one page is left
//! unchanged by `page_down`/`page_up`.

use crate::candidate::Candidate;
use serde::{Deserialize, Serialize};
use std::ops::Range;

/// Lookup table layout requested from the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Orientation {
    #[default]
    Vertical,
    Horizontal,
    SystemDefault,
}

impl Orientation {
    /// Map the persisted integer (0 vertical, 1 horizontal, 2 system).
    pub fn from_index(index: i64) -> Self {
        match index {
            1 => Self::Horizontal,
            2 => Self::SystemDefault,
            _ => Self::Vertical,
        }
    }
}

#[derive(Debug, Clone)]
pub struct LookupTable {
    candidates: Vec<Candidate>,
    page_size: usize,
    cursor_pos: usize,
    orientation: Orientation,
    round: bool,
    cursor_visible: bool,
}

impl LookupTable {
    pub fn new(page_size: usize) -> Self {
        Self {
            candidates: Vec::new(),
            page_size: page_size.max(1),
            cursor_pos: 0,
            orientation: Orientation::default(),
            round: true,
            cursor_visible: true,
        }
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn set_page_size(&mut self, page_size: usize) {
        self.page_size = page_size.max(1);
    }

    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    pub fn set_orientation(&mut self, orientation: Orientation) {
        self.orientation = orientation;
    }

    pub fn set_round(&mut self, round: bool) {
        self.round = round;
    }

    pub fn is_cursor_visible(&self) -> bool {
        self.cursor_visible
    }

    pub fn set_cursor_visible(&mut self, visible: bool) {
        self.cursor_visible = visible;
    }

    pub fn append_candidate(&mut self, candidate: Candidate) {
        self.candidates.push(candidate);
    }

    /// Drop all candidates and move the cursor home.
    pub fn clear(&mut self) {
        self.candidates.clear();
        self.cursor_pos = 0;
    }

    pub fn candidates(&self) -> &[Candidate] {
        &self.candidates
    }

    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    /// Global cursor position.
    pub fn cursor_pos(&self) -> usize {
        self.cursor_pos
    }

    /// Cursor position relative to the current page.
    pub fn cursor_pos_in_current_page(&self) -> usize {
        self.cursor_pos % self.page_size
    }

    /// Index of the first candidate on the current page.
    pub fn current_page_start(&self) -> usize {
        (self.cursor_pos / self.page_size) * self.page_size
    }

    fn current_page_range(&self) -> Range<usize> {
        let start = self.current_page_start().min(self.candidates.len());
        let end = (start + self.page_size).min(self.candidates.len());
        start..end
    }

    pub fn current_page_candidates(&self) -> &[Candidate] {
        &self.candidates[self.current_page_range()]
    }

    pub fn num_pages(&self) -> usize {
        self.candidates.len().div_ceil(self.page_size)
    }

    /// Move the cursor to `index` on the current page.
    /// Returns false (cursor unchanged) when no candidate sits there.
    pub fn set_cursor_pos_in_current_page(&mut self, index: usize) -> bool {
        if index >= self.page_size {
            return false;
        }
        let pos = self.current_page_start() + index;
        if pos >= self.candidates.len() {
            return false;
        }
        self.cursor_pos = pos;
        true
    }

    pub fn cursor_down(&mut self) -> bool {
        if self.candidates.is_empty() {
            return false;
        }
        if self.cursor_pos + 1 >= self.candidates.len() {
            if !self.round {
                return false;
            }
            self.cursor_pos = 0;
        } else {
            self.cursor_pos += 1;
        }
        true
    }

    pub fn cursor_up(&mut self) -> bool {
        if self.candidates.is_empty() {
            return false;
        }
        if self.cursor_pos == 0 {
            if !self.round {
                return false;
            }
            self.cursor_pos = self.candidates.len() - 1;
        } else {
            self.cursor_pos -= 1;
        }
        true
    }

    pub fn page_down(&mut self) -> bool {
        if self.candidates.is_empty() {
            return false;
        }
        let page = self.cursor_pos / self.page_size;
        let offset = self.cursor_pos % self.page_size;
        let next = if (page + 1) * self.page_size >= self.candidates.len() {
            if !self.round {
                return false;
            }
            0
        } else {
            page + 1
        };
        self.move_to_page(next, offset);
        true
    }

    pub fn page_up(&mut self) -> bool {
        if self.candidates.is_empty() {
            return false;
        }
        let page = self.cursor_pos / self.page_size;
        let offset = self.cursor_pos % self.page_size;
        let prev = if page == 0 {
            if !self.round {
                return false;
            }
            self.num_pages() - 1
        } else {
            page - 1
        };
        self.move_to_page(prev, offset);
        true
    }

    fn move_to_page(&mut self, page: usize, offset: usize) {
        let pos = page * self.page_size + offset;
        self.cursor_pos = pos.min(self.candidates.len() - 1);
    }
}

impl Default for LookupTable {
    fn default() -> Self {
        Self::new(6)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(n: usize, page_size: usize) -> LookupTable {
        let mut t = LookupTable::new(page_size);
        for i in 0..n {
            t.append_candidate(Candidate::new(format!("候选{}", i), vec![]));
        }
        t
    }

    #[test]
    fn test_pagination() {
        let mut t = table(10, 3);
        assert_eq!(t.num_pages(), 4);
        assert_eq!(t.current_page_candidates()[0].phrase, "候选0");

        assert!(t.page_down());
        assert_eq!(t.cursor_pos(), 3);
        assert_eq!(t.current_page_candidates()[0].phrase, "候选3");

        t.page_down();
        t.page_down();
        assert_eq!(t.current_page_start(), 9);
        assert_eq!(t.current_page_candidates().len(), 1);

        // Wraps back to the first page
        assert!(t.page_down());
        assert_eq!(t.current_page_start(), 0);
    }

    #[test]
    fn test_cursor_clamped_on_short_last_page() {
        let mut t = table(10, 3);
        t.cursor_down();
        t.cursor_down();
        assert_eq!(t.cursor_pos_in_current_page(), 2);
        t.page_up();
        assert_eq!(t.current_page_start(), 9);
        assert_eq!(t.cursor_pos(), 9);
    }

    #[test]
    fn test_single_page_paging_is_idempotent() {
        let mut t = table(4, 6);
        t.cursor_down();
        let before = (t.cursor_pos(), t.current_page_start());
        t.page_down();
        assert_eq!((t.cursor_pos(), t.current_page_start()), before);
        t.page_up();
        assert_eq!((t.cursor_pos(), t.current_page_start()), before);
    }

    #[test]
    fn test_cursor_wraps() {
        let mut t = table(3, 6);
        assert!(t.cursor_up());
        assert_eq!(t.cursor_pos(), 2);
        assert!(t.cursor_down());
        assert_eq!(t.cursor_pos(), 0);

        t.set_round(false);
        assert!(!t.cursor_up());
    }

    #[test]
    fn test_set_cursor_in_page_rejects_out_of_range() {
        let mut t = table(8, 6);
        t.page_down();
        assert!(t.set_cursor_pos_in_current_page(1));
        assert_eq!(t.current_page_candidates()[t.cursor_pos_in_current_page()].phrase, "候选7");
        assert!(!t.set_cursor_pos_in_current_page(2));
        assert!(!t.set_cursor_pos_in_current_page(6));
        assert_eq!(t.cursor_pos(), 7);
    }

    #[test]
    fn test_empty_table() {
        let mut t = LookupTable::new(6);
        assert!(!t.page_down());
        assert!(!t.cursor_down());
        assert!(t.current_page_candidates().is_empty());
        assert_eq!(t.cursor_pos(), 0);
    }
}
