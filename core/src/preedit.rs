//! Phrases already placed into the preedit, with a two-level cursor.
//!
//! The cursor addresses a segment and a character offset inside it. When the
//! cursor sits past the last segment its offset is always 0; every operation
//! below restores that invariant. Offsets count chars, not bytes.

/// Cursor into a [`PreeditStore`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PreeditCursor {
    pub segment: usize,
    pub offset: usize,
}

impl PreeditCursor {
    pub fn new(segment: usize, offset: usize) -> Self {
        Self { segment, offset }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PreeditStore {
    segments: Vec<String>,
    cursor: PreeditCursor,
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}

/// Split `s` at a char offset.
fn split_chars(s: &str, at: usize) -> (String, String) {
    let idx = s.char_indices().nth(at).map(|(i, _)| i).unwrap_or(s.len());
    (s[..idx].to_string(), s[idx..].to_string())
}

fn remove_char_at(s: &mut String, at: usize) {
    if let Some((idx, _)) = s.char_indices().nth(at) {
        s.remove(idx);
    }
}

impl PreeditStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    pub fn cursor(&self) -> PreeditCursor {
        self.cursor
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Concatenated text of all segments.
    pub fn text(&self) -> String {
        self.segments.concat()
    }

    /// Number of chars before the cursor.
    pub fn chars_before_cursor(&self) -> usize {
        self.segments[..self.cursor.segment.min(self.segments.len())]
            .iter()
            .map(|s| char_len(s))
            .sum::<usize>()
            + self.cursor.offset
    }

    pub fn clear(&mut self) {
        self.segments.clear();
        self.cursor = PreeditCursor::default();
    }

    /// Cut the segment under the cursor at the cursor offset, leaving the
    /// cursor at the start of the right half. Nothing happens when the cursor
    /// is already on a segment boundary.
    pub fn split(&mut self) {
        let PreeditCursor { segment, offset } = self.cursor;
        if offset == 0 {
            return;
        }
        let Some(current) = self.segments.get(segment) else {
            self.cursor.offset = 0;
            return;
        };
        if offset >= char_len(current) {
            self.cursor = PreeditCursor::new(segment + 1, 0);
            return;
        }
        let (head, tail) = split_chars(current, offset);
        self.segments[segment] = head;
        self.segments.insert(segment + 1, tail);
        self.cursor = PreeditCursor::new(segment + 1, 0);
    }

    /// Insert a phrase as a new segment at the cursor and step over it.
    pub fn insert_at_cursor<T: Into<String>>(&mut self, phrase: T) {
        self.split();
        let at = self.cursor.segment.min(self.segments.len());
        self.segments.insert(at, phrase.into());
        self.cursor = PreeditCursor::new(at + 1, 0);
    }

    /// Remove the segment right before the cursor, stepping back onto it.
    /// Returns the removed text.
    pub fn remove_segment_before(&mut self) -> Option<String> {
        self.split();
        if self.cursor.segment == 0 {
            return None;
        }
        self.cursor.segment -= 1;
        Some(self.segments.remove(self.cursor.segment))
    }

    /// Remove the segment right after the cursor.
    pub fn remove_segment_after(&mut self) -> Option<String> {
        self.split();
        if self.cursor.segment >= self.segments.len() {
            return None;
        }
        Some(self.segments.remove(self.cursor.segment))
    }

    /// Backspace within the preedit.
    pub fn remove_char_before(&mut self) {
        let PreeditCursor { segment, offset } = self.cursor;
        if offset > 0 {
            if let Some(current) = self.segments.get_mut(segment) {
                remove_char_at(current, offset - 1);
                self.cursor.offset -= 1;
            }
            return;
        }
        if segment == 0 {
            return;
        }
        let prev = &mut self.segments[segment - 1];
        if char_len(prev) <= 1 {
            self.remove_segment_before();
        } else {
            prev.pop();
        }
    }

    /// Forward delete within the preedit.
    pub fn remove_char_after(&mut self) {
        let PreeditCursor { segment, offset } = self.cursor;
        let Some(current) = self.segments.get_mut(segment) else {
            return;
        };
        let len = char_len(current);
        if offset == 0 {
            if len <= 1 {
                self.remove_segment_after();
            } else {
                remove_char_at(current, 0);
            }
        } else if offset + 1 >= len {
            self.split();
            self.remove_segment_after();
        } else {
            remove_char_at(current, offset);
        }
    }

    /// Move one char left; from the very start, wrap to the end.
    pub fn move_left(&mut self) {
        let PreeditCursor { segment, offset } = self.cursor;
        if offset > 0 {
            self.cursor.offset -= 1;
        } else if segment > 0 {
            let prev_len = self.segments.get(segment - 1).map_or(1, |s| char_len(s));
            self.cursor = PreeditCursor::new(segment - 1, prev_len.saturating_sub(1));
        } else {
            self.cursor = PreeditCursor::new(self.segments.len(), 0);
        }
    }

    /// Move one char right; from the end, wrap to the start.
    pub fn move_right(&mut self) {
        if self.cursor.offset == 0 && self.cursor.segment >= self.segments.len() {
            self.cursor = PreeditCursor::new(0, 0);
        } else {
            self.cursor.offset += 1;
        }
        self.normalize();
    }

    /// Jump to the start of the segment, or to the previous segment; from
    /// the very start, wrap to the last segment.
    pub fn move_segment_left(&mut self) {
        if self.cursor.offset > 0 {
            self.cursor.offset = 0;
        } else if self.cursor.segment == 0 {
            self.cursor.segment = self.segments.len().saturating_sub(1);
        } else {
            self.cursor.segment -= 1;
        }
    }

    /// Jump to the next segment boundary; from the end, wrap to just after
    /// the first segment.
    pub fn move_segment_right(&mut self) {
        if self.cursor.offset == 0 && self.cursor.segment >= self.segments.len() {
            self.cursor.segment = self.segments.len().min(1);
        } else {
            self.cursor = PreeditCursor::new(self.cursor.segment + 1, 0);
        }
        self.normalize();
    }

    fn normalize(&mut self) {
        if self.cursor.segment >= self.segments.len() {
            self.cursor = PreeditCursor::new(self.segments.len(), 0);
            return;
        }
        if self.cursor.offset >= char_len(&self.segments[self.cursor.segment]) {
            self.cursor = PreeditCursor::new(self.cursor.segment + 1, 0);
        }
    }
}
