//! Cursor position and horizontal scrolling for the PromptBox.
//!
//! The live prompt is a single row, so instead of wrapping, the visible part
//! of the buffer slides sideways to keep the cursor on screen. All offsets
//! are byte offsets on char boundaries; widths are terminal columns.

use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Byte offset of the character boundary before `pos` in `text`.
pub(super) fn prev_char_boundary(text: &str, pos: usize) -> usize {
    text[..pos]
        .char_indices()
        .next_back()
        .map(|(i, _)| i)
        .unwrap_or(0)
}

/// Byte offset of the character boundary after `pos` in `text`.
pub(super) fn next_char_boundary(text: &str, pos: usize) -> usize {
    text[pos..]
        .char_indices()
        .nth(1)
        .map(|(i, _)| pos + i)
        .unwrap_or(text.len())
}

/// Cursor and view window, separated from the text buffer.
pub(super) struct CursorState {
    /// Cursor position as byte offset in buffer (0..=buffer.len())
    pub pos: usize,
    /// First visible byte of the buffer
    pub view_start: usize,
}

impl CursorState {
    pub fn new() -> Self {
        Self {
            pos: 0,
            view_start: 0,
        }
    }

    pub fn reset(&mut self) {
        self.pos = 0;
        self.view_start = 0;
    }

    /// Slide the window so the cursor fits in `columns` columns, leaving a
    /// cell for the cursor itself.
    pub fn update_view(&mut self, buffer: &str, columns: u16) {
        if self.pos < self.view_start {
            self.view_start = self.pos;
        }
        let columns = columns.max(1) as usize;
        while self.view_start < self.pos && buffer[self.view_start..self.pos].width() >= columns {
            self.view_start = next_char_boundary(buffer, self.view_start);
        }
    }

    /// Cursor column relative to the window's left edge.
    pub fn column(&self, buffer: &str) -> u16 {
        buffer[self.view_start..self.pos].width() as u16
    }

    /// The part of `buffer` that fits in `columns` columns from the window start.
    pub fn visible<'b>(&self, buffer: &'b str, columns: u16) -> &'b str {
        let tail = &buffer[self.view_start..];
        let mut used = 0usize;
        let mut end = tail.len();
        for (i, c) in tail.char_indices() {
            let w = c.width().unwrap_or(0);
            if used + w > columns as usize {
                end = i;
                break;
            }
            used += w;
        }
        &tail[..end]
    }
}
