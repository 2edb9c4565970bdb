//! # PromptBox Component
//!
//! The live input line at the bottom of the transcript.
//!
//! ## Responsibilities
//!
//! - Capture text input for the open affordance
//! - Handle editing (backspace, delete, cursor movement, paste)
//! - Handle submission (Enter)
//! - Render the two-row prompt with the cursor kept on screen
//!
//! ## State Management
//!
//! The buffer is internal state; the mode is a prop. Cursor position and the
//! horizontal view window are encapsulated in `CursorState`.

mod cursor;

use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::text::Text;
use ratatui::widgets::{Paragraph, Widget};
use unicode_width::UnicodeWidthStr;

use crate::core::state::Mode;
use crate::tui::component::EventHandler;
use crate::tui::components::entry::prompt_lines;
use crate::tui::event::TuiEvent;

use cursor::{CursorState, next_char_boundary, prev_char_boundary};

/// Header row plus input row.
pub const PROMPT_HEIGHT: u16 = 2;

/// High-level events emitted by the PromptBox
#[derive(Debug, Clone, PartialEq)]
pub enum PromptEvent {
    /// User committed the line (Enter pressed). May be empty.
    Submit(String),
    ContentChanged,
}

pub struct PromptBox {
    /// Text buffer (Internal State)
    pub buffer: String,
    cursor: CursorState,
}

impl Default for PromptBox {
    fn default() -> Self {
        Self::new()
    }
}

impl PromptBox {
    pub fn new() -> Self {
        Self {
            buffer: String::new(),
            cursor: CursorState::new(),
        }
    }

    fn insert(&mut self, text: &str) {
        self.buffer.insert_str(self.cursor.pos, text);
        self.cursor.pos += text.len();
    }

    /// Transient widget for the current mode, sized to `width` columns.
    pub fn line(&mut self, mode: Mode, width: u16) -> PromptLine<'_> {
        let columns = width.saturating_sub(mode.marker().width() as u16);
        self.cursor.update_view(&self.buffer, columns);
        PromptLine {
            mode,
            visible: self.cursor.visible(&self.buffer, columns),
            cursor_column: mode.marker().width() as u16 + self.cursor.column(&self.buffer),
        }
    }
}

impl EventHandler for PromptBox {
    type Event = PromptEvent;

    fn handle_event(&mut self, event: &TuiEvent) -> Option<Self::Event> {
        match event {
            TuiEvent::InputChar(c) => {
                let mut utf8 = [0u8; 4];
                self.insert(c.encode_utf8(&mut utf8));
                Some(PromptEvent::ContentChanged)
            }
            TuiEvent::Paste(text) => {
                // One line only
                let flattened: String = text
                    .chars()
                    .filter(|c| *c != '\r')
                    .map(|c| if c == '\n' { ' ' } else { c })
                    .collect();
                self.insert(&flattened);
                Some(PromptEvent::ContentChanged)
            }
            TuiEvent::Backspace => {
                if self.cursor.pos > 0 {
                    let prev = prev_char_boundary(&self.buffer, self.cursor.pos);
                    self.buffer.drain(prev..self.cursor.pos);
                    self.cursor.pos = prev;
                    Some(PromptEvent::ContentChanged)
                } else {
                    None
                }
            }
            TuiEvent::Delete => {
                if self.cursor.pos < self.buffer.len() {
                    let next = next_char_boundary(&self.buffer, self.cursor.pos);
                    self.buffer.drain(self.cursor.pos..next);
                    Some(PromptEvent::ContentChanged)
                } else {
                    None
                }
            }
            TuiEvent::CursorLeft => (self.cursor.pos > 0).then(|| {
                self.cursor.pos = prev_char_boundary(&self.buffer, self.cursor.pos);
                PromptEvent::ContentChanged
            }),
            TuiEvent::CursorRight => (self.cursor.pos < self.buffer.len()).then(|| {
                self.cursor.pos = next_char_boundary(&self.buffer, self.cursor.pos);
                PromptEvent::ContentChanged
            }),
            TuiEvent::CursorHome => (self.cursor.pos != 0).then(|| {
                self.cursor.pos = 0;
                PromptEvent::ContentChanged
            }),
            TuiEvent::CursorEnd => (self.cursor.pos != self.buffer.len()).then(|| {
                self.cursor.pos = self.buffer.len();
                PromptEvent::ContentChanged
            }),
            TuiEvent::Submit => {
                let text = std::mem::take(&mut self.buffer);
                self.cursor.reset();
                Some(PromptEvent::Submit(text))
            }
            _ => None,
        }
    }
}

/// The live prompt as drawn: header row, then marker and the visible slice
/// of the buffer.
pub struct PromptLine<'a> {
    pub mode: Mode,
    pub visible: &'a str,
    /// Cursor column within the input row, marker included.
    pub cursor_column: u16,
}

impl<'a> Widget for PromptLine<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        Paragraph::new(Text::from(prompt_lines(self.mode, self.visible))).render(area, buf);
    }
}
