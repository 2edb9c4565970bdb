//! # TitleBar Component
//!
//! Top status bar: product name, current mode, interpreter status, and a
//! "↓ New" marker when output has landed below the scroll position.
//!
//! Purely presentational. All three props come from different places (mode
//! and status from core `App`, the unseen flag from the transcript view) and
//! the bar doesn't care which:
//!
//! ```text
//! MangoOS Terminal | shell | python loading...
//! MangoOS Terminal | python | Python 3.12.1 | ↓ New
//! ```

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};

use crate::tui::component::Component;

pub struct TitleBar {
    pub mode_label: &'static str,
    pub status: String,
    pub has_unseen_content: bool,
}

impl TitleBar {
    pub fn new(mode_label: &'static str, status: String, has_unseen_content: bool) -> Self {
        Self {
            mode_label,
            status,
            has_unseen_content,
        }
    }
}

impl Component for TitleBar {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let mut spans = vec![
            Span::styled(
                "MangoOS Terminal",
                Style::new().fg(Color::LightMagenta).add_modifier(Modifier::BOLD),
            ),
            Span::raw(format!(" | {} | {}", self.mode_label, self.status)),
        ];
        if self.has_unseen_content {
            spans.push(Span::styled(" | ↓ New", Style::new().fg(Color::Yellow)));
        }

        frame.render_widget(Line::from(spans), area);
    }
}
