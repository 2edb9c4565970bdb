use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span, Text};
use ratatui::widgets::{Paragraph, Widget, Wrap};

use crate::core::state::Mode;
use crate::core::transcript::{Entry, LineStyle, OutputLine, RetiredPrompt};

pub const HEADER_STYLE: Style = Style::new().fg(Color::LightGreen);
pub const MARKER_STYLE: Style = Style::new().fg(Color::LightBlue);
pub const INPUT_STYLE: Style = Style::new().fg(Color::White);

/// Text style for each kind of output line.
pub fn line_style(style: LineStyle) -> Style {
    match style {
        LineStyle::Normal => Style::new().fg(Color::White),
        LineStyle::PythonEcho => Style::new().fg(Color::Yellow),
        LineStyle::Error => Style::new().fg(Color::LightRed),
        LineStyle::Link => Style::new()
            .fg(Color::Rgb(0x00, 0xff, 0x00))
            .add_modifier(Modifier::UNDERLINED),
    }
}

/// The two prompt rows: `┌──(mang0㉿mang0)-[~]` then `└─$ <input>`.
pub fn prompt_lines<'a>(mode: Mode, input: &'a str) -> Vec<Line<'a>> {
    vec![
        Line::from(Span::styled(mode.header(), HEADER_STYLE)),
        Line::from(vec![
            Span::styled(mode.marker(), MARKER_STYLE),
            Span::styled(input, INPUT_STYLE),
        ]),
    ]
}

/// One transcript entry: a frozen prompt or an output line.
///
/// Transient, like the other widgets: built each frame for the entries that
/// are on screen. Long text wraps at the window width.
#[derive(Clone, Copy)]
pub struct EntryView<'a> {
    pub entry: &'a Entry,
    /// Leading rows cut off by the top of the scrollback window.
    pub skip_rows: u16,
}

impl<'a> EntryView<'a> {
    pub fn new(entry: &'a Entry) -> Self {
        Self {
            entry,
            skip_rows: 0,
        }
    }

    pub fn skip_rows(mut self, rows: u16) -> Self {
        self.skip_rows = rows;
        self
    }

    fn paragraph(&self) -> Paragraph<'a> {
        let text = match self.entry {
            Entry::Prompt(RetiredPrompt { mode, input }) => Text::from(prompt_lines(*mode, input)),
            Entry::Line(OutputLine { text, style }) => {
                Text::styled(text.as_str(), line_style(*style))
            }
        };
        Paragraph::new(text).wrap(Wrap { trim: false })
    }

    /// Rows this entry occupies at `width`. Empty lines still take a row.
    pub fn calculate_height(entry: &Entry, width: u16) -> u16 {
        if width == 0 {
            return 1;
        }
        let rows = EntryView::new(entry).paragraph().line_count(width);
        u16::try_from(rows).unwrap_or(u16::MAX).max(1)
    }
}

impl<'a> Widget for EntryView<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        self.paragraph()
            .scroll((self.skip_rows, 0))
            .render(area, buf);
    }
}
