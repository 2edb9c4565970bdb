//! # TranscriptView Component
//!
//! Scrollable view of the terminal's output log, with the live prompt
//! attached at the end.
//!
//! ## Responsibilities
//!
//! - Display retired prompts and output lines in order
//! - Place the live prompt (and the terminal cursor) after the last entry
//! - Stick to the bottom on new content unless the user scrolled up
//! - Cache per-entry heights
//!
//! ## Architecture
//!
//! `TranscriptView` is a transient component (created each frame) that wraps
//! `&'a mut TranscriptViewState` (persistent state) and the `Transcript`
//! (props).
//!
//! Entries never change once appended, so cached heights stay valid until the
//! width changes or `clear` bumps the transcript generation.
//!
//! Row totals are kept as `u32`, but the scroll canvas is `u16` rows tall, so
//! only the newest `SCROLLBACK_ROWS` rows go on it. The oldest entry in that
//! window may be cut off at the top.

use ratatui::Frame;
use ratatui::layout::{Position, Rect, Size};
use tui_scrollview::{ScrollView, ScrollViewState, ScrollbarVisibility};

use crate::core::transcript::Transcript;
use crate::tui::component::{Component, EventHandler};
use crate::tui::components::entry::EntryView;
use crate::tui::components::prompt_box::{PROMPT_HEIGHT, PromptLine};
use crate::tui::event::TuiEvent;

/// Rows of history reachable by scrolling, live prompt included.
pub const SCROLLBACK_ROWS: u16 = 10_000;

/// Layout and scroll state for the transcript.
/// Must be persisted in the parent TuiState.
pub struct TranscriptViewState {
    pub scroll_state: ScrollViewState,
    pub layout: LayoutCache,
    /// When true, auto-scroll to bottom on new content
    pub stick_to_bottom: bool,
    /// Last known viewport height (for scroll clamping between frames)
    pub viewport_height: u16,
    /// Last known canvas height, live prompt included
    pub canvas_height: u16,
    /// Content below the viewport the user hasn't scrolled to
    pub has_unseen_content: bool,
}

impl Default for TranscriptViewState {
    fn default() -> Self {
        Self::new()
    }
}

impl TranscriptViewState {
    pub fn new() -> Self {
        Self {
            scroll_state: ScrollViewState::default(),
            layout: LayoutCache::new(),
            stick_to_bottom: true,
            viewport_height: 0,
            canvas_height: 0,
            has_unseen_content: false,
        }
    }

    fn max_offset(&self) -> u16 {
        self.canvas_height.saturating_sub(self.viewport_height)
    }

    /// Jump to the end and follow new content again.
    pub fn pin_to_bottom(&mut self) {
        self.stick_to_bottom = true;
    }

    /// Clamp scroll offset so it never exceeds the content bounds.
    pub fn clamp_scroll(&mut self) {
        let max_y = self.max_offset();
        let current = self.scroll_state.offset();
        if current.y > max_y {
            self.scroll_state.set_offset(Position { x: 0, y: max_y });
        }
    }

    /// Re-engage auto-scroll if the user has reached the bottom.
    pub fn repin_if_at_bottom(&mut self) {
        let max_y = self.max_offset();
        if self.scroll_state.offset().y >= max_y {
            self.stick_to_bottom = true;
            self.scroll_state.set_offset(Position { x: 0, y: max_y });
        }
    }
}

/// Scrollable transcript component.
/// Created fresh each frame with references to state and data.
pub struct TranscriptView<'a> {
    pub state: &'a mut TranscriptViewState,
    pub transcript: &'a Transcript,
    /// The open affordance's prompt, if any.
    pub live_prompt: Option<PromptLine<'a>>,
}

impl<'a> TranscriptView<'a> {
    pub fn new(
        state: &'a mut TranscriptViewState,
        transcript: &'a Transcript,
        live_prompt: Option<PromptLine<'a>>,
    ) -> Self {
        Self {
            state,
            transcript,
            live_prompt,
        }
    }
}

impl<'a> Component for TranscriptView<'a> {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let content_width = area.width.saturating_sub(1); // -1 for scrollbar
        let entries = self.transcript.entries();

        // 1. Update layout cache
        let layout = &mut self.state.layout;
        let reusable =
            layout.reusable_count(entries.len(), content_width, self.transcript.generation());
        layout.heights.truncate(reusable.min(layout.heights.len()));
        for entry in entries.iter().skip(layout.heights.len()) {
            layout.heights.push(EntryView::calculate_height(entry, content_width));
        }
        layout.rebuild_prefix_heights();
        layout.update_metadata(entries.len(), content_width, self.transcript.generation());

        let prompt_height = if self.live_prompt.is_some() {
            PROMPT_HEIGHT
        } else {
            0
        };
        // First row (of the whole history) that makes it onto the canvas
        let window_top = layout
            .total_height()
            .saturating_sub(u32::from(SCROLLBACK_ROWS - prompt_height));
        let content_height = to_row(layout.total_height() - window_top);
        self.state.canvas_height = content_height.saturating_add(prompt_height);
        self.state.viewport_height = area.height;

        // 2. Settle the scroll offset before drawing
        if self.state.stick_to_bottom {
            let max_y = self.state.max_offset();
            self.state.scroll_state.set_offset(Position { x: 0, y: max_y });
        } else {
            self.state.clamp_scroll();
        }
        let scroll_offset = self.state.scroll_state.offset().y;
        let visible_range = self
            .state
            .layout
            .visible_range(window_top, scroll_offset, area.height);

        // 3. Render visible entries into a ScrollView
        let mut scroll_view = ScrollView::new(Size::new(content_width, self.state.canvas_height))
            .vertical_scrollbar_visibility(ScrollbarVisibility::Automatic)
            .horizontal_scrollbar_visibility(ScrollbarVisibility::Never);

        for i in visible_range {
            let layout = &self.state.layout;
            let entry_top = layout.rows_before(i);
            let skip = to_row(window_top.saturating_sub(entry_top));
            let y = to_row(entry_top.saturating_sub(window_top));
            let height = layout.heights[i].saturating_sub(skip);
            let rect = Rect::new(0, y, content_width, height);
            scroll_view.render_widget(EntryView::new(&entries[i]).skip_rows(skip), rect);
        }

        let mut cursor = None;
        if let Some(prompt) = self.live_prompt.take() {
            let rect = Rect::new(0, content_height, content_width, PROMPT_HEIGHT);
            let input_row = content_height.saturating_add(1);
            if input_row >= scroll_offset && input_row < scroll_offset.saturating_add(area.height) {
                let x = area.x + prompt.cursor_column.min(content_width.saturating_sub(1));
                cursor = Some(Position {
                    x,
                    y: area.y + (input_row - scroll_offset),
                });
            }
            scroll_view.render_widget(prompt, rect);
        }

        frame.render_stateful_widget(scroll_view, area, &mut self.state.scroll_state);

        if let Some(position) = cursor {
            frame.set_cursor_position(position);
        }

        self.state.has_unseen_content = scroll_offset < self.state.max_offset();
    }
}

/// Implemented on the state rather than the view: the view is rebuilt every
/// frame, the scroll position is not.
impl EventHandler for TranscriptViewState {
    type Event = ();

    fn handle_event(&mut self, event: &TuiEvent) -> Option<Self::Event> {
        match event {
            TuiEvent::ScrollUp => {
                self.scroll_state.scroll_up();
                self.stick_to_bottom = false;
            }
            TuiEvent::ScrollDown => {
                self.scroll_state.scroll_down();
                self.repin_if_at_bottom();
            }
            TuiEvent::ScrollPageUp => {
                self.scroll_state.scroll_page_up();
                self.stick_to_bottom = false;
            }
            TuiEvent::ScrollPageDown => {
                self.scroll_state.scroll_page_down();
                self.repin_if_at_bottom();
            }
            _ => {}
        }
        None
    }
}

/// Canvas row for a history row count already bounded by the window.
fn to_row(rows: u32) -> u16 {
    u16::try_from(rows).unwrap_or(u16::MAX)
}

/// Cached layout measurements
pub struct LayoutCache {
    pub heights: Vec<u16>,
    /// Running row totals; `prefix_heights[i]` is where entry `i` ends.
    pub prefix_heights: Vec<u32>,
    entry_count: usize,
    content_width: u16,
    generation: u64,
}

impl Default for LayoutCache {
    fn default() -> Self {
        Self::new()
    }
}

impl LayoutCache {
    pub fn new() -> Self {
        Self {
            heights: Vec::new(),
            prefix_heights: Vec::new(),
            entry_count: 0,
            content_width: 0,
            generation: 0,
        }
    }

    /// How many cached heights still hold for the current transcript.
    pub fn reusable_count(&self, entry_count: usize, content_width: u16, generation: u64) -> usize {
        if self.content_width != content_width
            || self.generation != generation
            || self.heights.is_empty()
        {
            return 0;
        }

        // Fewer entries than cached means the log was replaced
        if entry_count < self.entry_count {
            return 0;
        }

        self.entry_count
    }

    pub fn update_metadata(&mut self, entry_count: usize, content_width: u16, generation: u64) {
        self.entry_count = entry_count;
        self.content_width = content_width;
        self.generation = generation;
    }

    pub fn rebuild_prefix_heights(&mut self) {
        self.prefix_heights = self
            .heights
            .iter()
            .scan(0u32, |acc, &h| {
                *acc = acc.saturating_add(u32::from(h));
                Some(*acc)
            })
            .collect();
    }

    pub fn total_height(&self) -> u32 {
        self.prefix_heights.last().copied().unwrap_or(0)
    }

    /// History row where entry `index` starts.
    pub fn rows_before(&self, index: usize) -> u32 {
        match index {
            0 => 0,
            i => self.prefix_heights[i - 1],
        }
    }

    /// Entries overlapping the viewport, plus half a screen either side.
    /// `scroll_offset` counts canvas rows from `window_top`.
    pub fn visible_range(
        &self,
        window_top: u32,
        scroll_offset: u16,
        viewport_height: u16,
    ) -> std::ops::Range<usize> {
        let buffer = viewport_height / 2;
        let buffered_start = window_top + u32::from(scroll_offset.saturating_sub(buffer));
        let buffered_end = window_top
            + u32::from(scroll_offset)
            + u32::from(viewport_height)
            + u32::from(buffer);

        let start = self
            .prefix_heights
            .partition_point(|&end| end <= buffered_start);
        let end = self
            .prefix_heights
            .partition_point(|&end| end < buffered_end)
            .saturating_add(1)
            .min(self.prefix_heights.len());

        start..end
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::state::Mode;
    use crate::core::transcript::LineStyle;
    use crate::tui::components::prompt_box::PromptBox;
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;

    fn screen_text(terminal: &Terminal<TestBackend>) -> String {
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect()
    }

    #[test]
    fn test_layout_cache_reusable() {
        let mut cache = LayoutCache::new();
        cache.heights = vec![1; 5];
        cache.update_metadata(5, 80, 0);

        // Same everything: all reusable
        assert_eq!(cache.reusable_count(5, 80, 0), 5);
        // Appended entries: the old five still hold
        assert_eq!(cache.reusable_count(7, 80, 0), 5);
        // Width changed
        assert_eq!(cache.reusable_count(5, 40, 0), 0);
        // Cleared and refilled past the old length
        assert_eq!(cache.reusable_count(9, 80, 1), 0);
        // Shrunk
        assert_eq!(cache.reusable_count(3, 80, 0), 0);
    }

    #[test]
    fn test_visible_range() {
        let mut cache = LayoutCache::new();
        cache.heights = vec![2; 50];
        cache.rebuild_prefix_heights();
        assert_eq!(cache.total_height(), 100);

        let range = cache.visible_range(0, 40, 10);
        assert!(range.contains(&20));
        assert!(!range.contains(&0));
        assert!(!range.contains(&49));
    }

    #[test]
    fn test_sticks_to_bottom_with_live_prompt() {
        let mut transcript = Transcript::new();
        for i in 0..30 {
            transcript.append(format!("line {i}"), LineStyle::Normal);
        }
        let mut state = TranscriptViewState::new();
        let mut prompt = PromptBox::new();

        let backend = TestBackend::new(40, 10);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal
            .draw(|f| {
                let line = prompt.line(Mode::Shell, f.area().width - 1);
                TranscriptView::new(&mut state, &transcript, Some(line)).render(f, f.area());
            })
            .unwrap();

        let text = screen_text(&terminal);
        assert!(text.contains("line 29"));
        assert!(text.contains("└─$ "));
        assert!(!text.contains("line 0 "));
        assert!(!state.has_unseen_content);
        assert_eq!(state.canvas_height, 32);
    }

    #[test]
    fn test_scrolling_up_unpins_and_flags_unseen() {
        let mut transcript = Transcript::new();
        for i in 0..30 {
            transcript.append(format!("line {i}"), LineStyle::Normal);
        }
        let mut state = TranscriptViewState::new();

        let backend = TestBackend::new(40, 10);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal
            .draw(|f| TranscriptView::new(&mut state, &transcript, None).render(f, f.area()))
            .unwrap();

        state.handle_event(&TuiEvent::ScrollPageUp);
        assert!(!state.stick_to_bottom);

        terminal
            .draw(|f| TranscriptView::new(&mut state, &transcript, None).render(f, f.area()))
            .unwrap();
        assert!(state.has_unseen_content);

        state.pin_to_bottom();
        terminal
            .draw(|f| TranscriptView::new(&mut state, &transcript, None).render(f, f.area()))
            .unwrap();
        assert!(!state.has_unseen_content);
        assert!(screen_text(&terminal).contains("line 29"));
    }

    #[test]
    fn test_long_session_keeps_prompt_on_screen() {
        let mut transcript = Transcript::new();
        for i in 0..70_000 {
            transcript.append(format!("line {i}"), LineStyle::Normal);
        }
        let mut state = TranscriptViewState::new();
        let mut prompt = PromptBox::new();

        let backend = TestBackend::new(40, 10);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal
            .draw(|f| {
                let line = prompt.line(Mode::Interpreter, f.area().width - 1);
                TranscriptView::new(&mut state, &transcript, Some(line)).render(f, f.area());
            })
            .unwrap();

        let text = screen_text(&terminal);
        assert!(text.contains("line 69999"));
        assert!(text.contains("└─>>> "));
        assert_eq!(state.layout.total_height(), 70_000);
        assert_eq!(state.canvas_height, SCROLLBACK_ROWS);
        assert!(!state.has_unseen_content);
        assert_eq!(terminal.get_cursor_position().unwrap().y, 9);
    }

    #[test]
    fn test_tall_entry_is_cut_at_window_top() {
        let mut transcript = Transcript::new();
        let tall: String = (0..12_000).map(|i| format!("row {i}\n")).collect();
        transcript.append(tall.trim_end(), LineStyle::Normal);
        transcript.append("tail", LineStyle::Normal);
        let mut state = TranscriptViewState::new();

        let backend = TestBackend::new(40, 6);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal
            .draw(|f| TranscriptView::new(&mut state, &transcript, None).render(f, f.area()))
            .unwrap();

        let text = screen_text(&terminal);
        assert!(text.contains("row 11999"));
        assert!(text.contains("tail"));
        assert_eq!(state.canvas_height, SCROLLBACK_ROWS);

        // Scroll all the way up: the window starts part-way into the tall entry
        state.scroll_state.set_offset(Position { x: 0, y: 0 });
        state.stick_to_bottom = false;
        terminal
            .draw(|f| TranscriptView::new(&mut state, &transcript, None).render(f, f.area()))
            .unwrap();
        let text = screen_text(&terminal);
        assert!(text.contains("row 2001"));
        assert!(!text.contains("row 0 "));
    }

    #[test]
    fn test_clear_invalidates_heights() {
        let mut transcript = Transcript::new();
        transcript.append("a\nb\nc", LineStyle::Normal);
        let mut state = TranscriptViewState::new();

        let backend = TestBackend::new(20, 6);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal
            .draw(|f| TranscriptView::new(&mut state, &transcript, None).render(f, f.area()))
            .unwrap();
        assert_eq!(state.layout.heights, vec![3]);

        transcript.clear();
        transcript.append("single", LineStyle::Normal);
        terminal
            .draw(|f| TranscriptView::new(&mut state, &transcript, None).render(f, f.area()))
            .unwrap();
        assert_eq!(state.layout.heights, vec![1]);
    }
}
