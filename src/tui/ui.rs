use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Color, Style};
use ratatui::widgets::{Block, BorderType, Clear};

use crate::core::state::App;
use crate::tui::TuiState;
use crate::tui::component::Component;
use crate::tui::components::hardware_panel::PANEL_WIDTH;
use crate::tui::components::{HardwarePanel, TitleBar, TranscriptView};

/// Below this many columns the hardware panel is hidden.
pub const PANEL_MIN_SCREEN_WIDTH: u16 = 80;

/// Split the body into the terminal window and, if it fits, the panel.
pub fn body_layout(body: Rect) -> (Rect, Option<Rect>) {
    if body.width < PANEL_MIN_SCREEN_WIDTH {
        return (body, None);
    }
    let [window, panel] =
        Layout::horizontal([Constraint::Min(0), Constraint::Length(PANEL_WIDTH)]).areas(body);
    (window, Some(panel))
}

pub fn draw_ui(frame: &mut Frame, app: &App, tui: &mut TuiState) {
    use Constraint::{Length, Min};

    // Rain first; everything else paints over it
    if let Some(rain) = &tui.rain {
        frame.render_widget(rain, frame.area());
    }

    let [title_area, body] = Layout::vertical([Length(1), Min(0)]).areas(frame.area());
    let (window_area, panel_area) = body_layout(body);

    // Terminal window
    let block = Block::bordered()
        .border_type(BorderType::Rounded)
        .border_style(Style::new().fg(Color::Magenta))
        .title(" mang0@mango: ~ ")
        .style(Style::new().bg(Color::Black));
    let inner = block.inner(window_area);
    frame.render_widget(Clear, window_area);
    frame.render_widget(block, window_area);

    let live_prompt = app
        .active_affordance()
        .map(|affordance| tui.prompt.line(affordance.mode, inner.width.saturating_sub(1)));
    TranscriptView::new(&mut tui.transcript_view, &app.transcript, live_prompt)
        .render(frame, inner);

    if let Some(panel_area) = panel_area {
        HardwarePanel::new(&app.host).render(frame, panel_area);
    }

    // Title last so the unseen flag is from this frame
    frame.render_widget(Clear, title_area);
    TitleBar::new(
        app.mode.label(),
        app.interpreter_status.to_string(),
        tui.transcript_view.has_unseen_content,
    )
    .render(frame, title_area);
}
