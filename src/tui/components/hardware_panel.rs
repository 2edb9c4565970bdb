//! # HardwarePanel Component
//!
//! The sidebar next to the terminal window: what `neofetch` reports, kept on
//! screen. Resolution follows the terminal size.

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Clear, Paragraph, Wrap};

use crate::core::host::HostInfo;
use crate::tui::component::Component;

/// Panel width in columns, borders included.
pub const PANEL_WIDTH: u16 = 32;

pub struct HardwarePanel<'a> {
    pub host: &'a HostInfo,
}

impl<'a> HardwarePanel<'a> {
    pub fn new(host: &'a HostInfo) -> Self {
        Self { host }
    }

    fn rows(&self) -> Vec<Line<'static>> {
        let label = Style::new().fg(Color::LightMagenta).add_modifier(Modifier::BOLD);
        [
            ("Resolution", self.host.resolution_label()),
            ("CPU", self.host.cpu_label()),
            ("GPU", self.host.gpu_label()),
            ("Memory", self.host.memory_label()),
        ]
        .into_iter()
        .map(|(name, value)| {
            Line::from(vec![
                Span::styled(format!("{name}: "), label),
                Span::styled(value, Style::new().fg(Color::White)),
            ])
        })
        .collect()
    }
}

impl<'a> Component for HardwarePanel<'a> {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let block = Block::bordered()
            .border_type(BorderType::Rounded)
            .border_style(Style::new().fg(Color::Magenta))
            .title(" Hardware ")
            .style(Style::new().bg(Color::Black));

        frame.render_widget(Clear, area);
        frame.render_widget(
            Paragraph::new(self.rows())
                .block(block)
                .wrap(Wrap { trim: true }),
            area,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::host::GpuInfo;
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;

    #[test]
    fn test_panel_lists_host_facts() {
        let host = HostInfo {
            cpu_cores: Some(12),
            gpu: GpuInfo::Renderer("RTX 3080".to_string()),
            memory_mb: Some(32000),
            viewport: (120, 40),
        };
        let backend = TestBackend::new(PANEL_WIDTH, 8);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal
            .draw(|f| HardwarePanel::new(&host).render(f, f.area()))
            .unwrap();

        let text: String = terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect();
        assert!(text.contains("Hardware"));
        assert!(text.contains("Resolution: 120x40"));
        assert!(text.contains("CPU: 12 cores"));
        assert!(text.contains("GPU: RTX 3080"));
        assert!(text.contains("Memory: 32000 MB"));
    }

    #[test]
    fn test_panel_unknowns() {
        let host = HostInfo::default();
        let panel = HardwarePanel::new(&host);
        let text: Vec<String> = panel.rows().iter().map(|line| line.to_string()).collect();
        assert_eq!(text[1], "CPU: Unknown");
        assert_eq!(text[2], "GPU: Unavailable");
        assert_eq!(text[3], "Memory: Unknown");
    }
}
