//! # ErrorBanner Component
//!
//! One red line above the transcript, shown while the core banner is visible.
//! The deadline lives in `core::banner`; this only draws what it is given.

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::tui::component::Component;

pub struct ErrorBannerView<'a> {
    pub message: &'a str,
}

impl Component for ErrorBannerView<'_> {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let style = Style::default().fg(Color::White).bg(Color::Red);
        let line = Line::from(vec![
            Span::styled(" ! ", style.add_modifier(Modifier::BOLD)),
            Span::styled(self.message.to_string(), style),
        ]);
        frame.render_widget(Paragraph::new(line).style(style), area);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;

    #[test]
    fn test_banner_renders_message() {
        let backend = TestBackend::new(60, 1);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal
            .draw(|f| {
                ErrorBannerView {
                    message: "HTTP error! status: 500",
                }
                .render(f, f.area())
            })
            .unwrap();

        let buffer = terminal.backend().buffer();
        let text: String = buffer.content().iter().map(|c| c.symbol()).collect();
        assert!(text.contains("HTTP error! status: 500"));
        assert_eq!(buffer[(0, 0)].bg, Color::Red);
    }
}
