//! # Landing Page Component
//!
//! Shown in place of the transcript until the first question is asked.

use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Flex, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::tui::component::Component;

pub struct LandingPage<'a> {
    /// Endpoint URL requests are posted to
    pub endpoint: &'a str,
    /// Example prompts cycled by Tab
    pub examples: &'a [String],
}

impl Component for LandingPage<'_> {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let dim = Style::default().fg(Color::DarkGray);

        let mut lines = vec![
            Line::from(Span::styled(
                "askterm",
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            )),
            Line::from(Span::styled(
                format!("v{}", env!("CARGO_PKG_VERSION")),
                dim,
            )),
            Line::from(Span::styled(format!("Asking {}", self.endpoint), dim)),
            Line::default(),
        ];

        if !self.examples.is_empty() {
            lines.push(Line::from(Span::styled(
                "Press Tab for an example:",
                Style::default().fg(Color::Cyan),
            )));
            lines.extend(
                self.examples
                    .iter()
                    .map(|e| Line::from(Span::styled(format!("\u{2022} {e}"), dim))),
            );
            lines.push(Line::default());
        }
        lines.push(Line::from(Span::styled(
            "Enter sends \u{b7} Shift+Enter adds a line \u{b7} Esc cancels \u{b7} Ctrl+C quits",
            dim,
        )));

        let [text_area] = Layout::vertical([Constraint::Length(lines.len() as u16)])
            .flex(Flex::Center)
            .areas(area);

        frame.render_widget(
            Paragraph::new(lines).alignment(Alignment::Center),
            text_area,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;

    fn draw(examples: &[String]) -> String {
        let backend = TestBackend::new(80, 14);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal
            .draw(|f| {
                LandingPage {
                    endpoint: "http://localhost:5000/ask",
                    examples,
                }
                .render(f, f.area())
            })
            .unwrap();
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect()
    }

    #[test]
    fn test_landing_lists_examples() {
        let text = draw(&["What is Rust?".to_string()]);
        assert!(text.contains("askterm"));
        assert!(text.contains("http://localhost:5000/ask"));
        assert!(text.contains("Press Tab"));
        assert!(text.contains("What is Rust?"));
    }

    #[test]
    fn test_landing_without_examples_hides_tab_hint() {
        let text = draw(&[]);
        assert!(!text.contains("Press Tab"));
    }
}
