//! # TitleBar Component
//!
//! Top status bar showing the server and the current cycle status.
//!
//! ## Responsibilities
//!
//! - Display the endpoint requests are posted to
//! - Display the status message ("Thinking...", "Streaming...", "Ready")
//! - Show "↓ New" when there is content below the scroll position
//!
//! ## Conditional Formatting
//!
//! 1. **Unseen content**: `"askterm (server: URL) | Streaming... | ↓ New"`
//! 2. **Status message**: `"askterm (server: URL) | Ready"`
//! 3. **Default**: `"askterm (server: URL)"`

use crate::tui::component::Component;
use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::text::Span;

/// Top status bar. All fields are props.
pub struct TitleBar {
    pub server_label: String,
    pub status_message: String,
    pub has_unseen_content: bool,
}

impl TitleBar {
    pub fn new(server_label: String, status_message: String, has_unseen_content: bool) -> Self {
        Self {
            server_label,
            status_message,
            has_unseen_content,
        }
    }
}

impl Component for TitleBar {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let title_text = if self.has_unseen_content {
            format!(
                "askterm (server: {}) | {} | ↓ New",
                self.server_label, self.status_message
            )
        } else if self.status_message.is_empty() {
            format!("askterm (server: {})", self.server_label)
        } else {
            format!(
                "askterm (server: {}) | {}",
                self.server_label, self.status_message
            )
        };

        frame.render_widget(Span::raw(title_text), area);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;

    fn draw(title_bar: &mut TitleBar) -> String {
        let backend = TestBackend::new(80, 1);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal.draw(|f| title_bar.render(f, f.area())).unwrap();
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect()
    }

    #[test]
    fn test_title_bar_with_unseen_content() {
        let mut title_bar = TitleBar::new(
            "http://localhost:5000/ask".to_string(),
            "Streaming...".to_string(),
            true,
        );
        let text = draw(&mut title_bar);
        assert!(text.contains("askterm"));
        assert!(text.contains("http://localhost:5000/ask"));
        assert!(text.contains("Streaming..."));
        assert!(text.contains("↓ New"));
    }

    #[test]
    fn test_title_bar_with_status_message() {
        let mut title_bar = TitleBar::new(
            "http://localhost:5000/ask".to_string(),
            "Thinking...".to_string(),
            false,
        );
        let text = draw(&mut title_bar);
        assert!(text.contains("Thinking..."));
        assert!(!text.contains("↓ New"));
    }

    #[test]
    fn test_title_bar_default_no_status() {
        let mut title_bar = TitleBar::new("http://x/ask".to_string(), String::new(), false);
        let text = draw(&mut title_bar);
        assert!(text.contains("askterm (server: http://x/ask)"));
        assert!(!text.contains('|'));
    }
}
