//! # InputBox Component
//!
//! The message field plus the send control.
//!
//! ## Responsibilities
//!
//! - Capture text input and basic editing (backspace, delete, cursor, paste)
//! - Emit `Submit` on Enter; Shift+Enter arrives as a plain `'\n'` char
//! - Refuse all input while `disabled` (a request cycle is in flight)
//!
//! ## State Management
//!
//! The buffer and cursor are internal state. `disabled` is a prop mirrored
//! from `App::input_enabled()` every frame. The buffer is *not* cleared on
//! submit; the parent clears it once the controller accepts the text.

mod text_wrap;

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::Line;
use ratatui::widgets::{Block, BorderType, Padding, Paragraph};

use crate::tui::component::{Component, EventHandler};
use crate::tui::event::TuiEvent;

use text_wrap::{
    CONTENT_OFFSET, MAX_VISIBLE_LINES, VERTICAL_OVERHEAD, cursor_row_col, inner_width,
    next_char_boundary, prev_char_boundary, wrap_line_count, wrap_options,
};

/// High-level events emitted by the InputBox
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    /// User pressed Enter (buffer contents, untrimmed)
    Submit(String),
    /// Text content or cursor changed
    ContentChanged,
}

pub struct InputBox {
    /// Text buffer (Internal State)
    pub buffer: String,
    /// Input and send are locked (Prop)
    pub disabled: bool,
    /// Cursor position as byte offset in buffer
    pos: usize,
    /// First visible wrapped line when content exceeds MAX_VISIBLE_LINES
    scroll_offset: u16,
}

impl Default for InputBox {
    fn default() -> Self {
        Self::new()
    }
}

impl InputBox {
    pub fn new() -> Self {
        Self {
            buffer: String::new(),
            disabled: false,
            pos: 0,
            scroll_offset: 0,
        }
    }

    /// Replace the buffer (example prompts) and move the cursor to the end.
    pub fn set_text(&mut self, text: &str) {
        self.buffer = text.to_string();
        self.pos = self.buffer.len();
        self.scroll_offset = 0;
    }

    pub fn clear(&mut self) {
        self.set_text("");
    }

    /// Required height for the current buffer, clamped to viewport limits.
    pub fn calculate_height(&self, content_width: u16) -> u16 {
        let lines = wrap_line_count(&self.buffer, inner_width(content_width));
        lines.min(MAX_VISIBLE_LINES) + VERTICAL_OVERHEAD
    }

    /// Keep the cursor row inside the visible window.
    fn update_scroll_offset(&mut self, content_width: u16) {
        let (row, _) = cursor_row_col(&self.buffer, self.pos, inner_width(content_width));
        if row < self.scroll_offset {
            self.scroll_offset = row;
        } else if row >= self.scroll_offset + MAX_VISIBLE_LINES {
            self.scroll_offset = row + 1 - MAX_VISIBLE_LINES;
        }
    }

    fn visible_lines(&self, content_width: u16) -> Vec<Line<'static>> {
        let width = inner_width(content_width);
        if width == 0 {
            return Vec::new();
        }
        let mut lines: Vec<String> = textwrap::wrap(&self.buffer, wrap_options(width))
            .into_iter()
            .map(|l| l.into_owned())
            .collect();
        if self.buffer.ends_with('\n') && !lines.last().is_some_and(|l| l.is_empty()) {
            lines.push(String::new());
        }
        lines
            .into_iter()
            .skip(self.scroll_offset as usize)
            .take(MAX_VISIBLE_LINES as usize)
            .map(Line::from)
            .collect()
    }

    fn insert(&mut self, text: &str) -> Option<InputEvent> {
        if self.disabled {
            return None;
        }
        self.buffer.insert_str(self.pos, text);
        self.pos += text.len();
        Some(InputEvent::ContentChanged)
    }
}

impl Component for InputBox {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        self.update_scroll_offset(area.width);

        let (text_style, border_style, title, send) = if self.disabled {
            let dim = Style::default().fg(Color::DarkGray);
            (dim, dim, " Waiting for reply (Esc to cancel) ", " ⏎ send ")
        } else {
            (
                Style::default().fg(Color::Green),
                Style::default().fg(Color::Green),
                " Message ",
                " ⏎ send ",
            )
        };
        let send_style = if self.disabled {
            Style::default()
                .fg(Color::DarkGray)
                .add_modifier(Modifier::CROSSED_OUT)
        } else {
            Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)
        };

        let block = Block::bordered()
            .border_type(BorderType::Rounded)
            .border_style(border_style)
            .title(title)
            .title_bottom(Line::styled(send, send_style).right_aligned())
            .padding(Padding::horizontal(1));

        let input = Paragraph::new(self.visible_lines(area.width))
            .block(block)
            .style(text_style);
        frame.render_widget(input, area);

        // A disabled field has no caret
        if !self.disabled {
            let (row, col) = cursor_row_col(&self.buffer, self.pos, inner_width(area.width));
            let x = area.x + CONTENT_OFFSET + col;
            let y = area.y + 1 + row.saturating_sub(self.scroll_offset);
            frame.set_cursor_position((x, y));
        }
    }
}

impl EventHandler for InputBox {
    type Event = InputEvent;

    fn handle_event(&mut self, event: &TuiEvent) -> Option<Self::Event> {
        if self.disabled {
            return None;
        }
        match event {
            TuiEvent::InputChar(c) => self.insert(c.encode_utf8(&mut [0u8; 4])),
            TuiEvent::Paste(text) => self.insert(text),
            TuiEvent::Backspace => (self.pos > 0).then(|| {
                let prev = prev_char_boundary(&self.buffer, self.pos);
                self.buffer.drain(prev..self.pos);
                self.pos = prev;
                InputEvent::ContentChanged
            }),
            TuiEvent::Delete => (self.pos < self.buffer.len()).then(|| {
                let next = next_char_boundary(&self.buffer, self.pos);
                self.buffer.drain(self.pos..next);
                InputEvent::ContentChanged
            }),
            TuiEvent::CursorLeft => (self.pos > 0).then(|| {
                self.pos = prev_char_boundary(&self.buffer, self.pos);
                InputEvent::ContentChanged
            }),
            TuiEvent::CursorRight => (self.pos < self.buffer.len()).then(|| {
                self.pos = next_char_boundary(&self.buffer, self.pos);
                InputEvent::ContentChanged
            }),
            TuiEvent::CursorHome => {
                let line_start = self.buffer[..self.pos]
                    .rfind('\n')
                    .map(|i| i + 1)
                    .unwrap_or(0);
                (self.pos != line_start).then(|| {
                    self.pos = line_start;
                    InputEvent::ContentChanged
                })
            }
            TuiEvent::CursorEnd => {
                let line_end = self.buffer[self.pos..]
                    .find('\n')
                    .map(|i| self.pos + i)
                    .unwrap_or(self.buffer.len());
                (self.pos != line_end).then(|| {
                    self.pos = line_end;
                    InputEvent::ContentChanged
                })
            }
            TuiEvent::Submit => Some(InputEvent::Submit(self.buffer.clone())),
            _ => None,
        }
    }
}
