use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span, Text};
use ratatui::widgets::{Block, BorderType, Padding, Paragraph, Widget, Wrap};

use crate::core::transcript::{BotState, Bubble};
use crate::tui::markdown;

/// Horizontal padding (per side) between the border and text content.
const CONTENT_PAD_H: u16 = 1;
/// Total horizontal space consumed by borders (1 left + 1 right) and padding.
const HORIZONTAL_OVERHEAD: u16 = 2 + CONTENT_PAD_H * 2;
/// Total vertical space consumed by borders (1 top + 1 bottom).
const VERTICAL_OVERHEAD: u16 = 2;

const USER_COLOR: Color = Color::Green;
const BOT_COLOR: Color = Color::Blue;

const THINKING_DOTS: [&str; 4] = ["", ".", "..", "..."];

/// Distinct frames of the thinking animation.
pub const THINKING_FRAMES: usize = THINKING_DOTS.len();

/// Build the body text for one bubble.
///
/// User text is literal: it is never parsed as markdown. Bot text is
/// rendered from the complete buffer every time its revision changes.
pub fn body_text(bubble: &Bubble, spinner_frame: usize) -> Text<'static> {
    match bubble {
        Bubble::User(text) => Text::from(
            text.lines()
                .map(|l| Line::from(l.to_string()))
                .collect::<Vec<_>>(),
        )
        .style(Style::default().fg(USER_COLOR)),
        Bubble::Bot(bot) => match &bot.state {
            BotState::Thinking => {
                let dots = THINKING_DOTS[spinner_frame % THINKING_FRAMES];
                Text::from(Line::styled(
                    format!("Thinking{dots}"),
                    Style::default()
                        .fg(Color::DarkGray)
                        .add_modifier(Modifier::ITALIC),
                ))
            }
            BotState::Active => markdown::render(&bot.content, BOT_COLOR),
            BotState::Failed(message) => {
                // Content survives only a user cancel; a failure clears it
                let mut text = if bot.content.is_empty() {
                    Text::default()
                } else {
                    markdown::render(&bot.content, BOT_COLOR)
                };
                text.lines.push(Line::styled(
                    message.clone(),
                    Style::default().fg(Color::Red),
                ));
                text
            }
            BotState::Expired { redirect } => Text::from(vec![
                Line::styled(
                    "Your session has expired.",
                    Style::default().fg(Color::Yellow),
                ),
                Line::from(vec![
                    Span::raw("Log in again: "),
                    Span::styled(
                        redirect.clone(),
                        Style::default()
                            .fg(Color::Cyan)
                            .add_modifier(Modifier::UNDERLINED),
                    ),
                ]),
            ]),
        },
    }
}

/// Rendered height of a bubble whose body is `body`, borders included.
///
/// Uses the same `Paragraph` wrapping the widget renders with, so the
/// scroll canvas height always matches what lands on screen.
pub fn calculate_height(body: &Text<'static>, width: u16) -> u16 {
    let content_width = width.saturating_sub(HORIZONTAL_OVERHEAD);
    if content_width == 0 {
        return 1;
    }
    let lines = Paragraph::new(body.clone())
        .wrap(Wrap { trim: false })
        .line_count(content_width);
    (lines as u16).max(1) + VERTICAL_OVERHEAD
}

/// A transient widget for one chat bubble.
pub struct BubbleView<'a> {
    pub body: &'a Text<'static>,
    pub from_user: bool,
    /// The pending bubble pulses while the cycle is running
    pub is_live: bool,
}

impl Widget for BubbleView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let (role, color) = if self.from_user {
            ("you", USER_COLOR)
        } else {
            ("bot", BOT_COLOR)
        };
        let border_style = if self.is_live {
            Style::default().fg(color).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(color).add_modifier(Modifier::DIM)
        };

        let block = Block::bordered()
            .title(role)
            .border_type(BorderType::Rounded)
            .border_style(border_style)
            .title_style(border_style)
            .padding(Padding::horizontal(CONTENT_PAD_H));

        let inner_area = block.inner(area);
        block.render(area, buf);

        Paragraph::new(self.body.clone())
            .wrap(Wrap { trim: false })
            .render(inner_area, buf);
    }
}
