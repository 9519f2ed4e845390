//! # TranscriptView Component
//!
//! Scrollable view of the chat bubbles.
//!
//! ## Responsibilities
//!
//! - Display the transcript, one bordered bubble per entry
//! - Keep the newest bubble in view while pinned to the bottom
//! - Cache rendered bubble bodies and heights between frames
//!
//! ## Architecture
//!
//! `TranscriptView` is a transient component (created each frame) that wraps
//! `&'a mut TranscriptViewState` (persistent state) and the core `Transcript`
//! (props). The markdown for a bot bubble is rebuilt only when its revision
//! changes, so a long answer is not re-parsed on every frame.

use ratatui::Frame;
use ratatui::layout::{Position, Rect, Size};
use ratatui::text::Text;
use tui_scrollview::{ScrollView, ScrollViewState, ScrollbarVisibility};

use crate::core::transcript::{BotState, Bubble, Transcript};
use crate::tui::component::{Component, EventHandler};
use crate::tui::components::bubble::{self, BubbleView, THINKING_FRAMES};
use crate::tui::event::TuiEvent;

/// Layout and scroll state for the transcript.
/// Must be persisted in the parent TuiState.
pub struct TranscriptViewState {
    pub scroll_state: ScrollViewState,
    pub layout: LayoutCache,
    /// When true, auto-scroll to bottom on new content
    pub stick_to_bottom: bool,
    /// Last known viewport height (for scroll clamping between frames)
    pub viewport_height: u16,
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
        }
    }

    fn max_offset(&self) -> u16 {
        self.layout.total_height().saturating_sub(self.viewport_height)
    }

    /// Clamp scroll offset so it never exceeds the content bounds.
    pub fn clamp_scroll(&mut self) {
        let max_y = self.max_offset();
        let current = self.scroll_state.offset();
        if current.y > max_y {
            self.scroll_state.set_offset(Position {
                x: current.x,
                y: max_y,
            });
        }
    }

    /// Re-engage auto-scroll if the user has scrolled back down to the end.
    pub fn repin_if_at_bottom(&mut self) {
        let max_y = self.max_offset();
        let current = self.scroll_state.offset();
        if current.y >= max_y {
            self.stick_to_bottom = true;
            self.scroll_state.set_offset(Position {
                x: current.x,
                y: max_y,
            });
        }
    }

    /// Jump to the newest bubble and follow it from now on.
    pub fn pin_to_bottom(&mut self) {
        self.stick_to_bottom = true;
        self.scroll_state.scroll_to_bottom();
    }

    /// True when content exists below the viewport.
    pub fn has_unseen_content(&self) -> bool {
        !self.stick_to_bottom && self.scroll_state.offset().y < self.max_offset()
    }
}

/// Scrollable transcript component.
/// Created fresh each frame with references to state and data.
pub struct TranscriptView<'a> {
    pub state: &'a mut TranscriptViewState,
    pub transcript: &'a Transcript,
    pub is_loading: bool,
    pub spinner_frame: usize,
}

impl<'a> TranscriptView<'a> {
    pub fn new(
        state: &'a mut TranscriptViewState,
        transcript: &'a Transcript,
        is_loading: bool,
        spinner_frame: usize,
    ) -> Self {
        Self {
            state,
            transcript,
            is_loading,
            spinner_frame,
        }
    }
}

impl Component for TranscriptView<'_> {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let content_width = area.width.saturating_sub(1); // -1 for scrollbar
        let bubbles = self.transcript.bubbles();

        self.state
            .layout
            .sync(bubbles, content_width, self.spinner_frame);
        let total_height = self.state.layout.total_height();

        self.state.viewport_height = area.height;
        if !self.state.stick_to_bottom {
            self.state.clamp_scroll();
        }

        let scroll_offset = self.state.scroll_state.offset().y;
        let visible_range = self.state.layout.visible_range(scroll_offset, area.height);

        let mut scroll_view = ScrollView::new(Size::new(content_width, total_height))
            .vertical_scrollbar_visibility(ScrollbarVisibility::Always)
            .horizontal_scrollbar_visibility(ScrollbarVisibility::Never);

        let mut y_offset: u16 = if visible_range.start > 0 {
            self.state.layout.prefix_heights[visible_range.start - 1]
        } else {
            0
        };

        let last = bubbles.len().saturating_sub(1);
        for i in visible_range {
            let entry = &self.state.layout.entries[i];
            let rect = Rect::new(0, y_offset, content_width, entry.height);
            scroll_view.render_widget(
                BubbleView {
                    body: &entry.body,
                    from_user: matches!(bubbles[i], Bubble::User(_)),
                    is_live: self.is_loading && i == last,
                },
                rect,
            );
            y_offset += entry.height;
        }

        if self.state.stick_to_bottom {
            self.state.scroll_state.scroll_to_bottom();
        }

        frame.render_stateful_widget(scroll_view, area, &mut self.state.scroll_state);
    }
}

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

/// What a cached body was built from. A mismatch forces a rebuild.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CacheKey {
    User,
    Thinking { frame: usize },
    Bot { revision: u32 },
}

impl CacheKey {
    fn of(bubble: &Bubble, spinner_frame: usize) -> Self {
        match bubble {
            Bubble::User(_) => CacheKey::User,
            Bubble::Bot(bot) if bot.state == BotState::Thinking => CacheKey::Thinking {
                frame: spinner_frame % THINKING_FRAMES,
            },
            Bubble::Bot(bot) => CacheKey::Bot {
                revision: bot.revision,
            },
        }
    }
}

pub struct CachedBubble {
    key: CacheKey,
    pub body: Text<'static>,
    pub height: u16,
}

/// Cached bodies and layout measurements, one entry per bubble.
pub struct LayoutCache {
    pub entries: Vec<CachedBubble>,
    pub prefix_heights: Vec<u16>,
    content_width: u16,
}

impl Default for LayoutCache {
    fn default() -> Self {
        Self::new()
    }
}

impl LayoutCache {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            prefix_heights: Vec::new(),
            content_width: 0,
        }
    }

    /// Bring the cache in line with `bubbles`, rebuilding only stale entries.
    pub fn sync(&mut self, bubbles: &[Bubble], content_width: u16, spinner_frame: usize) {
        if content_width != self.content_width || bubbles.len() < self.entries.len() {
            self.entries.clear();
            self.content_width = content_width;
        }

        for (i, item) in bubbles.iter().enumerate() {
            let key = CacheKey::of(item, spinner_frame);
            if self.entries.get(i).is_some_and(|e| e.key == key) {
                continue;
            }
            let body = bubble::body_text(item, spinner_frame);
            let height = bubble::calculate_height(&body, content_width);
            let entry = CachedBubble { key, body, height };
            if i < self.entries.len() {
                self.entries[i] = entry;
            } else {
                self.entries.push(entry);
            }
        }
        self.rebuild_prefix_heights();
    }

    pub fn total_height(&self) -> u16 {
        self.prefix_heights.last().copied().unwrap_or(0)
    }

    fn rebuild_prefix_heights(&mut self) {
        self.prefix_heights = self
            .entries
            .iter()
            .scan(0u16, |acc, e| {
                *acc = acc.saturating_add(e.height);
                Some(*acc)
            })
            .collect();
    }

    pub fn visible_range(&self, scroll_offset: u16, viewport_height: u16) -> std::ops::Range<usize> {
        let buffer = viewport_height / 2;
        let buffered_start = scroll_offset.saturating_sub(buffer);
        let buffered_end = scroll_offset
            .saturating_add(viewport_height)
            .saturating_add(buffer);

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
