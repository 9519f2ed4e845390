//! # Application State
//!
//! Core business state for askterm. This module contains domain logic only -
//! no TUI-specific types. Presentation state lives in the `tui` module.
//!
//! ```text
//! App
//! ├── transcript: Transcript      // user + bot bubbles, append-only
//! ├── cycle: Cycle                // Idle | Pending | Streaming
//! ├── banner: ErrorBanner         // transient error message
//! ├── status_message: String      // status bar text
//! ├── server_label: String        // shown in the title bar
//! └── examples: Vec<String>       // example prompts (Tab to fill)
//! ```
//!
//! State changes only happen through `update(state, action)` in action.rs.

use crate::core::accumulator::StreamAccumulator;
use crate::core::banner::ErrorBanner;
use crate::core::config::ResolvedConfig;
use crate::core::transcript::Transcript;

/// Identifies one submission. Every background action is tagged with the id
/// of the cycle that spawned it.
pub type CycleId = u64;

/// The one request/response cycle that may be in flight.
///
/// Input and send are enabled exactly when this is `Idle`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Cycle {
    Idle,
    /// Request issued, no content yet. `bot` indexes the placeholder bubble.
    Pending { id: CycleId, bot: usize },
    /// At least one chunk rendered.
    Streaming {
        id: CycleId,
        bot: usize,
        acc: StreamAccumulator,
    },
}

impl Cycle {
    pub fn id(&self) -> Option<CycleId> {
        match self {
            Cycle::Idle => None,
            Cycle::Pending { id, .. } | Cycle::Streaming { id, .. } => Some(*id),
        }
    }

    pub fn bot_index(&self) -> Option<usize> {
        match self {
            Cycle::Idle => None,
            Cycle::Pending { bot, .. } | Cycle::Streaming { bot, .. } => Some(*bot),
        }
    }
}

pub struct App {
    pub transcript: Transcript,
    pub cycle: Cycle,
    pub banner: ErrorBanner,
    pub status_message: String,
    pub server_label: String,
    pub examples: Vec<String>,
    next_example: usize,
    last_cycle: CycleId,
}

impl App {
    pub fn new(server_label: String) -> Self {
        Self {
            transcript: Transcript::new(),
            cycle: Cycle::Idle,
            banner: ErrorBanner::default(),
            status_message: String::from("Ready"),
            server_label,
            examples: Vec::new(),
            next_example: 0,
            last_cycle: 0,
        }
    }

    pub fn from_config(config: &ResolvedConfig) -> Self {
        let mut app = Self::new(config.endpoint_url());
        app.banner = ErrorBanner::new(config.banner_timeout);
        app.examples = config.examples.clone();
        app
    }

    /// Input field and send control are usable.
    pub fn input_enabled(&self) -> bool {
        self.cycle == Cycle::Idle
    }

    pub fn is_loading(&self) -> bool {
        !self.input_enabled()
    }

    /// Enter `Pending` for the placeholder at `bot` under a fresh id.
    pub fn begin_cycle(&mut self, bot: usize) -> CycleId {
        self.last_cycle += 1;
        self.cycle = Cycle::Pending {
            id: self.last_cycle,
            bot,
        };
        self.last_cycle
    }

    /// Next example prompt, cycling through the configured list.
    pub fn take_next_example(&mut self) -> Option<String> {
        if self.examples.is_empty() {
            return None;
        }
        let example = self.examples[self.next_example % self.examples.len()].clone();
        self.next_example = (self.next_example + 1) % self.examples.len();
        Some(example)
    }
}

#[cfg(test)]
mod tests {
    use crate::test_support::test_app;

    #[test]
    fn test_app_new_defaults() {
        let app = test_app();
        assert_eq!(app.status_message, "Ready");
        assert!(app.input_enabled());
        assert!(app.transcript.is_empty());
        assert_eq!(app.server_label, "http://test/ask");
    }

    #[test]
    fn test_examples_cycle() {
        let mut app = test_app();
        assert_eq!(app.take_next_example(), None);
        app.examples = vec!["a".to_string(), "b".to_string()];
        assert_eq!(app.take_next_example().as_deref(), Some("a"));
        assert_eq!(app.take_next_example().as_deref(), Some("b"));
        assert_eq!(app.take_next_example().as_deref(), Some("a"));
    }

    #[test]
    fn test_cycle_ids_never_repeat() {
        let mut app = test_app();
        let first = app.begin_cycle(1);
        app.cycle = super::Cycle::Idle;
        let second = app.begin_cycle(3);
        assert_ne!(first, second);
        assert_eq!(app.cycle.id(), Some(second));
        assert_eq!(app.cycle.bot_index(), Some(3));
    }
}
