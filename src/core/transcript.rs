//! # Transcript
//!
//! The ordered list of message bubbles for the current run. Append-only:
//! bubbles are never removed or reordered, only the last bot bubble is
//! mutated while a request cycle is active.
//!
//! ```text
//! Transcript
//! ├── Bubble::User("hi")                     // literal, never rendered as markdown
//! ├── Bubble::Bot(BotBubble { Active })      // re-rendered from the full buffer
//! ├── Bubble::User("again")
//! └── Bubble::Bot(BotBubble { Thinking })    // pending placeholder
//! ```

/// Inline text shown in a bot bubble when a cycle fails.
pub const FAILURE_TEXT: &str = "Sorry, there was an error processing your request.";

/// Inline text shown in a bot bubble when the user aborts the request.
pub const CANCELLED_TEXT: &str = "Request cancelled.";

/// Lifecycle of a bot bubble.
///
/// `Thinking` is the pending placeholder. It moves to `Active` on the first
/// real chunk, or straight to `Failed` / `Expired` if the cycle ends first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BotState {
    Thinking,
    Active,
    Failed(String),
    Expired { redirect: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BotBubble {
    pub state: BotState,
    /// Markdown source: always the entire cumulative buffer, never a delta.
    pub content: String,
    /// Bumped on every re-render so views know to rebuild their cached text.
    pub revision: u32,
}

impl BotBubble {
    pub fn thinking() -> Self {
        Self {
            state: BotState::Thinking,
            content: String::new(),
            revision: 0,
        }
    }

    /// Replace the rendered content with the full buffer.
    pub fn render(&mut self, buffer: &str) {
        self.state = BotState::Active;
        self.content.clear();
        self.content.push_str(buffer);
        self.revision += 1;
    }

    /// The failure text replaces anything already streamed.
    pub fn fail(&mut self, message: &str) {
        self.state = BotState::Failed(message.to_string());
        self.content.clear();
        self.revision += 1;
    }

    /// User abort: what was already streamed stays above the notice.
    pub fn cancel(&mut self) {
        self.state = BotState::Failed(CANCELLED_TEXT.to_string());
        self.revision += 1;
    }

    pub fn expire(&mut self, redirect: String) {
        self.state = BotState::Expired { redirect };
        self.revision += 1;
    }

    pub fn is_pending(&self) -> bool {
        self.state == BotState::Thinking
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Bubble {
    User(String),
    Bot(BotBubble),
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Transcript {
    bubbles: Vec<Bubble>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_user(&mut self, text: String) {
        self.bubbles.push(Bubble::User(text));
    }

    /// Append a pending bot bubble and return its index.
    pub fn push_thinking(&mut self) -> usize {
        self.bubbles.push(Bubble::Bot(BotBubble::thinking()));
        self.bubbles.len() - 1
    }

    pub fn bot_mut(&mut self, index: usize) -> Option<&mut BotBubble> {
        match self.bubbles.get_mut(index) {
            Some(Bubble::Bot(bot)) => Some(bot),
            _ => None,
        }
    }

    pub fn bubbles(&self) -> &[Bubble] {
        &self.bubbles
    }

    pub fn len(&self) -> usize {
        self.bubbles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bubbles.is_empty()
    }
}
