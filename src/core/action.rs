//! # Actions
//!
//! Everything that can happen in askterm becomes an `Action`.
//! User presses Enter? That's `Action::Submit(text)`.
//! A stream event arrives? That's `Action::ResponseChunk { cycle, text }`.
//!
//! The `update()` function takes the current state and an action, mutates
//! the state, and returns an `Effect` describing the I/O the adapter must
//! perform. No side effects here. I/O happens elsewhere.
//!
//! ```text
//! State + Action  →  update()  →  New State + Effect
//! ```
//!
//! The request cycle is an explicit state machine on `App::cycle`:
//!
//! ```text
//!          Submit              first chunk
//!   Idle ─────────→ Pending ───────────────→ Streaming
//!    ↑                 │                         │
//!    └─────────────────┴── Done / Failed / ──────┘
//!                          Expired / Cancel
//! ```
//!
//! Every arrow back to `Idle` goes through `finish_cycle`, which is what
//! re-enables the input no matter how the cycle ended.
//!
//! Actions produced by a request task carry the `CycleId` handed out at
//! submit. Anything tagged with another id is dropped, so a cancelled
//! request that is still draining cannot touch the next cycle.

use std::time::Instant;

use log::{debug, info, warn};

use crate::core::accumulator::{ChunkOutcome, StreamAccumulator};
use crate::core::state::{App, Cycle, CycleId};
use crate::core::transcript::FAILURE_TEXT;

/// Banner text for transport, HTTP and decoding failures.
pub const GENERIC_ERROR: &str = "An error occurred while processing your request.";

/// Banner text for a 401 without an `error` field.
pub const SESSION_EXPIRED_FALLBACK: &str = "Your session has expired. Please log in again.";

#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// User pressed Enter with this input text.
    Submit(String),
    /// User asked for the next example prompt (Tab).
    NextExample,
    /// One decoded stream event.
    ResponseChunk { cycle: CycleId, text: String },
    /// Body ended normally.
    ResponseDone { cycle: CycleId },
    /// Non-2xx status (other than 401), network or decoding error.
    /// `at` is when the failure was observed; the banner runs from there.
    RequestFailed {
        cycle: CycleId,
        reason: String,
        at: Instant,
    },
    /// 401 with a redirect to log in again.
    SessionExpired {
        cycle: CycleId,
        redirect: String,
        message: Option<String>,
        at: Instant,
    },
    /// User aborted the in-flight request (Esc).
    Cancel,
    Quit,
}

/// I/O the adapter must perform after an update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    None,
    /// Issue the outbound request for this query, tagged with `cycle`.
    SpawnRequest { cycle: CycleId, query: String },
    /// The cycle ended: re-enable and focus the input.
    RestoreInput,
    /// Replace the input field contents.
    FillInput(String),
    /// The bot bubble grew; bring the bottom of the transcript into view.
    ScrollToBottom,
    Quit,
}

pub fn update(app: &mut App, action: Action) -> Effect {
    match action {
        Action::Submit(text) => submit(app, text),
        Action::NextExample => {
            if !app.input_enabled() {
                return Effect::None;
            }
            app.take_next_example()
                .map(Effect::FillInput)
                .unwrap_or(Effect::None)
        }
        Action::ResponseChunk { cycle, text } => {
            if !is_current(app, cycle) {
                return Effect::None;
            }
            apply_chunk(app, &text)
        }
        Action::ResponseDone { cycle } => {
            if !is_current(app, cycle) {
                return Effect::None;
            }
            if let Cycle::Pending { bot, .. } = app.cycle {
                // Stream ended without any content; drop the placeholder text
                info!("Stream done with no content");
                if let Some(bubble) = app.transcript.bot_mut(bot) {
                    bubble.render("");
                }
            } else {
                info!("Stream done");
            }
            app.status_message = String::from("Ready");
            finish_cycle(app)
        }
        Action::RequestFailed { cycle, reason, at } => {
            if !is_current(app, cycle) {
                return Effect::None;
            }
            warn!("Request failed: {}", reason);
            if let Some(bubble) = app
                .cycle
                .bot_index()
                .and_then(|idx| app.transcript.bot_mut(idx))
            {
                bubble.fail(FAILURE_TEXT);
            }
            app.banner.show(GENERIC_ERROR, at);
            app.status_message = String::from("Request failed");
            finish_cycle(app)
        }
        Action::SessionExpired {
            cycle,
            redirect,
            message,
            at,
        } => {
            if !is_current(app, cycle) {
                return Effect::None;
            }
            info!("Session expired, redirect to {}", redirect);
            if let Some(bubble) = app
                .cycle
                .bot_index()
                .and_then(|idx| app.transcript.bot_mut(idx))
            {
                bubble.expire(redirect);
            }
            let message = message.unwrap_or_else(|| SESSION_EXPIRED_FALLBACK.to_string());
            app.banner.show(message, at);
            app.status_message = String::from("Session expired");
            finish_cycle(app)
        }
        Action::Cancel => {
            if app.cycle == Cycle::Idle {
                return Effect::None;
            }
            info!("Request cancelled by user");
            if let Some(bubble) = app
                .cycle
                .bot_index()
                .and_then(|idx| app.transcript.bot_mut(idx))
            {
                bubble.cancel();
            }
            app.status_message = String::from("Cancelled");
            finish_cycle(app)
        }
        Action::Quit => Effect::Quit,
    }
}

/// Whether a background action tagged `cycle` belongs to the active cycle.
fn is_current(app: &App, cycle: CycleId) -> bool {
    if app.cycle.id() == Some(cycle) {
        return true;
    }
    debug!(
        "Dropping action from cycle {} (active: {:?})",
        cycle,
        app.cycle.id()
    );
    false
}

fn submit(app: &mut App, text: String) -> Effect {
    let text = text.trim();
    if text.is_empty() {
        return Effect::None;
    }
    if !app.input_enabled() {
        debug!("Submit ignored: request already in flight");
        return Effect::None;
    }

    app.transcript.push_user(text.to_string());
    let bot = app.transcript.push_thinking();
    let cycle = app.begin_cycle(bot);
    app.status_message = String::from("Thinking...");
    info!("Submitting query ({} bytes) as cycle {}", text.len(), cycle);
    Effect::SpawnRequest {
        cycle,
        query: text.to_string(),
    }
}

fn apply_chunk(app: &mut App, chunk: &str) -> Effect {
    // Pending → Streaming on the first chunk that carries content
    if let Cycle::Pending { id, bot } = app.cycle {
        let mut acc = StreamAccumulator::new();
        if acc.accept(chunk) != ChunkOutcome::Appended {
            return Effect::None;
        }
        if let Some(bubble) = app.transcript.bot_mut(bot) {
            bubble.render(acc.buffer());
        }
        app.cycle = Cycle::Streaming { id, bot, acc };
        app.status_message = String::from("Streaming...");
        return Effect::ScrollToBottom;
    }

    let Cycle::Streaming { bot, acc, .. } = &mut app.cycle else {
        debug!("Dropping chunk outside an active cycle");
        return Effect::None;
    };

    match acc.accept(chunk) {
        ChunkOutcome::Appended => {
            if let Some(bubble) = app.transcript.bot_mut(*bot) {
                bubble.render(acc.buffer());
            }
            Effect::ScrollToBottom
        }
        ChunkOutcome::Duplicate => {
            debug!("Skipping repeated chunk ({} bytes)", chunk.len());
            Effect::None
        }
        ChunkOutcome::Ignored => Effect::None,
    }
}

/// Common exit for every way a cycle can end.
fn finish_cycle(app: &mut App) -> Effect {
    app.cycle = Cycle::Idle;
    Effect::RestoreInput
}
