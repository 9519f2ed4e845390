//! # TUI Adapter
//!
//! The ratatui-specific layer. Handles terminal I/O, renders the UI,
//! translates keyboard events into `core::Action` values and performs the
//! `Effect`s that `update()` hands back.
//!
//! This is the only module that knows about ratatui and crossterm.
//!
//! ## Redraw Strategy
//!
//! - **Animating** (request in flight): draws every ~80ms for the
//!   "Thinking..." indicator.
//! - **Idle**: sleeps up to 500ms, or until the error banner is due to
//!   disappear, and only redraws on events.
//!
//! ## Request Tasks
//!
//! Each cycle runs one tokio task that drives the backend and forwards its
//! chunks as `Action::ResponseChunk`. The terminal action (done, failed,
//! expired) is sent only after every chunk. Every action carries the id of
//! the cycle that spawned the task, and the core drops the ones whose cycle
//! is no longer active (an aborted task may already have queued some).

mod component;
mod components;
mod event;
pub mod markdown;
mod ui;

use log::{debug, info, warn};
use std::io::stdout;
use std::sync::{Arc, mpsc};
use std::time::{Duration, Instant};

use crossterm::cursor::{SetCursorStyle, Show};
use crossterm::event::{
    DisableBracketedPaste, DisableMouseCapture, EnableBracketedPaste, EnableMouseCapture,
    KeyboardEnhancementFlags, PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
};
use crossterm::execute;

use crate::client::{AskBackend, AskError, HttpAskClient};
use crate::core::action::{Action, Effect, update};
use crate::core::config::ResolvedConfig;
use crate::core::state::{App, CycleId};
use crate::tui::component::EventHandler;
use crate::tui::components::{InputBox, InputEvent, TranscriptViewState};
use crate::tui::event::{TuiEvent, poll_event_immediate, poll_event_timeout};

const ANIMATION_TICK: Duration = Duration::from_millis(80);
const IDLE_TICK: Duration = Duration::from_millis(500);
/// Capacity of the backend → forwarder chunk channel.
const CHUNK_BUFFER: usize = 100;

/// TUI-specific presentation state (not part of core business logic)
pub struct TuiState {
    pub transcript_view: TranscriptViewState,
    pub input_box: InputBox,
}

impl Default for TuiState {
    fn default() -> Self {
        Self::new()
    }
}

impl TuiState {
    pub fn new() -> Self {
        Self {
            transcript_view: TranscriptViewState::new(),
            input_box: InputBox::new(),
        }
    }
}

struct TerminalModeGuard;

impl TerminalModeGuard {
    fn new() -> std::io::Result<Self> {
        // Kitty keyboard protocol lets Shift+Enter be told apart from Enter.
        // Terminals without it ignore the sequence; Ctrl+J still inserts a newline.
        execute!(
            stdout(),
            EnableMouseCapture,
            EnableBracketedPaste,
            Show,
            SetCursorStyle::SteadyBlock,
            PushKeyboardEnhancementFlags(
                KeyboardEnhancementFlags::DISAMBIGUATE_ESCAPE_CODES
                    | KeyboardEnhancementFlags::REPORT_EVENT_TYPES
            )
        )?;
        info!("Terminal modes enabled (mouse, bracketed paste, keyboard enhancement)");
        Ok(Self)
    }
}

impl Drop for TerminalModeGuard {
    fn drop(&mut self) {
        let _ = execute!(
            stdout(),
            PopKeyboardEnhancementFlags,
            DisableMouseCapture,
            DisableBracketedPaste
        );
    }
}

pub fn run(config: ResolvedConfig) -> std::io::Result<()> {
    let backend: Arc<dyn AskBackend> =
        match HttpAskClient::new(config.endpoint_url(), config.request_timeout) {
            Ok(client) => Arc::new(client),
            Err(e) => {
                warn!("Could not build HTTP client: {}", e);
                return Err(std::io::Error::other(e.to_string()));
            }
        };
    info!("Asking {}", backend.endpoint());

    let mut app = App::from_config(&config);
    let mut tui = TuiState::new();

    let mut terminal = ratatui::init();
    let _terminal_mode_guard = TerminalModeGuard::new();

    // Channel for actions from background tasks
    let (tx, rx) = mpsc::channel();

    // Abort handle for the in-flight request (used by Escape-to-cancel)
    let mut active_request: Option<tokio::task::AbortHandle> = None;

    let start_time = Instant::now();
    let mut needs_redraw = true;

    loop {
        let now = Instant::now();
        if app.banner.expire(now) {
            debug!("Error banner hidden");
            needs_redraw = true;
        }

        let animating = app.is_loading();
        if animating {
            needs_redraw = true;
        }

        if needs_redraw {
            let spinner_frame = (start_time.elapsed().as_secs_f32() * 4.0) as usize;
            terminal.draw(|f| ui::draw_ui(f, &app, &mut tui, now, spinner_frame))?;
            needs_redraw = false;
        }

        // Wake up in time to hide the banner even if nothing else happens
        let mut timeout = if animating { ANIMATION_TICK } else { IDLE_TICK };
        if let Some(remaining) = app.banner.remaining(now) {
            timeout = timeout.min(remaining);
        }
        let first_event = poll_event_timeout(timeout);

        let mut should_quit = false;
        if first_event.is_some() {
            needs_redraw = true;
        }
        for event in first_event
            .into_iter()
            .chain(std::iter::from_fn(poll_event_immediate))
        {
            match event {
                TuiEvent::Resize => {}
                TuiEvent::ForceQuit => {
                    should_quit = update(&mut app, Action::Quit) == Effect::Quit;
                }
                TuiEvent::ScrollUp
                | TuiEvent::ScrollDown
                | TuiEvent::ScrollPageUp
                | TuiEvent::ScrollPageDown => {
                    tui.transcript_view.handle_event(&event);
                }
                TuiEvent::Escape => {
                    if let Some(handle) = active_request.take() {
                        handle.abort();
                    }
                    let effect = update(&mut app, Action::Cancel);
                    apply_effect(effect, &mut tui, &backend, &tx, &mut active_request);
                }
                TuiEvent::NextExample => {
                    let effect = update(&mut app, Action::NextExample);
                    apply_effect(effect, &mut tui, &backend, &tx, &mut active_request);
                }
                _ => {
                    if let Some(InputEvent::Submit(text)) = tui.input_box.handle_event(&event) {
                        let effect = update(&mut app, Action::Submit(text));
                        apply_effect(effect, &mut tui, &backend, &tx, &mut active_request);
                    }
                }
            }
        }

        if should_quit {
            break;
        }

        // Handle background task actions (streaming responses)
        while let Ok(action) = rx.try_recv() {
            needs_redraw = true;
            debug!("Event loop received: {:?}", action);
            let effect = update(&mut app, action);
            apply_effect(effect, &mut tui, &backend, &tx, &mut active_request);
        }
    }

    if let Some(handle) = active_request.take() {
        handle.abort();
    }
    ratatui::restore();
    Ok(())
}

/// Perform the I/O an `update()` asked for.
fn apply_effect(
    effect: Effect,
    tui: &mut TuiState,
    backend: &Arc<dyn AskBackend>,
    tx: &mpsc::Sender<Action>,
    active_request: &mut Option<tokio::task::AbortHandle>,
) {
    match effect {
        Effect::SpawnRequest { cycle, query } => {
            // The text is now in the transcript; the field starts fresh
            tui.input_box.clear();
            tui.transcript_view.pin_to_bottom();
            *active_request = Some(spawn_request(backend.clone(), cycle, query, tx.clone()));
        }
        Effect::RestoreInput => {
            *active_request = None;
            tui.input_box.disabled = false;
        }
        Effect::FillInput(text) => tui.input_box.set_text(&text),
        // New content always brings the view back down, even after scrolling up
        Effect::ScrollToBottom => tui.transcript_view.pin_to_bottom(),
        Effect::None | Effect::Quit => {}
    }
}

fn spawn_request(
    backend: Arc<dyn AskBackend>,
    cycle: CycleId,
    query: String,
    tx: mpsc::Sender<Action>,
) -> tokio::task::AbortHandle {
    info!("Spawning request {} to {}", cycle, backend.endpoint());
    tokio::spawn(run_cycle(backend, cycle, query, tx)).abort_handle()
}

/// Drive one request cycle to completion, reporting through `tx`.
///
/// Every chunk is forwarded before the single terminal action is sent.
/// All of them are tagged with `cycle`.
pub async fn run_cycle(
    backend: Arc<dyn AskBackend>,
    cycle: CycleId,
    query: String,
    tx: mpsc::Sender<Action>,
) {
    let (chunk_tx, mut chunk_rx) = tokio::sync::mpsc::channel::<String>(CHUNK_BUFFER);
    let request_start = Instant::now();

    let forward_tx = tx.clone();
    let forward = async move {
        let mut forwarded = 0usize;
        let mut total_len = 0usize;
        let mut first_chunk: Option<Duration> = None;
        while let Some(text) = chunk_rx.recv().await {
            if first_chunk.is_none() {
                first_chunk = Some(request_start.elapsed());
            }
            forwarded += 1;
            total_len += text.len();
            if forward_tx
                .send(Action::ResponseChunk { cycle, text })
                .is_err()
            {
                warn!("Failed to forward chunk: receiver dropped");
                break;
            }
        }
        (forwarded, total_len, first_chunk)
    };

    let (result, (forwarded, total_len, first_chunk)) =
        tokio::join!(backend.ask(&query, chunk_tx), forward);

    info!(
        "Request {} finished after {}ms: {} chunks, {} bytes, first chunk at {:?}",
        cycle,
        request_start.elapsed().as_millis(),
        forwarded,
        total_len,
        first_chunk
    );

    let at = Instant::now();
    let action = match result {
        Ok(()) => Action::ResponseDone { cycle },
        Err(AskError::SessionExpired { redirect, message }) => Action::SessionExpired {
            cycle,
            redirect,
            message,
            at,
        },
        Err(e) => Action::RequestFailed {
            cycle,
            reason: e.to_string(),
            at,
        },
    };
    if tx.send(action).is_err() {
        warn!("Failed to send cycle result: receiver dropped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::transcript::{BotState, Bubble, CANCELLED_TEXT};
    use crate::test_support::{ScriptedBackend, test_app};

    fn scripted(chunks: &[&str], result: Result<(), AskError>) -> Arc<dyn AskBackend> {
        Arc::new(ScriptedBackend {
            chunks: chunks.iter().map(|c| c.to_string()).collect(),
            result,
        })
    }

    fn collect(rx: mpsc::Receiver<Action>) -> Vec<Action> {
        rx.try_iter().collect()
    }

    fn chunk(cycle: CycleId, text: &str) -> Action {
        Action::ResponseChunk {
            cycle,
            text: text.to_string(),
        }
    }

    fn bot_at(app: &App, index: usize) -> &crate::core::transcript::BotBubble {
        match app.transcript.bubbles().get(index) {
            Some(Bubble::Bot(bot)) => bot,
            other => panic!("Expected bot bubble, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_run_cycle_forwards_chunks_then_done() {
        let (tx, rx) = mpsc::channel();
        run_cycle(scripted(&["Hel", "lo"], Ok(())), 7, "q".to_string(), tx).await;
        assert_eq!(
            collect(rx),
            vec![
                chunk(7, "Hel"),
                chunk(7, "lo"),
                Action::ResponseDone { cycle: 7 },
            ]
        );
    }

    #[tokio::test]
    async fn test_run_cycle_maps_http_error() {
        let (tx, rx) = mpsc::channel();
        let before = Instant::now();
        run_cycle(
            scripted(&[], Err(AskError::Http { status: 500 })),
            3,
            "q".to_string(),
            tx,
        )
        .await;
        let actions = collect(rx);
        assert_eq!(actions.len(), 1);
        match &actions[0] {
            Action::RequestFailed { cycle, reason, at } => {
                assert_eq!(*cycle, 3);
                assert_eq!(reason, "HTTP error! status: 500");
                assert!(*at >= before);
            }
            other => panic!("Expected RequestFailed, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_run_cycle_maps_session_expired() {
        let (tx, rx) = mpsc::channel();
        let err = AskError::SessionExpired {
            redirect: "http://test/login".to_string(),
            message: Some("Session expired".to_string()),
        };
        run_cycle(scripted(&[], Err(err)), 2, "q".to_string(), tx).await;
        let actions = collect(rx);
        assert_eq!(actions.len(), 1);
        match &actions[0] {
            Action::SessionExpired {
                cycle,
                redirect,
                message,
                ..
            } => {
                assert_eq!(*cycle, 2);
                assert_eq!(redirect, "http://test/login");
                assert_eq!(message.as_deref(), Some("Session expired"));
            }
            other => panic!("Expected SessionExpired, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_partial_stream_then_network_error() {
        let (tx, rx) = mpsc::channel();
        run_cycle(
            scripted(&["partial"], Err(AskError::Network("reset".to_string()))),
            1,
            "q".to_string(),
            tx,
        )
        .await;
        let actions = collect(rx);
        assert_eq!(actions[0], chunk(1, "partial"));
        assert!(matches!(actions[1], Action::RequestFailed { cycle: 1, .. }));
    }

    /// Full cycle through the core: the transcript ends with the deduplicated
    /// answer and the input is usable again.
    #[tokio::test]
    async fn test_cycle_actions_drive_core_to_idle() {
        let mut app = test_app();
        let mut tui = TuiState::new();
        let backend = scripted(&["Hel", "lo", "lo", " world", "[DONE]"], Ok(()));
        let (tx, rx) = mpsc::channel();
        let mut active = None;

        tui.input_box.set_text("hi");
        let Effect::SpawnRequest { cycle, query } =
            update(&mut app, Action::Submit("hi".to_string()))
        else {
            panic!("Expected SpawnRequest");
        };
        assert_eq!(query, "hi");
        tui.input_box.clear();

        run_cycle(backend.clone(), cycle, query, tx.clone()).await;
        for action in rx.try_iter() {
            let effect = update(&mut app, action);
            apply_effect(effect, &mut tui, &backend, &tx, &mut active);
        }

        assert!(app.input_enabled());
        assert!(!tui.input_box.disabled);
        assert_eq!(bot_at(&app, 1).content, "Hello world");
    }

    /// A cancelled request may have queued output before the abort landed.
    /// None of it may reach the next submission.
    #[tokio::test]
    async fn test_cancelled_cycle_output_skips_next_cycle() {
        let mut app = test_app();
        let backend = scripted(&["OLD answer"], Ok(()));
        let (tx, rx) = mpsc::channel();

        let Effect::SpawnRequest { cycle: first, query } =
            update(&mut app, Action::Submit("q1".to_string()))
        else {
            panic!("Expected SpawnRequest");
        };
        run_cycle(backend, first, query, tx).await;

        assert_eq!(update(&mut app, Action::Cancel), Effect::RestoreInput);
        let Effect::SpawnRequest { cycle: second, .. } =
            update(&mut app, Action::Submit("q2".to_string()))
        else {
            panic!("Expected SpawnRequest");
        };
        assert_ne!(first, second);

        for action in rx.try_iter() {
            assert_eq!(update(&mut app, action), Effect::None);
        }

        assert_eq!(bot_at(&app, 1).state, BotState::Failed(CANCELLED_TEXT.to_string()));
        assert!(bot_at(&app, 3).is_pending());
        assert!(!app.input_enabled());
        assert_eq!(app.cycle.id(), Some(second));
    }

    #[test]
    fn test_scroll_to_bottom_repins_after_scrolling_up() {
        let mut tui = TuiState::new();
        let backend = scripted(&[], Ok(()));
        let (tx, _rx) = mpsc::channel();
        let mut active = None;

        tui.transcript_view.stick_to_bottom = false;
        apply_effect(Effect::ScrollToBottom, &mut tui, &backend, &tx, &mut active);
        assert!(tui.transcript_view.stick_to_bottom);
        assert!(!tui.transcript_view.has_unseen_content());
    }

    #[test]
    fn test_apply_effect_fill_input() {
        let mut tui = TuiState::new();
        let backend = scripted(&[], Ok(()));
        let (tx, _rx) = mpsc::channel();
        let mut active = None;
        apply_effect(
            Effect::FillInput("example".to_string()),
            &mut tui,
            &backend,
            &tx,
            &mut active,
        );
        assert_eq!(tui.input_box.buffer, "example");
    }

    #[test]
    fn test_whitespace_submit_keeps_input() {
        let mut app = test_app();
        let mut tui = TuiState::new();
        let backend = scripted(&[], Ok(()));
        let (tx, _rx) = mpsc::channel();
        let mut active = None;

        tui.input_box.set_text("   ");
        if let Some(InputEvent::Submit(text)) = tui.input_box.handle_event(&TuiEvent::Submit) {
            let effect = update(&mut app, Action::Submit(text));
            apply_effect(effect, &mut tui, &backend, &tx, &mut active);
        }
        assert_eq!(tui.input_box.buffer, "   ");
        assert!(active.is_none());
    }
}
