use std::time::Instant;

use ratatui::Frame;
use ratatui::layout::{Constraint, Layout};

use crate::core::state::App;
use crate::tui::TuiState;
use crate::tui::component::Component;
use crate::tui::components::{ErrorBannerView, LandingPage, TitleBar, TranscriptView};

/// Render one frame.
///
/// ```text
/// ┌ title bar ──────────────────────┐ 1
/// │ error banner (only when shown)  │ 0 | 1
/// │ transcript / landing page       │ rest
/// │ input box                       │ 3..7
/// └─────────────────────────────────┘
/// ```
pub fn draw_ui(
    frame: &mut Frame,
    app: &App,
    tui: &mut TuiState,
    now: Instant,
    spinner_frame: usize,
) {
    use Constraint::{Length, Min};

    // Props flow from core state every frame
    tui.input_box.disabled = !app.input_enabled();

    let banner_message = app.banner.message(now);
    let banner_height = u16::from(banner_message.is_some());
    let input_height = tui.input_box.calculate_height(frame.area().width);

    let [title_area, banner_area, main_area, input_area] = Layout::vertical([
        Length(1),
        Length(banner_height),
        Min(0),
        Length(input_height),
    ])
    .areas(frame.area());

    if app.transcript.is_empty() {
        LandingPage {
            endpoint: &app.server_label,
            examples: &app.examples,
        }
        .render(frame, main_area);
    } else {
        TranscriptView::new(
            &mut tui.transcript_view,
            &app.transcript,
            app.is_loading(),
            spinner_frame,
        )
        .render(frame, main_area);
    }

    TitleBar::new(
        app.server_label.clone(),
        app.status_message.clone(),
        tui.transcript_view.has_unseen_content(),
    )
    .render(frame, title_area);

    if let Some(message) = banner_message {
        ErrorBannerView { message }.render(frame, banner_area);
    }

    tui.input_box.render(frame, input_area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::action::{Action, update};
    use crate::test_support::test_app;
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;
    use std::time::Duration;

    fn draw(app: &App, tui: &mut TuiState, now: Instant) -> (String, Vec<String>) {
        let backend = TestBackend::new(60, 20);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal.draw(|f| draw_ui(f, app, tui, now, 0)).unwrap();
        let buffer = terminal.backend().buffer();
        let rows = (0..buffer.area.height)
            .map(|y| {
                (0..buffer.area.width)
                    .map(|x| buffer[(x, y)].symbol())
                    .collect::<String>()
            })
            .collect::<Vec<_>>();
        (rows.concat(), rows)
    }

    #[test]
    fn test_empty_app_shows_landing() {
        let app = test_app();
        let mut tui = TuiState::new();
        let (text, rows) = draw(&app, &mut tui, Instant::now());
        assert!(rows[0].contains("askterm (server: http://test/ask)"));
        assert!(text.contains("Shift+Enter"));
        assert!(text.contains("Message"));
    }

    #[test]
    fn test_pending_cycle_disables_input() {
        let mut app = test_app();
        update(&mut app, Action::Submit("hello".to_string()));
        let mut tui = TuiState::new();
        let (text, _) = draw(&app, &mut tui, Instant::now());
        assert!(tui.input_box.disabled);
        assert!(text.contains("hello"));
        assert!(text.contains("Thinking"));
        assert!(text.contains("Waiting for reply"));
    }

    #[test]
    fn test_banner_row_appears_and_expires() {
        let mut app = test_app();
        update(&mut app, Action::Submit("hello".to_string()));
        let cycle = app.cycle.id().unwrap();
        let now = Instant::now();
        update(
            &mut app,
            Action::RequestFailed {
                cycle,
                reason: "boom".to_string(),
                at: now,
            },
        );
        let mut tui = TuiState::new();

        let (_, rows) = draw(&app, &mut tui, now);
        assert!(rows[1].contains("An error occurred"));
        assert!(!tui.input_box.disabled);

        let later = now + Duration::from_secs(6);
        let (text, _) = draw(&app, &mut tui, later);
        assert!(!text.contains("An error occurred"));
    }
}
