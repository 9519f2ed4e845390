//! # TUI Components
//!
//! All UI components for the terminal interface.
//!
//! ## Component Architecture
//!
//! ### Stateless Components (Props-Based Rendering)
//!
//! - `TitleBar`: Top status bar showing the server and cycle status
//! - `ErrorBannerView`: Transient red error line
//! - `LandingPage`: Shown before the first question
//! - `BubbleView`: A single chat bubble
//!
//! ### Stateful Components (Event-Driven)
//!
//! - `InputBox`: Message field with the send control
//! - `TranscriptView`: Scrollable bubble list with a render cache
//!
//! Components receive external data as props (struct fields), never by
//! reaching into `App`. The parent decides what to pass each frame.
//!
//! ```text
//! components/
//! ├── mod.rs
//! ├── title_bar.rs
//! ├── banner.rs
//! ├── landing.rs
//! ├── bubble.rs           (body text, height, widget)
//! ├── transcript_view.rs  (scrolling + layout cache)
//! └── input_box/
//! ```

mod title_bar;
pub use title_bar::TitleBar;

pub mod banner;
pub mod bubble;
pub mod input_box;
pub mod landing;
pub mod transcript_view;
pub use banner::ErrorBannerView;
pub use input_box::{InputBox, InputEvent};
pub use landing::LandingPage;
pub use transcript_view::{TranscriptView, TranscriptViewState};
