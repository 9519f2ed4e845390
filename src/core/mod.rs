//! # Core Application Logic
//!
//! This module contains askterm's business logic: the chat session
//! controller. It knows nothing about terminals or HTTP.
//!
//! ```text
//!                    ┌─────────────────────────┐
//!                    │         CORE            │
//!                    │  (this module)          │
//!                    │                         │
//!                    │  • State (app data)     │
//!                    │  • Action (events)      │
//!                    │  • update() (reducer)   │
//!                    │                         │
//!                    │  No I/O. No UI. Pure.   │
//!                    └───────────┬─────────────┘
//!                                │
//!                   ┌────────────┴────────────┐
//!                   ▼                         ▼
//!            ┌────────────┐            ┌────────────┐
//!            │    TUI     │            │   client   │
//!            │  Adapter   │            │ (reqwest)  │
//!            │ (ratatui)  │            │            │
//!            └────────────┘            └────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`state`]: The `App` struct and the request `Cycle`
//! - [`action`]: The `Action` enum and the `update()` reducer
//! - [`transcript`]: User and bot bubbles
//! - [`accumulator`]: Per-cycle buffer with repeat suppression
//! - [`banner`]: Auto-hiding error banner
//! - [`config`]: Config file, env and CLI resolution

pub mod accumulator;
pub mod action;
pub mod banner;
pub mod config;
pub mod state;
pub mod transcript;
