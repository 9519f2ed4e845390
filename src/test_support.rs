//! Test utilities shared across the crate.
//!
//! This module is only compiled during tests (`#[cfg(test)]`).

use async_trait::async_trait;
use tokio::sync::mpsc::Sender;

use crate::client::{AskBackend, AskError};
use crate::core::state::App;

/// A backend that replays canned chunks, then returns `result`.
pub struct ScriptedBackend {
    pub chunks: Vec<String>,
    pub result: Result<(), AskError>,
}

#[async_trait]
impl AskBackend for ScriptedBackend {
    fn endpoint(&self) -> &str {
        "scripted"
    }

    async fn ask(&self, _query: &str, sender: Sender<String>) -> Result<(), AskError> {
        for chunk in &self.chunks {
            sender
                .send(chunk.clone())
                .await
                .map_err(|_| AskError::ChannelClosed)?;
        }
        self.result.clone()
    }
}

/// Creates a test App pointed at a dummy endpoint.
pub fn test_app() -> App {
    App::new("http://test/ask".to_string())
}
