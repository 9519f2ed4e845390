//! # Ask client
//!
//! The HTTP half of a request cycle: post the query, classify the status,
//! then turn the streamed body into chunk payloads on a channel.
//!
//! ```text
//! bytes ─→ Utf8Decoder ─→ SseFramer ─→ Sender<String> ─→ (TUI) Action::ResponseChunk
//! ```

pub mod decoder;
pub mod sse;

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use futures::StreamExt;
use log::{debug, info, warn};
use reqwest::{StatusCode, Url};
use serde::Deserialize;
use tokio::sync::mpsc::Sender;

use crate::client::decoder::Utf8Decoder;
use crate::client::sse::SseFramer;

/// Form field the query travels in.
pub const QUERY_FIELD: &str = "query";

/// Errors that end a request cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AskError {
    /// Client could not be built (bad URL, TLS backend). Not retryable.
    Config(String),
    /// Connection failure or the body stream broke mid-read.
    Network(String),
    /// Any non-2xx status other than a well-formed 401.
    Http { status: u16 },
    /// 401 with a JSON payload naming where to log in again.
    SessionExpired {
        redirect: String,
        message: Option<String>,
    },
    /// The receiving side hung up (request was cancelled).
    ChannelClosed,
}

impl fmt::Display for AskError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AskError::Config(msg) => write!(f, "config error: {msg}"),
            AskError::Network(msg) => write!(f, "network error: {msg}"),
            AskError::Http { status } => write!(f, "HTTP error! status: {status}"),
            AskError::SessionExpired { redirect, .. } => {
                write!(f, "session expired, log in at {redirect}")
            }
            AskError::ChannelClosed => write!(f, "channel closed"),
        }
    }
}

impl std::error::Error for AskError {}

/// Body of a 401 response.
#[derive(Deserialize, Debug)]
struct SessionExpiredBody {
    redirect: String,
    error: Option<String>,
}

#[async_trait]
pub trait AskBackend: Send + Sync {
    /// Where queries go, for display.
    fn endpoint(&self) -> &str;

    /// Post `query` and send every decoded chunk, in arrival order.
    /// Returns once the body has been fully read.
    async fn ask(&self, query: &str, sender: Sender<String>) -> Result<(), AskError>;
}

/// Talks to the real `/ask` endpoint.
pub struct HttpAskClient {
    url: String,
    client: reqwest::Client,
}

impl HttpAskClient {
    pub fn new(url: String, timeout: Option<Duration>) -> Result<Self, AskError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| AskError::Config(e.to_string()))?;
        Ok(Self { url, client })
    }

    /// Make a relative redirect absolute against the endpoint URL.
    fn resolve_redirect(&self, redirect: &str) -> String {
        Url::parse(&self.url)
            .and_then(|base| base.join(redirect))
            .map(|u| u.to_string())
            .unwrap_or_else(|_| redirect.to_string())
    }
}

#[async_trait]
impl AskBackend for HttpAskClient {
    fn endpoint(&self) -> &str {
        &self.url
    }

    async fn ask(&self, query: &str, sender: Sender<String>) -> Result<(), AskError> {
        info!("POST {} (query {} bytes)", self.url, query.len());

        let response = self
            .client
            .post(&self.url)
            .form(&[(QUERY_FIELD, query)])
            .send()
            .await
            .map_err(|e| AskError::Network(e.to_string()))?;

        let status = response.status();
        debug!("Response status: {}", status);

        if status == StatusCode::UNAUTHORIZED {
            // The body is a small JSON object; it is never streamed
            let body = response
                .text()
                .await
                .map_err(|e| AskError::Network(e.to_string()))?;
            return match serde_json::from_str::<SessionExpiredBody>(&body) {
                Ok(payload) => Err(AskError::SessionExpired {
                    redirect: self.resolve_redirect(&payload.redirect),
                    message: payload.error,
                }),
                Err(e) => {
                    warn!("401 without a usable session payload ({}): {:?}", e, body);
                    Err(AskError::Http { status: 401 })
                }
            };
        }

        if !status.is_success() {
            warn!("Request rejected with HTTP {}", status.as_u16());
            return Err(AskError::Http {
                status: status.as_u16(),
            });
        }

        let mut decoder = Utf8Decoder::new();
        let mut framer = SseFramer::new();
        let mut stream = response.bytes_stream();
        let mut chunk_count = 0usize;
        let mut total_bytes = 0usize;

        while let Some(read) = stream.next().await {
            let bytes = read.map_err(|e| AskError::Network(e.to_string()))?;
            total_bytes += bytes.len();
            let text = decoder.decode(&bytes);
            debug!("Raw chunk: {} bytes, {:?}", bytes.len(), text);
            for event in framer.push(&text) {
                chunk_count += 1;
                sender.send(event).await.map_err(|_| AskError::ChannelClosed)?;
            }
        }

        // Flush a partial character and an unterminated final event
        let tail = decoder.finish();
        let mut rest = framer.push(&tail);
        rest.extend(framer.finish());
        for event in rest {
            chunk_count += 1;
            sender.send(event).await.map_err(|_| AskError::ChannelClosed)?;
        }

        info!(
            "Stream done: {} events, {} body bytes",
            chunk_count, total_bytes
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_relative_redirect() {
        let client = HttpAskClient::new("http://chat.local:5000/ask".to_string(), None).unwrap();
        assert_eq!(client.resolve_redirect("/login"), "http://chat.local:5000/login");
        assert_eq!(
            client.resolve_redirect("https://auth.example.com/sso"),
            "https://auth.example.com/sso"
        );
    }

    #[test]
    fn test_unparseable_base_keeps_redirect() {
        let client = HttpAskClient::new("not a url".to_string(), None).unwrap();
        assert_eq!(client.resolve_redirect("/login"), "/login");
    }

    #[test]
    fn test_http_error_display() {
        assert_eq!(
            AskError::Http { status: 500 }.to_string(),
            "HTTP error! status: 500"
        );
    }
}
