//! Transient error banner.
//!
//! One message at a time. Showing a new error overwrites the text and
//! restarts the hide deadline; nothing is queued.

use std::time::{Duration, Instant};

/// How long a banner stays visible after the last `show`.
pub const DEFAULT_BANNER_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Clone)]
pub struct ErrorBanner {
    message: Option<String>,
    hide_at: Option<Instant>,
    timeout: Duration,
}

impl Default for ErrorBanner {
    fn default() -> Self {
        Self::new(DEFAULT_BANNER_TIMEOUT)
    }
}

impl ErrorBanner {
    pub fn new(timeout: Duration) -> Self {
        Self {
            message: None,
            hide_at: None,
            timeout,
        }
    }

    pub fn show(&mut self, message: impl Into<String>, now: Instant) {
        self.message = Some(message.into());
        self.hide_at = Some(now + self.timeout);
    }

    pub fn is_visible(&self, now: Instant) -> bool {
        self.message.is_some() && self.hide_at.is_some_and(|t| now < t)
    }

    /// Text to display, if the banner is still up at `now`.
    pub fn message(&self, now: Instant) -> Option<&str> {
        if self.is_visible(now) {
            self.message.as_deref()
        } else {
            None
        }
    }

    /// Drop the message once its deadline has passed.
    /// Returns true if the banner was hidden by this call.
    pub fn expire(&mut self, now: Instant) -> bool {
        if self.message.is_some() && !self.is_visible(now) {
            self.message = None;
            self.hide_at = None;
            return true;
        }
        false
    }

    /// Time left until the banner hides, used to shorten the event poll.
    pub fn remaining(&self, now: Instant) -> Option<Duration> {
        self.message.as_ref()?;
        self.hide_at.map(|t| t.saturating_duration_since(now))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hidden_by_default() {
        let banner = ErrorBanner::default();
        assert!(!banner.is_visible(Instant::now()));
    }

    #[test]
    fn test_visible_until_deadline() {
        let t0 = Instant::now();
        let mut banner = ErrorBanner::default();
        banner.show("boom", t0);
        assert_eq!(banner.message(t0), Some("boom"));
        assert!(banner.is_visible(t0 + Duration::from_millis(4999)));
        assert!(!banner.is_visible(t0 + Duration::from_millis(5000)));
        assert!(banner.expire(t0 + Duration::from_millis(5000)));
        assert!(!banner.expire(t0 + Duration::from_millis(6000)));
    }

    #[test]
    fn test_new_error_overwrites_and_resets_timer() {
        let t0 = Instant::now();
        let mut banner = ErrorBanner::default();
        banner.show("first", t0);
        let t1 = t0 + Duration::from_secs(4);
        banner.show("second", t1);
        // Past the first deadline, still inside the second
        let t2 = t0 + Duration::from_secs(6);
        assert_eq!(banner.message(t2), Some("second"));
        assert!(!banner.expire(t2));
        assert!(banner.expire(t1 + Duration::from_secs(5)));
    }

    #[test]
    fn test_remaining() {
        let t0 = Instant::now();
        let mut banner = ErrorBanner::new(Duration::from_secs(2));
        assert_eq!(banner.remaining(t0), None);
        banner.show("x", t0);
        assert_eq!(
            banner.remaining(t0 + Duration::from_millis(500)),
            Some(Duration::from_millis(1500))
        );
    }
}
