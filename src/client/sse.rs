//! Server-Sent Events framing for the `/ask` response body.
//!
//! Decoded text is pushed in whatever pieces the transport delivers; the
//! framer emits one payload per complete event (blank-line terminated).
//!
//! ```text
//! data: Hello        ─┐
//! data: world         ├─→ "Hello\nworld"
//!                    ─┘
//! event: ping         ──→ (ignored, no data lines)
//!
//! data: [DONE]        ──→ "[DONE]"  (filtered later by the accumulator)
//! ```

#[derive(Debug, Default)]
pub struct SseFramer {
    /// Text after the last newline seen so far.
    line: String,
    /// `data:` lines of the event being assembled.
    data: Vec<String>,
}

impl SseFramer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed decoded text, returning the payloads of every event it completes.
    pub fn push(&mut self, text: &str) -> Vec<String> {
        let mut events = Vec::new();
        self.line.push_str(text);

        while let Some(pos) = self.line.find('\n') {
            let raw: String = self.line.drain(..=pos).collect();
            let line = raw.trim_end_matches('\n').trim_end_matches('\r');
            if let Some(event) = self.take_line(line) {
                events.push(event);
            }
        }
        events
    }

    /// End of body: flush an event that wasn't followed by a blank line.
    pub fn finish(&mut self) -> Option<String> {
        if !self.line.is_empty() {
            let line = std::mem::take(&mut self.line);
            let line = line.trim_end_matches('\r').to_string();
            if let Some(event) = self.take_line(&line) {
                return Some(event);
            }
        }
        self.dispatch()
    }

    fn take_line(&mut self, line: &str) -> Option<String> {
        if line.is_empty() {
            return self.dispatch();
        }
        if line.starts_with(':') {
            return None; // comment / keep-alive
        }
        let (field, value) = match line.split_once(':') {
            Some((field, value)) => (field, value.strip_prefix(' ').unwrap_or(value)),
            None => (line, ""),
        };
        if field == "data" {
            self.data.push(value.to_string());
        }
        // event:, id:, retry: carry nothing we render
        None
    }

    fn dispatch(&mut self) -> Option<String> {
        if self.data.is_empty() {
            return None;
        }
        let payload = self.data.join("\n");
        self.data.clear();
        Some(payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_event() {
        let mut f = SseFramer::new();
        assert_eq!(f.push("data: Hello\n\n"), vec!["Hello"]);
    }

    #[test]
    fn test_event_split_across_pushes() {
        let mut f = SseFramer::new();
        assert!(f.push("da").is_empty());
        assert!(f.push("ta: Hel").is_empty());
        assert!(f.push("lo\n").is_empty());
        assert_eq!(f.push("\ndata: x\n\n"), vec!["Hello", "x"]);
    }

    #[test]
    fn test_multiline_data_joined_with_newline() {
        let mut f = SseFramer::new();
        let events = f.push("data: # Title\ndata:\ndata: - item\n\n");
        assert_eq!(events, vec!["# Title\n\n- item"]);
    }

    #[test]
    fn test_leading_spaces_beyond_first_are_kept() {
        let mut f = SseFramer::new();
        assert_eq!(f.push("data:  world\n\n"), vec![" world"]);
    }

    #[test]
    fn test_crlf_and_non_data_fields() {
        let mut f = SseFramer::new();
        let events = f.push(": keep-alive\r\nevent: delta\r\nid: 7\r\ndata: hi\r\n\r\n");
        assert_eq!(events, vec!["hi"]);
    }

    #[test]
    fn test_event_without_data_is_dropped() {
        let mut f = SseFramer::new();
        assert!(f.push("event: ping\n\n").is_empty());
    }

    #[test]
    fn test_finish_flushes_unterminated_event() {
        let mut f = SseFramer::new();
        assert!(f.push("data: tail").is_empty());
        assert_eq!(f.finish().as_deref(), Some("tail"));
        assert_eq!(f.finish(), None);
    }
}
