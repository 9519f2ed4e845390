//! Per-cycle streaming accumulator.
//!
//! Holds the cumulative buffer the bot bubble is rendered from, plus the last
//! accepted chunk. Only an exact repeat of the *immediately preceding* chunk
//! is suppressed; the buffer itself may contain repeated substrings.

/// Sentinel some servers send as a final event. Never rendered.
pub const DONE_SENTINEL: &str = "[DONE]";

/// What the accumulator did with a chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChunkOutcome {
    /// Empty chunk or the `[DONE]` sentinel.
    Ignored,
    /// Byte-identical to the previous accepted chunk.
    Duplicate,
    /// Appended; the bubble must be re-rendered from `buffer()`.
    Appended,
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct StreamAccumulator {
    buffer: String,
    last_chunk: Option<String>,
}

impl StreamAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn accept(&mut self, chunk: &str) -> ChunkOutcome {
        if chunk.is_empty() || chunk == DONE_SENTINEL {
            return ChunkOutcome::Ignored;
        }
        if self.last_chunk.as_deref() == Some(chunk) {
            return ChunkOutcome::Duplicate;
        }
        self.buffer.push_str(chunk);
        self.last_chunk = Some(chunk.to_string());
        ChunkOutcome::Appended
    }

    pub fn buffer(&self) -> &str {
        &self.buffer
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_adjacent_repeat_is_dropped() {
        let mut acc = StreamAccumulator::new();
        let outcomes: Vec<ChunkOutcome> = ["Hel", "lo", "lo", " world"]
            .iter()
            .map(|c| acc.accept(c))
            .collect();
        assert_eq!(
            outcomes,
            vec![
                ChunkOutcome::Appended,
                ChunkOutcome::Appended,
                ChunkOutcome::Duplicate,
                ChunkOutcome::Appended,
            ]
        );
        assert_eq!(acc.buffer(), "Hello world");
    }

    #[test]
    fn test_non_adjacent_repeat_is_kept() {
        let mut acc = StreamAccumulator::new();
        for chunk in ["ha", "!", "ha"] {
            acc.accept(chunk);
        }
        assert_eq!(acc.buffer(), "ha!ha");
    }

    #[test]
    fn test_sentinel_and_empty_ignored() {
        let mut acc = StreamAccumulator::new();
        assert_eq!(acc.accept(""), ChunkOutcome::Ignored);
        assert_eq!(acc.accept("x"), ChunkOutcome::Appended);
        assert_eq!(acc.accept(DONE_SENTINEL), ChunkOutcome::Ignored);
        // Ignored chunks don't reset the duplicate check
        assert_eq!(acc.accept("x"), ChunkOutcome::Duplicate);
        assert_eq!(acc.buffer(), "x");
    }

    #[test]
    fn test_sentinel_inside_text_is_not_special() {
        let mut acc = StreamAccumulator::new();
        assert_eq!(acc.accept("[DONE] soon"), ChunkOutcome::Appended);
    }
}
