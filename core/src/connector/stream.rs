//! Streaming response events and aggregation

/// An item of the streamed agent response
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AgentEvent {
    /// A text increment, delivered in arrival order
    Chunk(String),
    /// Terminal item, emitted exactly once after the last chunk
    Complete {
        /// Concatenation of every chunk
        text: String,
    },
}

/// Accumulates incrementally delivered text into the running full response
#[derive(Debug, Default)]
pub struct StreamAggregator {
    buffer: String,
    chunks: usize,
}

impl StreamAggregator {
    /// Create an empty aggregator
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one increment
    pub fn push(&mut self, chunk: &str) {
        self.buffer.push_str(chunk);
        self.chunks += 1;
    }

    /// Number of increments received so far
    pub fn chunk_count(&self) -> usize {
        self.chunks
    }

    /// The running full text
    pub fn text(&self) -> &str {
        &self.buffer
    }

    /// Consume the aggregator, yielding the full assembly
    pub fn finish(self) -> String {
        self.buffer
    }
}
