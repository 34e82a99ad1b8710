use doclens_core::config::ChunkingConfig;
use doclens_core::ContentHandler;

/// Groups character events into chunks of at most `max_chars`.
///
/// A text event that would push the current chunk past the limit starts a
/// new chunk instead; a single oversized event is kept whole. The first
/// chunk starts out empty, so an empty document yields one empty chunk.
#[derive(Debug)]
pub struct ChunkingHandler {
    max_chars: usize,
    chunks: Vec<String>,
    last_len: usize,
}

impl ChunkingHandler {
    pub fn new(max_chars: usize) -> Self {
        Self {
            max_chars: max_chars.max(1),
            chunks: vec![String::new()],
            last_len: 0,
        }
    }

    pub fn from_config(config: &ChunkingConfig) -> Self {
        Self::new(config.max_chunk_chars)
    }

    pub fn chunks(&self) -> &[String] {
        &self.chunks
    }

    pub fn into_chunks(self) -> Vec<String> {
        self.chunks
    }
}

impl ContentHandler for ChunkingHandler {
    fn characters(&mut self, text: &str) {
        let len = text.chars().count();
        if self.last_len + len > self.max_chars {
            self.chunks.push(text.to_string());
            self.last_len = len;
        } else if let Some(last) = self.chunks.last_mut() {
            last.push_str(text);
            self.last_len += len;
        }
    }
}
