//! Open-block depth tracking across chunks.
//!
//! Counts `{`/`}` tokens generically; this is tolerance, not parsing.
//! A close token at depth zero is silently absorbed, so the depth is
//! never negative no matter how unbalanced the input.

/// Token that opens a structural block.
pub const BLOCK_OPEN: char = '{';

/// Token that closes a structural block.
pub const BLOCK_CLOSE: char = '}';

/// Synthetic closer emitted at finalization for each still-open block.
pub const CLOSING_TOKEN: &str = "    }";

/// Running count of currently-open structural blocks.
#[derive(Debug, Default, Clone)]
pub struct BlockDepthTracker {
    depth: usize,
}

impl BlockDepthTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current open-block depth. Always ≥ 0.
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Fold one chunk of text into the depth count.
    pub fn update(&mut self, chunk_text: &str) {
        for c in chunk_text.chars() {
            if c == BLOCK_OPEN {
                self.depth += 1;
            } else if c == BLOCK_CLOSE && self.depth > 0 {
                self.depth -= 1;
            }
        }
    }

    /// Synthetic closers for every still-open block, ready to append.
    ///
    /// Empty when nothing is open; otherwise a newline followed by one
    /// closing token per open block.
    pub fn closing_suffix(&self) -> String {
        if self.depth == 0 {
            return String::new();
        }
        let mut suffix = String::from("\n");
        for _ in 0..self.depth {
            suffix.push_str(CLOSING_TOKEN);
        }
        suffix
    }
}
