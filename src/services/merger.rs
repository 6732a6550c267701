//! Overlap-based chunk merging with a continuation validity gate.
//!
//! Backends restating trailing context tend to repeat the last line or
//! two of the previous chunk. The merger searches a bounded trailing
//! window of the accumulated text for the longest suffix equal to a
//! prefix of the new chunk and drops the duplicated prefix before
//! concatenation. Nothing from the accumulated text is ever lost.

use crate::services::text::trailing_chars;

/// Merger configuration.
#[derive(Debug, Clone)]
pub struct MergerConfig {
    /// Trailing window (chars) searched for suffix/prefix overlap.
    pub overlap_window_chars: usize,
    /// Trimmed continuations shorter than this are rejected as noise.
    pub min_chunk_chars: usize,
    /// Minimum size (chars) of the trailing window scanned for duplicates.
    pub duplicate_window_floor_chars: usize,
}

impl Default for MergerConfig {
    fn default() -> Self {
        Self {
            overlap_window_chars: 100,
            min_chunk_chars: 10,
            duplicate_window_floor_chars: 200,
        }
    }
}

/// Why a candidate continuation was refused by the validity gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContinuationRejection {
    /// Trimmed chunk is below the noise floor.
    TooShort,
    /// Trimmed chunk already appears in the recent accumulated text.
    DuplicateOfRecent,
}

impl std::fmt::Display for ContinuationRejection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ContinuationRejection::TooShort => write!(f, "continuation too short"),
            ContinuationRejection::DuplicateOfRecent => {
                write!(f, "continuation duplicates recent output")
            }
        }
    }
}

/// Combines accumulated text and a new chunk without duplicated boundary
/// content and without ever dropping accumulated characters.
#[derive(Debug, Clone, Default)]
pub struct OverlapMerger {
    config: MergerConfig,
}

impl OverlapMerger {
    pub fn new(config: MergerConfig) -> Self {
        Self { config }
    }

    /// Gate a candidate continuation before merging.
    ///
    /// `last_chunk_len` is the length of the previously accepted chunk;
    /// the duplicate scan window is `max(2 × last_chunk_len, floor)`
    /// trailing chars of `base`. Substring containment here can
    /// false-positive on short generic tokens; that tolerance is
    /// intentional and matches the loop's graceful-degradation path.
    pub fn validate(
        &self,
        chunk: &str,
        base: &str,
        last_chunk_len: usize,
    ) -> Result<(), ContinuationRejection> {
        let trimmed = chunk.trim();
        if trimmed.len() < self.config.min_chunk_chars {
            return Err(ContinuationRejection::TooShort);
        }

        let window_chars = (last_chunk_len * 2).max(self.config.duplicate_window_floor_chars);
        if trailing_chars(base, window_chars).contains(trimmed) {
            return Err(ContinuationRejection::DuplicateOfRecent);
        }

        Ok(())
    }

    /// Merge a chunk into the accumulated text.
    ///
    /// The result always starts with `base` verbatim and is never shorter
    /// than `base`. No overlap falls back to newline-separated
    /// concatenation to avoid token collision at the seam.
    pub fn merge(&self, base: &str, chunk: &str) -> String {
        if base.is_empty() {
            return chunk.to_string();
        }
        if chunk.is_empty() {
            return base.to_string();
        }

        match self.find_overlap(base, chunk) {
            Some(overlap) => format!("{}{}", base, &chunk[overlap..]),
            None => format!("{base}\n{chunk}"),
        }
    }

    /// Longest suffix of `base` (within the window) equal to a prefix of
    /// `chunk`; returns its byte length. Candidates are checked from the
    /// window size down so the first match is the longest.
    fn find_overlap(&self, base: &str, chunk: &str) -> Option<usize> {
        let max_len = self
            .config
            .overlap_window_chars
            .min(base.len())
            .min(chunk.len());

        for len in (1..=max_len).rev() {
            let split = base.len() - len;
            if !base.is_char_boundary(split) || !chunk.is_char_boundary(len) {
                continue;
            }
            if base[split..] == chunk[..len] {
                return Some(len);
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn merger() -> OverlapMerger {
        OverlapMerger::default()
    }

    #[test]
    fn scenario_a_no_overlap_concatenates_with_newline() {
        let merged = merger().merge("public class Foo {", "int x; }");
        assert_eq!(merged, "public class Foo {\nint x; }");
    }

    #[test]
    fn overlap_prefix_is_dropped() {
        let base = "let total = items.iter()";
        let chunk = "items.iter().sum::<u32>();";
        let merged = merger().merge(base, chunk);
        assert_eq!(merged, "let total = items.iter().sum::<u32>();");
    }

    #[test]
    fn longest_overlap_wins() {
        // Both "ab" and "b" are candidate overlaps; the longer one applies.
        let merged = merger().merge("xxab", "abab");
        assert_eq!(merged, "xxabab");
    }

    #[test]
    fn merge_preserves_base_verbatim() {
        let base = "fn main() {\n    println!(\"hi\");";
        let chunk = "    println!(\"hi\");\n}";
        let merged = merger().merge(base, chunk);
        assert!(merged.starts_with(base));
        assert!(merged.len() >= base.len());
    }

    #[test]
    fn merge_into_empty_base() {
        assert_eq!(merger().merge("", "first chunk"), "first chunk");
    }

    #[test]
    fn merge_empty_chunk_is_identity() {
        assert_eq!(merger().merge("base", ""), "base");
    }

    #[test]
    fn merge_multibyte_overlap() {
        let merged = merger().merge("größe=", "größe=10");
        // Suffix "größe=" of base equals prefix of chunk.
        assert_eq!(merged, "größe=10");
    }

    #[test]
    fn gate_rejects_short_chunk() {
        let result = merger().validate("  ok  ", "some base text", 0);
        assert_eq!(result, Err(ContinuationRejection::TooShort));
    }

    #[test]
    fn gate_rejects_duplicate_of_trailing_window() {
        let base = format!("{}the final forty characters of the base.", "x".repeat(300));
        let chunk = "the final forty characters of the base.";
        let result = merger().validate(chunk, &base, 40);
        assert_eq!(result, Err(ContinuationRejection::DuplicateOfRecent));
    }

    #[test]
    fn gate_accepts_fresh_continuation() {
        let base = "earlier output that keeps going";
        let chunk = "something genuinely new arrives here";
        assert_eq!(merger().validate(chunk, base, base.len()), Ok(()));
    }

    #[test]
    fn gate_duplicate_window_is_bounded() {
        // The duplicated text sits outside the scan window, so the chunk
        // is accepted: only recent output counts as a duplicate.
        let repeated = "this exact sentence appeared long ago in the output";
        let base = format!("{}{}", repeated, "y".repeat(500));
        assert_eq!(merger().validate(repeated, &base, 0), Ok(()));
    }
}
