//! Completeness classification for a text snapshot.
//!
//! A small set of named heuristic predicates, each yielding a reason
//! code, combined with logical OR: any firing signal means Incomplete.
//! The bias is deliberate — a false "incomplete" costs one extra
//! round-trip, a false "complete" silently corrupts output. None of this
//! is a parser; the checks are generic delimiter/keyword heuristics over
//! opaque text.

use crate::domain::models::Verdict;
use crate::services::text::word_count;

/// Punctuation that marks a statement cut off mid-flight.
pub const CONTINUATION_MARKS: [char; 5] = ['{', ':', '(', ',', ';'];

/// Keywords that open a structural declaration.
const DECLARATION_KEYWORDS: [&str; 3] = ["class", "public", "private"];

/// Words that cannot legally end a finished statement or sentence.
const DANGLING_KEYWORDS: [&str; 16] = [
    "return", "new", "else", "case", "throw", "and", "or", "but", "the", "a", "an", "in", "on",
    "at", "to", "for",
];

/// Reason codes for an Incomplete verdict, in evaluation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IncompletenessReason {
    /// Word count at or above the near-limit threshold.
    NearTokenLimit,
    /// Right-trimmed text ends in continuation punctuation.
    TrailingContinuationMark,
    /// Open/close block counts differ, or blocks remain open across chunks.
    UnbalancedBlocks,
    /// A declaration keyword appears but no block closer does.
    DanglingDeclaration,
    /// The text ends on a word that cannot finish a statement.
    TrailingKeyword,
}

impl IncompletenessReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NearTokenLimit => "near_token_limit",
            Self::TrailingContinuationMark => "trailing_continuation_mark",
            Self::UnbalancedBlocks => "unbalanced_blocks",
            Self::DanglingDeclaration => "dangling_declaration",
            Self::TrailingKeyword => "trailing_keyword",
        }
    }
}

/// Classifier configuration.
#[derive(Debug, Clone)]
pub struct ClassifierConfig {
    /// Word count treated as "near the token limit".
    pub near_limit_words: usize,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            near_limit_words: 900,
        }
    }
}

/// Pure predicate over a text snapshot plus the cross-chunk block depth.
#[derive(Debug, Clone, Default)]
pub struct CompletenessClassifier {
    config: ClassifierConfig,
}

impl CompletenessClassifier {
    pub fn new(config: ClassifierConfig) -> Self {
        Self { config }
    }

    /// Classify a snapshot. Deterministic, no side effects.
    pub fn classify(&self, text: &str, open_depth: usize) -> Verdict {
        if self.reasons(text, open_depth).is_empty() {
            Verdict::Complete
        } else {
            Verdict::Incomplete
        }
    }

    /// All incompleteness reasons that fire for this snapshot, in order.
    pub fn reasons(&self, text: &str, open_depth: usize) -> Vec<IncompletenessReason> {
        let mut reasons = Vec::new();

        if word_count(text) >= self.config.near_limit_words {
            reasons.push(IncompletenessReason::NearTokenLimit);
        }

        if ends_with_continuation_mark(text) {
            reasons.push(IncompletenessReason::TrailingContinuationMark);
        }

        let opens = text.matches('{').count();
        let closes = text.matches('}').count();
        if open_depth > 0 || opens != closes {
            reasons.push(IncompletenessReason::UnbalancedBlocks);
        }

        if has_dangling_declaration(text) {
            reasons.push(IncompletenessReason::DanglingDeclaration);
        }

        if ends_with_dangling_keyword(text) {
            reasons.push(IncompletenessReason::TrailingKeyword);
        }

        reasons
    }
}

/// True when the last whitespace-split word is a dangling keyword.
fn ends_with_dangling_keyword(text: &str) -> bool {
    text.split_whitespace()
        .next_back()
        .is_some_and(|word| DANGLING_KEYWORDS.contains(&word.to_lowercase().as_str()))
}

/// True when the right-trimmed text ends in `{ : ( ,` or `;`.
fn ends_with_continuation_mark(text: &str) -> bool {
    text.trim_end()
        .chars()
        .next_back()
        .is_some_and(|c| CONTINUATION_MARKS.contains(&c))
}

/// True when a declaration keyword occurs while no `}` occurs anywhere.
fn has_dangling_declaration(text: &str) -> bool {
    if text.contains('}') {
        return false;
    }
    let lowered = text.to_lowercase();
    DECLARATION_KEYWORDS.iter().any(|kw| lowered.contains(kw))
}
