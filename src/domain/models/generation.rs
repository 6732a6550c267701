//! Core types for a single generation session.
//!
//! Everything here is scoped to one top-level generation call. Nothing
//! survives across independent requests and there is no shared state.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A request for one complete artifact from the generation backend.
///
/// Created once per caller action and never mutated afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationRequest {
    /// The full prompt for the initial backend call. Also re-used verbatim
    /// for fallback calls when a continuation is rejected or fails.
    pub base_prompt: String,

    /// Backend model identifier (e.g. "gpt-4o").
    pub model: String,
}

impl GenerationRequest {
    pub fn new(base_prompt: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            base_prompt: base_prompt.into(),
            model: model.into(),
        }
    }
}

/// One unit of text returned by a single backend call.
#[derive(Debug, Clone)]
pub struct Chunk {
    pub text: String,
    /// Position of this chunk in the session (0 = initial response).
    pub sequence: u32,
}

/// The single source of truth for what has been produced so far.
///
/// Invariant: the text never shrinks. Every accepted merge replaces it
/// with a string that starts with the previous text verbatim.
#[derive(Debug, Default, Clone)]
pub struct AccumulatedResponse {
    text: String,
}

impl AccumulatedResponse {
    pub fn new(initial: String) -> Self {
        Self { text: initial }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn len(&self) -> usize {
        self.text.len()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Replace the accumulated text with a merged superset.
    ///
    /// Returns the newly appended suffix. Debug builds assert the
    /// superset invariant; release builds trust the merger.
    pub fn splice(&mut self, merged: String) -> &str {
        debug_assert!(
            merged.starts_with(&self.text),
            "splice must preserve accumulated text as a prefix"
        );
        let prefix_len = self.text.len();
        self.text = merged;
        &self.text[prefix_len..]
    }
}

/// The classifier's binary completeness judgment for a text snapshot.
///
/// Computed fresh on every evaluation; never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Complete,
    Incomplete,
}

/// Bookkeeping for the continuation loop of one request.
#[derive(Debug, Clone)]
pub struct RetryState {
    /// Continuation rounds spent so far.
    pub attempts: u32,
    /// Hard bound on continuation rounds.
    pub max_attempts: u32,
    /// Accumulated length at the end of the previous round; fuels the
    /// stagnation guard (no growth means stop spending calls).
    pub last_observed_len: usize,
    /// Sampling temperature, used only by the escalation policy.
    pub temperature: Option<f32>,
}

impl RetryState {
    pub fn new(max_attempts: u32) -> Self {
        Self {
            attempts: 0,
            max_attempts,
            last_observed_len: 0,
            temperature: None,
        }
    }

    pub fn exhausted(&self) -> bool {
        self.attempts >= self.max_attempts
    }
}

/// One prompt/response round-trip recorded by the orchestrator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Exchange {
    pub prompt: String,
    pub response: String,
    pub at: DateTime<Utc>,
}

/// Append-only log of prompt/response pairs for one session.
///
/// Continuation prompts are built from the accumulated text plus the
/// trailing-window rule, never from hidden backend state; the transcript
/// is what the orchestrator hands back to the backend as conversational
/// context.
#[derive(Debug, Default, Clone)]
pub struct Transcript {
    entries: Vec<Exchange>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, prompt: impl Into<String>, response: impl Into<String>) {
        self.entries.push(Exchange {
            prompt: prompt.into(),
            response: response.into(),
            at: Utc::now(),
        });
    }

    pub fn entries(&self) -> &[Exchange] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Final result of a generation session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Completion {
    /// Post-processed artifact text.
    pub text: String,
    /// Continuation rounds that were spent.
    pub attempts: u32,
    /// Approximate whitespace-split word count of the final text.
    pub word_count: usize,
    /// Whether the classifier judged the final text complete. False means
    /// the loop stopped on budget, stagnation, or rejected continuations
    /// and the text is best-effort.
    pub complete: bool,
}
