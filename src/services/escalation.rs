//! Temperature-escalation generation policy.
//!
//! Alternative to the fixed-temperature loop: every attempt opens a
//! fresh backend session, and each incomplete attempt raises the
//! sampling temperature by a fixed step up to a hard ceiling. The idea
//! is that a model stuck truncating at one temperature often finishes
//! cleanly at another.
//!
//! Completeness here is judged by [`is_complete_strict`], which requires
//! every signal to pass at once, unlike the main loop's classifier where
//! any single signal forces a continuation.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::domain::models::config::{EngineConfig, EscalationConfig};
use crate::domain::models::generation::{
    AccumulatedResponse, Completion, GenerationRequest, RetryState, Transcript,
};
use crate::domain::ports::{
    BackendError, CompletionRequest, GenerationBackend, NoProgress, ProgressObserver,
};
use crate::services::depth::BlockDepthTracker;
use crate::services::merger::{MergerConfig, OverlapMerger};
use crate::services::orchestrator::GenerationError;
use crate::services::postprocess;
use crate::services::text::{trailing_chars, word_count};

/// Words that cannot close a statement when they are the final token.
const STOPWORDS: [&str; 11] = [
    "and", "or", "but", "the", "a", "an", "in", "on", "at", "to", "for",
];

/// All-signals completeness predicate.
///
/// Returns false when the text ends in hanging punctuation, has
/// unbalanced braces or parentheses, or ends on a stopword. Text that
/// declares a class additionally has to close every block line and end
/// on a line containing a closing brace.
pub fn is_complete_strict(text: &str) -> bool {
    if text.trim().is_empty() {
        return false;
    }

    if text.trim_end().ends_with([':', ';', '{', '(', ',']) {
        return false;
    }
    if text.matches('{').count() != text.matches('}').count() {
        return false;
    }
    if text.matches('(').count() != text.matches(')').count() {
        return false;
    }
    if let Some(last_word) = text.split_whitespace().last() {
        if STOPWORDS.contains(&last_word.to_lowercase().as_str()) {
            return false;
        }
    }

    if text.contains("class ") {
        let lines: Vec<&str> = text.lines().collect();
        if lines
            .iter()
            .any(|line| line.trim_end().ends_with([':', '{']))
        {
            return false;
        }
        if !lines.last().is_some_and(|line| line.contains('}')) {
            return false;
        }
        if lines
            .iter()
            .any(|line| line.contains("class") && !line.contains('{'))
        {
            return false;
        }
    }

    true
}

/// Continuation loop that anneals temperature instead of prompts.
pub struct EscalationOrchestrator {
    backend: Arc<dyn GenerationBackend>,
    engine: EngineConfig,
    policy: EscalationConfig,
    merger: OverlapMerger,
}

impl EscalationOrchestrator {
    pub fn new(
        backend: Arc<dyn GenerationBackend>,
        engine: EngineConfig,
        policy: EscalationConfig,
    ) -> Self {
        let merger = OverlapMerger::new(MergerConfig {
            overlap_window_chars: engine.overlap_window_chars,
            min_chunk_chars: engine.min_chunk_chars,
            duplicate_window_floor_chars: engine.duplicate_window_floor_chars,
        });
        Self {
            backend,
            engine,
            policy,
            merger,
        }
    }

    pub async fn run(&self, request: &GenerationRequest) -> Result<Completion, GenerationError> {
        self.run_with_observer(request, &NoProgress).await
    }

    pub async fn run_with_observer(
        &self,
        request: &GenerationRequest,
        observer: &dyn ProgressObserver,
    ) -> Result<Completion, GenerationError> {
        let mut transcript = Transcript::new();
        let mut tracker = BlockDepthTracker::new();
        let mut accumulated = AccumulatedResponse::default();
        let mut state = RetryState::new(self.engine.max_attempts);
        state.temperature = Some(self.policy.initial_temperature);

        while !state.exhausted() {
            let temperature = state.temperature.unwrap_or(self.policy.initial_temperature);
            observer.on_continuation(state.attempts + 1, state.max_attempts);
            debug!(
                attempt = state.attempts + 1,
                temperature, "starting escalation attempt"
            );

            let prompt = if accumulated.is_empty() {
                request.base_prompt.clone()
            } else {
                self.continuation_prompt(accumulated.text(), &request.base_prompt)
            };

            let response = self
                .call(request, &prompt, temperature)
                .await
                .map_err(GenerationError::BackendUnavailable)?;
            transcript.record(&prompt, &response);

            let chunk_complete = is_complete_strict(&response);
            let merged = self.merger.merge(accumulated.text(), &response);
            let appended = accumulated.splice(merged);
            tracker.update(appended);
            state.last_observed_len = accumulated.len();

            if chunk_complete {
                break;
            }

            state.temperature = Some(self.policy.ceiling.min(temperature + self.policy.step));
            state.attempts += 1;
            info!(
                attempt = state.attempts,
                temperature = state.temperature,
                "attempt incomplete, escalating temperature"
            );
        }

        let complete = is_complete_strict(accumulated.text());
        if !complete {
            warn!(
                attempts = state.attempts,
                "response may still be incomplete after temperature escalation"
            );
        }

        let text = postprocess::finalize(accumulated.text(), &tracker);
        let words = word_count(&text);
        info!(
            attempts = state.attempts,
            words,
            complete,
            exchanges = transcript.len(),
            "escalated generation finished"
        );

        Ok(Completion {
            text,
            attempts: state.attempts,
            word_count: words,
            complete,
        })
    }

    fn continuation_prompt(&self, accumulated: &str, original: &str) -> String {
        let context = trailing_chars(accumulated, self.engine.context_window_chars);
        format!(
            "Previous response context:\n{context}\n\n\
             Original request:\n{original}\n\n\
             Please continue the response, maintaining consistency with the previous content.\n\
             Focus on completing any unfinished sections or thoughts."
        )
    }

    // Fresh session per attempt: no history is carried, so the trailing
    // context in the prompt is all the backend sees of earlier turns.
    async fn call(
        &self,
        request: &GenerationRequest,
        prompt: &str,
        temperature: f32,
    ) -> Result<String, BackendError> {
        self.backend
            .complete(CompletionRequest {
                model: request.model.clone(),
                system: self.engine.system_prompt.clone(),
                history: Vec::new(),
                prompt: prompt.to_string(),
                temperature: Some(temperature),
                max_tokens: self.engine.max_tokens,
            })
            .await
    }
}
