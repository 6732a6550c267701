//! Bounded continuation loop for one generation session.
//!
//! Drives the backend until the classifier reports a complete response,
//! the attempt budget runs out, or forward progress stops. The loop owns
//! all retry discipline; the backend port stays a single-shot call.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::domain::models::config::EngineConfig;
use crate::domain::models::generation::{
    AccumulatedResponse, Chunk, Completion, GenerationRequest, RetryState, Transcript, Verdict,
};
use crate::domain::ports::{
    BackendError, CompletionRequest, GenerationBackend, NoProgress, ProgressObserver,
};
use crate::services::classifier::{ClassifierConfig, CompletenessClassifier};
use crate::services::depth::BlockDepthTracker;
use crate::services::merger::{MergerConfig, OverlapMerger};
use crate::services::postprocess;
use crate::services::prompt_builder::{ContinuationPromptBuilder, PromptBuilderConfig};
use crate::services::text::word_count;

/// Errors that end a session with no usable text.
#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    /// The backend failed and the single in-session recovery call failed
    /// too, so there is nothing to hand back.
    #[error("generation backend unavailable: {0}")]
    BackendUnavailable(#[source] BackendError),
}

/// Fixed-temperature continuation loop.
///
/// Each session makes at most `max_attempts` continuation calls plus the
/// initial call plus one recovery call, then settles on whatever has
/// accumulated. A session only fails outright when the backend is down
/// before any text exists.
pub struct RetryOrchestrator {
    backend: Arc<dyn GenerationBackend>,
    config: EngineConfig,
    classifier: CompletenessClassifier,
    merger: OverlapMerger,
    prompt_builder: ContinuationPromptBuilder,
}

impl RetryOrchestrator {
    pub fn new(backend: Arc<dyn GenerationBackend>, config: EngineConfig) -> Self {
        let classifier = CompletenessClassifier::new(ClassifierConfig {
            near_limit_words: config.near_limit_words,
        });
        let merger = OverlapMerger::new(MergerConfig {
            overlap_window_chars: config.overlap_window_chars,
            min_chunk_chars: config.min_chunk_chars,
            duplicate_window_floor_chars: config.duplicate_window_floor_chars,
        });
        let prompt_builder = ContinuationPromptBuilder::new(PromptBuilderConfig {
            context_window_chars: config.context_window_chars,
            escalation_threshold: config.prompt_escalation_threshold,
        });
        Self {
            backend,
            config,
            classifier,
            merger,
            prompt_builder,
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
        let mut state = RetryState::new(self.config.max_attempts);
        let mut tracker = BlockDepthTracker::new();

        // One recovery call per session, shared between backend failures
        // and rejected continuations. Keeps the call count bounded by
        // max_attempts + 2 no matter what the backend does.
        let mut recovery_spent = false;

        let initial = match self.call(request, &transcript, &request.base_prompt).await {
            Ok(text) => text,
            Err(error) => {
                warn!(%error, "initial call failed, retrying once with the base prompt");
                recovery_spent = true;
                self.call(request, &transcript, &request.base_prompt)
                    .await
                    .map_err(GenerationError::BackendUnavailable)?
            }
        };
        transcript.record(&request.base_prompt, &initial);
        let initial = Chunk {
            text: initial,
            sequence: 0,
        };
        tracker.update(&initial.text);
        let mut last_chunk_len = initial.text.len();
        let mut accumulated = AccumulatedResponse::new(initial.text);

        let mut verdict = self.classifier.classify(accumulated.text(), tracker.depth());

        while verdict == Verdict::Incomplete && !state.exhausted() {
            state.attempts += 1;
            state.last_observed_len = accumulated.len();
            observer.on_continuation(state.attempts, state.max_attempts);

            let reasons = self.classifier.reasons(accumulated.text(), tracker.depth());
            info!(
                attempt = state.attempts,
                max_attempts = state.max_attempts,
                open_blocks = tracker.depth(),
                ?reasons,
                "response incomplete, requesting continuation"
            );

            let prompt =
                self.prompt_builder
                    .build(accumulated.text(), tracker.depth(), state.attempts);

            let chunk = match self.call(request, &transcript, &prompt).await {
                Ok(text) => {
                    transcript.record(&prompt, &text);
                    text
                }
                Err(error) => {
                    if recovery_spent {
                        warn!(%error, "backend failed with no recovery budget left, keeping partial result");
                        break;
                    }
                    warn!(%error, "continuation call failed, falling back to the base prompt");
                    recovery_spent = true;
                    let text = self
                        .call(request, &transcript, &request.base_prompt)
                        .await
                        .map_err(GenerationError::BackendUnavailable)?;
                    transcript.record(&request.base_prompt, &text);
                    text
                }
            };

            let chunk = match self
                .merger
                .validate(&chunk, accumulated.text(), last_chunk_len)
            {
                Ok(()) => chunk,
                Err(rejection) => {
                    if recovery_spent {
                        warn!(%rejection, "continuation rejected with no recovery budget left, keeping partial result");
                        break;
                    }
                    warn!(%rejection, "continuation rejected, falling back to the base prompt");
                    recovery_spent = true;
                    let retry = match self.call(request, &transcript, &request.base_prompt).await {
                        Ok(text) => {
                            transcript.record(&request.base_prompt, &text);
                            text
                        }
                        Err(error) => {
                            warn!(%error, "fallback call failed, keeping partial result");
                            break;
                        }
                    };
                    match self
                        .merger
                        .validate(&retry, accumulated.text(), last_chunk_len)
                    {
                        Ok(()) => retry,
                        Err(rejection) => {
                            warn!(%rejection, "fallback continuation rejected, keeping partial result");
                            break;
                        }
                    }
                }
            };

            let chunk = Chunk {
                text: chunk,
                sequence: state.attempts,
            };
            last_chunk_len = chunk.text.len();
            let merged = self.merger.merge(accumulated.text(), &chunk.text);
            let appended_chars = {
                let appended = accumulated.splice(merged);
                tracker.update(appended);
                appended.len()
            };
            debug!(
                appended_chars,
                total_chars = accumulated.len(),
                open_blocks = tracker.depth(),
                "continuation merged"
            );

            if accumulated.len() == state.last_observed_len {
                warn!(
                    attempt = state.attempts,
                    "accumulated text stopped growing, stopping early"
                );
                break;
            }

            verdict = self.classifier.classify(accumulated.text(), tracker.depth());
        }

        let complete = verdict == Verdict::Complete;
        if !complete {
            warn!(
                attempts = state.attempts,
                "finalizing a response still judged incomplete"
            );
        }

        let text = postprocess::finalize(accumulated.text(), &tracker);
        let words = word_count(&text);
        info!(
            attempts = state.attempts,
            words,
            complete,
            exchanges = transcript.len(),
            "generation finished"
        );

        Ok(Completion {
            text,
            attempts: state.attempts,
            word_count: words,
            complete,
        })
    }

    async fn call(
        &self,
        request: &GenerationRequest,
        transcript: &Transcript,
        prompt: &str,
    ) -> Result<String, BackendError> {
        debug!(
            prompt_chars = prompt.len(),
            history = transcript.len(),
            "calling backend"
        );
        self.backend
            .complete(CompletionRequest {
                model: request.model.clone(),
                system: self.config.system_prompt.clone(),
                history: transcript.entries().to_vec(),
                prompt: prompt.to_string(),
                temperature: Some(self.config.temperature),
                max_tokens: self.config.max_tokens,
            })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    struct ScriptedBackend {
        responses: Mutex<Vec<Result<String, BackendError>>>,
        calls: AtomicUsize,
    }

    impl ScriptedBackend {
        fn new(responses: Vec<Result<String, BackendError>>) -> Self {
            let mut responses = responses;
            responses.reverse();
            Self {
                responses: Mutex::new(responses),
                calls: AtomicUsize::new(0),
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl GenerationBackend for ScriptedBackend {
        async fn complete(&self, _request: CompletionRequest) -> Result<String, BackendError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.responses
                .lock()
                .unwrap()
                .pop()
                .unwrap_or_else(|| Err(BackendError::Unknown("script exhausted".to_string())))
        }
    }

    fn orchestrator(backend: Arc<ScriptedBackend>) -> RetryOrchestrator {
        RetryOrchestrator::new(backend, EngineConfig::default())
    }

    fn request() -> GenerationRequest {
        GenerationRequest::new("write the module", "gpt-4o")
    }

    #[tokio::test]
    async fn complete_first_response_needs_no_continuation() {
        let backend = Arc::new(ScriptedBackend::new(vec![Ok(
            "Here is the module. It is short and finished.".to_string(),
        )]));
        let completion = orchestrator(backend.clone()).run(&request()).await.unwrap();
        assert!(completion.complete);
        assert_eq!(completion.attempts, 0);
        assert_eq!(backend.calls(), 1);
    }

    #[tokio::test]
    async fn truncated_response_is_continued_and_merged() {
        let backend = Arc::new(ScriptedBackend::new(vec![
            Ok("fn main() {".to_string()),
            Ok("    println!(\"hi\");\n}".to_string()),
        ]));
        let completion = orchestrator(backend.clone()).run(&request()).await.unwrap();
        assert!(completion.complete);
        assert_eq!(completion.attempts, 1);
        assert_eq!(backend.calls(), 2);
        assert_eq!(completion.text, "fn main() {\n    println!(\"hi\");\n}");
    }

    #[tokio::test]
    async fn attempt_budget_bounds_the_loop() {
        let backend = Arc::new(ScriptedBackend::new(vec![
            Ok("part zero of the output {".to_string()),
            Ok("part one of the output open(".to_string()),
            Ok("part two of the output also {".to_string()),
            Ok("part three of the output still {".to_string()),
        ]));
        let completion = orchestrator(backend.clone()).run(&request()).await.unwrap();
        assert!(!completion.complete);
        assert_eq!(completion.attempts, 3);
        assert_eq!(backend.calls(), 4);
    }

    #[tokio::test]
    async fn initial_failure_is_retried_once() {
        let backend = Arc::new(ScriptedBackend::new(vec![
            Err(BackendError::ServerError("boom".to_string())),
            Ok("Recovered cleanly on the second call.".to_string()),
        ]));
        let completion = orchestrator(backend.clone()).run(&request()).await.unwrap();
        assert!(completion.complete);
        assert_eq!(backend.calls(), 2);
    }

    #[tokio::test]
    async fn two_initial_failures_surface_an_error() {
        let backend = Arc::new(ScriptedBackend::new(vec![
            Err(BackendError::ServerError("boom".to_string())),
            Err(BackendError::Overloaded),
        ]));
        let result = orchestrator(backend.clone()).run(&request()).await;
        assert!(matches!(result, Err(GenerationError::BackendUnavailable(_))));
        assert_eq!(backend.calls(), 2);
    }

    #[tokio::test]
    async fn consecutive_mid_session_failures_are_fatal() {
        // Partial text exists, but a failed continuation followed by a
        // failed recovery call still surfaces as a hard error.
        let backend = Arc::new(ScriptedBackend::new(vec![
            Ok("start of something {".to_string()),
            Err(BackendError::ServerError("boom".to_string())),
            Err(BackendError::ServerError("still down".to_string())),
        ]));
        let result = orchestrator(backend.clone()).run(&request()).await;
        assert!(matches!(result, Err(GenerationError::BackendUnavailable(_))));
        assert_eq!(backend.calls(), 3);
    }

    #[tokio::test]
    async fn duplicate_continuations_finish_best_effort() {
        // The backend keeps echoing the tail of what it already said.
        let backend = Arc::new(ScriptedBackend::new(vec![
            Ok("let total = compute(".to_string()),
            Ok("let total = compute(".to_string()),
            Ok("let total = compute(".to_string()),
        ]));
        let completion = orchestrator(backend.clone()).run(&request()).await.unwrap();
        assert!(!completion.complete);
        assert_eq!(completion.attempts, 1);
        assert_eq!(backend.calls(), 3);
        assert_eq!(completion.text, "let total = compute(");
    }

    #[tokio::test]
    async fn short_noise_continuation_falls_back_to_base_prompt() {
        let backend = Arc::new(ScriptedBackend::new(vec![
            Ok("const VALUES = [1, 2,".to_string()),
            Ok("  ".to_string()),
            Ok("values continue: 3, 4, 5, 6]".to_string()),
        ]));
        let completion = orchestrator(backend.clone()).run(&request()).await.unwrap();
        assert!(completion.complete);
        assert_eq!(completion.attempts, 1);
        assert_eq!(backend.calls(), 3);
        assert!(completion.text.ends_with("3, 4, 5, 6]"));
    }
}
