pub mod classifier;
pub mod depth;
pub mod escalation;
pub mod merger;
pub mod orchestrator;
pub mod postprocess;
pub mod prompt_builder;
pub mod text;

pub use classifier::{ClassifierConfig, CompletenessClassifier, IncompletenessReason};
pub use depth::BlockDepthTracker;
pub use escalation::EscalationOrchestrator;
pub use merger::{ContinuationRejection, MergerConfig, OverlapMerger};
pub use orchestrator::{GenerationError, RetryOrchestrator};
pub use prompt_builder::{ContinuationPromptBuilder, PromptBuilderConfig};
