//! CodeMorph - Continuation & Completeness Engine
//!
//! CodeMorph turns a token-limited LLM backend into a source of complete
//! artifacts: it judges raw response text for truncation, synthesizes
//! continuation prompts, merges continuation chunks without duplicated
//! seams, and bounds the whole retry conversation.
//!
//! # Architecture
//!
//! This crate follows Clean Architecture / Hexagonal Architecture principles:
//!
//! - **Domain Layer** (`domain`): Pure models and port traits
//! - **Service Layer** (`services`): Classifier, merger, prompt synthesis and retry loops
//! - **Infrastructure Layer** (`infrastructure`): HTTP backend adapter, config, logging
//! - **CLI Layer** (`cli`): Command-line interface
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use codemorph::domain::models::{EngineConfig, GenerationRequest};
//! use codemorph::infrastructure::backend::HttpGenerationBackend;
//! use codemorph::services::RetryOrchestrator;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let backend = Arc::new(HttpGenerationBackend::new(Default::default())?);
//!     let orchestrator = RetryOrchestrator::new(backend, EngineConfig::default());
//!     let completion = orchestrator
//!         .run(&GenerationRequest::new("Convert this module to Java", "gpt-4o"))
//!         .await?;
//!     println!("{}", completion.text);
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod domain;
pub mod infrastructure;
pub mod services;

// Re-export commonly used types for convenience
pub use domain::models::{
    AccumulatedResponse, Completion, Config, EngineConfig, EscalationConfig, GenerationRequest,
    Transcript, Verdict,
};
pub use domain::ports::{BackendError, CompletionRequest, GenerationBackend, ProgressObserver};
pub use infrastructure::backend::HttpGenerationBackend;
pub use infrastructure::config::{ConfigError, ConfigLoader};
pub use services::{
    CompletenessClassifier, EscalationOrchestrator, GenerationError, OverlapMerger,
    RetryOrchestrator,
};
