//! Domain models.

pub mod config;
pub mod generation;

pub use config::{BackendConfig, Config, EngineConfig, EscalationConfig, LoggingConfig};
pub use generation::{
    AccumulatedResponse, Chunk, Completion, Exchange, GenerationRequest, RetryState, Transcript,
    Verdict,
};
