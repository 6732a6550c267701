//! Generation backend adapter
//!
//! HTTP implementation of the `GenerationBackend` port against an
//! Azure-style chat completions endpoint.

pub mod client;
pub mod types;

pub use client::HttpGenerationBackend;
