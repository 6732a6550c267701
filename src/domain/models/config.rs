use serde::{Deserialize, Serialize};

/// Main configuration structure for CodeMorph
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Config {
    /// Continuation engine tuning
    #[serde(default)]
    pub engine: EngineConfig,

    /// Temperature-escalation policy tuning
    #[serde(default)]
    pub escalation: EscalationConfig,

    /// Generation backend endpoint configuration
    #[serde(default)]
    pub backend: BackendConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Tuning knobs for the continuation engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct EngineConfig {
    /// Default model identifier sent to the backend
    #[serde(default = "default_model")]
    pub model: String,

    /// Maximum continuation rounds per request
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Token cap requested from the backend per call
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Fixed sampling temperature for the primary policy
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Word count at which a response is treated as near the token limit
    #[serde(default = "default_near_limit_words")]
    pub near_limit_words: usize,

    /// Characters of accumulated text restated in continuation prompts
    #[serde(default = "default_context_window_chars")]
    pub context_window_chars: usize,

    /// Trailing window searched for suffix/prefix overlap during merge
    #[serde(default = "default_overlap_window_chars")]
    pub overlap_window_chars: usize,

    /// Continuations shorter than this (trimmed) are rejected as noise
    #[serde(default = "default_min_chunk_chars")]
    pub min_chunk_chars: usize,

    /// Minimum size of the trailing window scanned for duplicate chunks
    #[serde(default = "default_duplicate_window_floor_chars")]
    pub duplicate_window_floor_chars: usize,

    /// Attempt number past which continuation prompts demand closure
    #[serde(default = "default_prompt_escalation_threshold")]
    pub prompt_escalation_threshold: u32,

    /// Optional system prompt prepended to every backend call
    #[serde(default)]
    pub system_prompt: Option<String>,
}

fn default_model() -> String {
    "gpt-4o".to_string()
}

const fn default_max_attempts() -> u32 {
    3
}

const fn default_max_tokens() -> u32 {
    4000
}

const fn default_temperature() -> f32 {
    0.5
}

const fn default_near_limit_words() -> usize {
    900
}

const fn default_context_window_chars() -> usize {
    500
}

const fn default_overlap_window_chars() -> usize {
    100
}

const fn default_min_chunk_chars() -> usize {
    10
}

const fn default_duplicate_window_floor_chars() -> usize {
    200
}

const fn default_prompt_escalation_threshold() -> u32 {
    3
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            model: default_model(),
            max_attempts: default_max_attempts(),
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
            near_limit_words: default_near_limit_words(),
            context_window_chars: default_context_window_chars(),
            overlap_window_chars: default_overlap_window_chars(),
            min_chunk_chars: default_min_chunk_chars(),
            duplicate_window_floor_chars: default_duplicate_window_floor_chars(),
            prompt_escalation_threshold: default_prompt_escalation_threshold(),
            system_prompt: None,
        }
    }
}

/// Tuning for the alternate temperature-escalation policy.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct EscalationConfig {
    /// Temperature of the first attempt
    #[serde(default = "default_initial_temperature")]
    pub initial_temperature: f32,

    /// Added to the temperature after each incomplete attempt
    #[serde(default = "default_temperature_step")]
    pub step: f32,

    /// Hard cap on the escalated temperature
    #[serde(default = "default_temperature_ceiling")]
    pub ceiling: f32,
}

const fn default_initial_temperature() -> f32 {
    0.0
}

const fn default_temperature_step() -> f32 {
    0.2
}

const fn default_temperature_ceiling() -> f32 {
    2.0
}

impl Default for EscalationConfig {
    fn default() -> Self {
        Self {
            initial_temperature: default_initial_temperature(),
            step: default_temperature_step(),
            ceiling: default_temperature_ceiling(),
        }
    }
}

/// HTTP backend endpoint configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct BackendConfig {
    /// Service base URL
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Deployment name addressed in the request path
    #[serde(default = "default_deployment")]
    pub deployment: String,

    /// API version query parameter
    #[serde(default = "default_api_version")]
    pub api_version: String,

    /// API key; usually supplied via the CODEMORPH_BACKEND__API_KEY
    /// environment variable rather than the config file
    #[serde(default)]
    pub api_key: String,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_base_url() -> String {
    "https://api.openai.azure.com".to_string()
}

fn default_deployment() -> String {
    "gpt-4o".to_string()
}

fn default_api_version() -> String {
    "2024-09-01-preview".to_string()
}

const fn default_timeout_secs() -> u64 {
    300
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            deployment: default_deployment(),
            api_version: default_api_version(),
            api_key: String::new(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format: json or pretty
    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}
