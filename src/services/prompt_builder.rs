//! Continuation prompt synthesis.
//!
//! Every continuation restates a fixed-size trailing window of the
//! accumulated text, so prompt size stays constant no matter how many
//! rounds the loop runs and the backend never has to remember earlier
//! turns on its own.

use crate::services::text::trailing_chars;

/// Prompt builder configuration.
#[derive(Debug, Clone)]
pub struct PromptBuilderConfig {
    /// Characters of accumulated text restated as context.
    pub context_window_chars: usize,
    /// Attempt number past which the closure instruction is added.
    pub escalation_threshold: u32,
}

impl Default for PromptBuilderConfig {
    fn default() -> Self {
        Self {
            context_window_chars: 500,
            escalation_threshold: 3,
        }
    }
}

/// Builds the next request payload from accumulated text, open-block
/// depth, and the attempt number.
#[derive(Debug, Clone, Default)]
pub struct ContinuationPromptBuilder {
    config: PromptBuilderConfig,
}

impl ContinuationPromptBuilder {
    pub fn new(config: PromptBuilderConfig) -> Self {
        Self { config }
    }

    /// Produce the continuation prompt for the next round.
    ///
    /// Past the escalation threshold the instruction shifts from "keep
    /// going" to "close what is open" — a simple annealing policy that
    /// nudges the backend toward termination.
    pub fn build(&self, accumulated: &str, open_depth: usize, attempt: u32) -> String {
        let context = trailing_chars(accumulated, self.config.context_window_chars);

        let mut prompt = format!(
            "Continue the generation exactly from where the previous output stopped. \
             Current context: '{context}'\n\
             Open blocks: {open_depth}\n\
             Maintain consistent style and complete any unfinished statements or blocks.\n\
             If starting a new section, ensure proper closure."
        );

        if attempt > self.config.escalation_threshold {
            prompt.push_str(
                "\nPrioritize completing open blocks and ensuring syntactic correctness \
                 over adding new content.",
            );
        }

        prompt
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn embeds_trailing_context_and_depth() {
        let builder = ContinuationPromptBuilder::default();
        let prompt = builder.build("earlier text ends with this tail", 2, 0);
        assert!(prompt.contains("ends with this tail"));
        assert!(prompt.contains("Open blocks: 2"));
    }

    #[test]
    fn context_window_is_bounded() {
        let builder = ContinuationPromptBuilder::new(PromptBuilderConfig {
            context_window_chars: 10,
            escalation_threshold: 3,
        });
        let accumulated = "a".repeat(1000);
        let prompt = builder.build(&accumulated, 0, 0);
        assert!(!prompt.contains(&"a".repeat(11)));
        assert!(prompt.contains(&"a".repeat(10)));
    }

    #[test]
    fn prompt_size_constant_across_rounds() {
        let builder = ContinuationPromptBuilder::default();
        let short = builder.build(&"x".repeat(600), 1, 1).len();
        let long = builder.build(&"x".repeat(60_000), 1, 1).len();
        assert_eq!(short, long);
    }

    #[test]
    fn escalates_past_threshold() {
        let builder = ContinuationPromptBuilder::default();
        let relaxed = builder.build("text", 0, 3);
        let strict = builder.build("text", 0, 4);
        assert!(!relaxed.contains("Prioritize completing open blocks"));
        assert!(strict.contains("Prioritize completing open blocks"));
    }
}
