//! Check CLI command: offline completeness judgment for existing text.

use anyhow::{Context, Result};

use crate::cli::output::{output, CommandOutput};
use crate::cli::types::CheckArgs;
use crate::domain::models::config::Config;
use crate::domain::models::generation::Verdict;
use crate::services::classifier::{ClassifierConfig, CompletenessClassifier};
use crate::services::depth::BlockDepthTracker;
use crate::services::escalation::is_complete_strict;
use crate::services::text::word_count;

pub async fn execute(args: CheckArgs, config: &Config, json_mode: bool) -> Result<()> {
    let text = std::fs::read_to_string(&args.file)
        .with_context(|| format!("Failed to read {}", args.file.display()))?;

    let mut tracker = BlockDepthTracker::new();
    tracker.update(&text);

    let classifier = CompletenessClassifier::new(ClassifierConfig {
        near_limit_words: config.engine.near_limit_words,
    });
    let verdict = classifier.classify(&text, tracker.depth());
    let reasons = classifier
        .reasons(&text, tracker.depth())
        .iter()
        .map(|reason| reason.as_str().to_string())
        .collect();

    output(
        &CheckOutput {
            complete: verdict == Verdict::Complete,
            strict_complete: is_complete_strict(&text),
            reasons,
            open_blocks: tracker.depth(),
            word_count: word_count(&text),
        },
        json_mode,
    );
    Ok(())
}

#[derive(Debug, serde::Serialize)]
struct CheckOutput {
    complete: bool,
    strict_complete: bool,
    reasons: Vec<String>,
    open_blocks: usize,
    word_count: usize,
}

impl CommandOutput for CheckOutput {
    fn to_human(&self) -> String {
        let mut lines = vec![
            format!("Complete:        {}", self.complete),
            format!("Strict complete: {}", self.strict_complete),
            format!("Open blocks:     {}", self.open_blocks),
            format!("Words:           {}", self.word_count),
        ];
        if !self.reasons.is_empty() {
            lines.push(format!("Reasons:         {}", self.reasons.join(", ")));
        }
        lines.join("\n")
    }
}
