//! Generate CLI command.

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};

use crate::cli::output::{output, CommandOutput};
use crate::cli::progress::SpinnerProgress;
use crate::cli::types::GenerateArgs;
use crate::domain::models::config::Config;
use crate::domain::models::generation::{Completion, GenerationRequest};
use crate::infrastructure::backend::HttpGenerationBackend;
use crate::services::{EscalationOrchestrator, RetryOrchestrator};

pub async fn execute(args: GenerateArgs, config: &Config, json_mode: bool) -> Result<()> {
    let prompt = read_prompt(&args.prompt_file)?;

    let mut engine = config.engine.clone();
    if let Some(max_attempts) = args.max_attempts {
        engine.max_attempts = max_attempts;
    }
    let model = args.model.unwrap_or_else(|| engine.model.clone());

    let backend = Arc::new(
        HttpGenerationBackend::new(config.backend.clone())
            .context("Failed to build the generation backend")?,
    );
    let request = GenerationRequest::new(prompt, model);

    let progress = SpinnerProgress::new(!json_mode);
    let completion = if args.escalate {
        EscalationOrchestrator::new(backend, engine, config.escalation.clone())
            .run_with_observer(&request, &progress)
            .await
    } else {
        RetryOrchestrator::new(backend, engine)
            .run_with_observer(&request, &progress)
            .await
    };
    progress.finish();
    let completion = completion?;

    let result = match &args.output {
        Some(path) => {
            std::fs::write(path, &completion.text)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            GenerateOutput::written_to(&completion, path)
        }
        None => GenerateOutput::inline(completion),
    };
    output(&result, json_mode);
    Ok(())
}

fn read_prompt(path: &Path) -> Result<String> {
    let prompt = if path == Path::new("-") {
        std::io::read_to_string(std::io::stdin()).context("Failed to read prompt from stdin")?
    } else {
        std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read prompt file {}", path.display()))?
    };

    let prompt = prompt.trim();
    anyhow::ensure!(!prompt.is_empty(), "Prompt is empty");
    Ok(prompt.to_string())
}

#[derive(Debug, serde::Serialize)]
struct GenerateOutput {
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    attempts: u32,
    word_count: usize,
    complete: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    output_path: Option<String>,
}

impl GenerateOutput {
    fn inline(completion: Completion) -> Self {
        Self {
            text: Some(completion.text),
            attempts: completion.attempts,
            word_count: completion.word_count,
            complete: completion.complete,
            output_path: None,
        }
    }

    fn written_to(completion: &Completion, path: &Path) -> Self {
        Self {
            text: None,
            attempts: completion.attempts,
            word_count: completion.word_count,
            complete: completion.complete,
            output_path: Some(path.display().to_string()),
        }
    }
}

impl CommandOutput for GenerateOutput {
    fn to_human(&self) -> String {
        match (&self.text, &self.output_path) {
            (Some(text), _) => text.clone(),
            (None, Some(path)) => format!(
                "Wrote {} words to {} ({} continuation attempt(s), complete: {})",
                self.word_count, path, self.attempts, self.complete
            ),
            (None, None) => String::new(),
        }
    }
}
