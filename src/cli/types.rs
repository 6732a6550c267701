//! CLI type definitions
//!
//! This module contains clap command structures that define the CLI interface.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "codemorph")]
#[command(about = "CodeMorph - complete-response generation for truncating LLM backends", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output in JSON format
    #[arg(short, long, global = true)]
    pub json: bool,

    /// Configuration file (defaults to codemorph.yaml in the working directory)
    #[arg(short, long, global = true, env = "CODEMORPH_CONFIG")]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Generate a complete response from a prompt
    Generate(GenerateArgs),

    /// Judge the completeness of existing text
    Check(CheckArgs),
}

#[derive(Args, Debug)]
pub struct GenerateArgs {
    /// File holding the prompt ("-" reads stdin)
    pub prompt_file: PathBuf,

    /// Model identifier override
    #[arg(short, long)]
    pub model: Option<String>,

    /// Override the continuation attempt budget
    #[arg(long)]
    pub max_attempts: Option<u32>,

    /// Use the temperature-escalation policy instead of the fixed-temperature loop
    #[arg(short, long)]
    pub escalate: bool,

    /// Write the generated text to this file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct CheckArgs {
    /// File holding the text to judge
    pub file: PathBuf,
}
