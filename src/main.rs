//! CodeMorph CLI entry point.

use clap::Parser;

use codemorph::cli::{handle_error, Cli, Commands};
use codemorph::infrastructure::config::ConfigLoader;
use codemorph::infrastructure::logging;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => ConfigLoader::load_from_file(path),
        None => ConfigLoader::load(),
    };
    let config = match config {
        Ok(config) => config,
        Err(err) => handle_error(err, cli.json),
    };

    if let Err(err) = logging::init(&config.logging) {
        handle_error(err, cli.json);
    }

    let result = match cli.command {
        Commands::Generate(args) => {
            codemorph::cli::commands::generate::execute(args, &config, cli.json).await
        }
        Commands::Check(args) => {
            codemorph::cli::commands::check::execute(args, &config, cli.json).await
        }
    };

    if let Err(err) = result {
        handle_error(err, cli.json);
    }
}
