use std::process::ExitCode;

use agentic_rag::cli::{self, Cli, Command};
use clap::Parser;

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();
    let config = cli.config.as_deref();

    match cli.command {
        Command::Ask(args) => cli::ask::run(config, args).await,
        Command::Ingest(args) => cli::ingest::run(config, args).await,
    }
}
