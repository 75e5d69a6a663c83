//! Ingest command - adds files to the local vector index

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Args;
use tracing::info;

/// Arguments for the ingest command
#[derive(Args, Debug, Clone)]
pub struct IngestArgs {
    /// Files to ingest (.txt, .md, .pdf); re-ingesting a file replaces its chunks
    #[arg(required = true)]
    pub paths: Vec<PathBuf>,
}

/// Run the ingestion pipeline over the given files
pub async fn run(config_path: Option<&Path>, args: IngestArgs) -> anyhow::Result<ExitCode> {
    let config = super::bootstrap(config_path)?;
    let pipeline = crate::create_ingestion_pipeline(&config).await?;

    println!("Ingesting {} file(s)...", args.paths.len());
    let report = pipeline.ingest_paths(&args.paths).await?;

    for source in &report.sources {
        if source.replaced > 0 {
            println!(
                "  {}: {} chunks (replaced {})",
                source.source, source.chunks, source.replaced
            );
        } else {
            println!("  {}: {} chunks", source.source, source.chunks);
        }
    }

    println!(
        "Ingestion complete. {} chunks saved to {}",
        report.total_chunks(),
        config.index.path.display()
    );
    println!(
        "Index now holds {} chunks from {} source(s)",
        report.index_chunks, report.index_sources
    );
    info!(chunks = report.total_chunks(), "Ingest command finished");

    Ok(ExitCode::SUCCESS)
}
