//! ClauseMatch CLI - Solicitation cross-referencing
//!
//! Scans a folder of solicitation documents (PDF / DOCX) for citations of
//! the clauses listed in the reference database, then writes per-document:
//! - a color-coded compliance matrix spreadsheet
//! - a copy of the document with every citation highlighted

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use tracing::info;

mod pipeline;

#[derive(Parser)]
#[command(
    name = "clausematch",
    version,
    about = "Cross-reference solicitation documents against a clause database"
)]
struct Cli {
    /// Directory holding the clause reference spreadsheets (.xlsx/.xlsm/.xls/.csv)
    #[arg(long, default_value = "Database")]
    database_dir: PathBuf,

    /// Directory holding the solicitation documents to scan (.pdf/.docx)
    #[arg(long, default_value = "Solicitations")]
    input_dir: PathBuf,

    /// Directory the matrices and highlighted copies are written to
    #[arg(long, default_value = "Output")]
    output_dir: PathBuf,
}

fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("clausematch=info".parse()?)
                .add_directive("clause_engine=info".parse()?)
                .add_directive("shared_xlsx=info".parse()?),
        )
        .init();

    let cli = Cli::parse();
    let config = pipeline::Config {
        database_dir: cli.database_dir,
        input_dir: cli.input_dir,
        output_dir: cli.output_dir,
    };
    let summary = pipeline::run(&config)?;

    info!(
        documents = summary.documents,
        matrices = summary.matrices_written,
        highlights = summary.highlights_written,
        skipped = summary.skipped,
        "run complete"
    );
    Ok(())
}
