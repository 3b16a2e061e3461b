//! End-to-end run: load the clause database, scan each document, persist
//! a compliance matrix and a highlighted copy per document.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use chrono::Local;
use clause_engine::CrossReferencer;
use tracing::{error, info, warn};

/// A PDF whose text layer is shorter than this is treated as a scanned
/// image. DOCX files carry their text outright, so any non-empty
/// extraction proceeds.
const MIN_PDF_TEXT_CHARS: usize = 50;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d_%H-%M-%S";

/// Folder layout for one run.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_dir: PathBuf,
    pub input_dir: PathBuf,
    pub output_dir: PathBuf,
}

#[derive(Debug, Default)]
pub struct RunSummary {
    pub documents: usize,
    pub matrices_written: usize,
    pub highlights_written: usize,
    pub skipped: usize,
}

enum Outcome {
    Persisted { highlighted: bool },
    Skipped,
}

pub fn run(config: &Config) -> Result<RunSummary> {
    for dir in [&config.database_dir, &config.input_dir, &config.output_dir] {
        fs::create_dir_all(dir)
            .with_context(|| format!("creating directory {}", dir.display()))?;
    }

    let sources = shared_xlsx::load_reference_dir(&config.database_dir)?;
    let engine = CrossReferencer::from_sources(sources).with_context(|| {
        format!(
            "no usable clause database; add reference spreadsheets to {}",
            config.database_dir.display()
        )
    })?;
    info!(
        identifiers = engine.known_identifiers().len(),
        "clause database ready"
    );

    let documents = discover_documents(&config.input_dir)?;
    let mut summary = RunSummary {
        documents: documents.len(),
        ..RunSummary::default()
    };

    for path in &documents {
        match process_document(&engine, path, &config.output_dir) {
            Ok(Outcome::Persisted { highlighted }) => {
                summary.matrices_written += 1;
                if highlighted {
                    summary.highlights_written += 1;
                }
            }
            Ok(Outcome::Skipped) => summary.skipped += 1,
            Err(e) => {
                error!(path = %path.display(), error = %e, "document failed");
                summary.skipped += 1;
            }
        }
    }
    Ok(summary)
}

/// Supported documents in the input directory, sorted by path for a
/// deterministic processing order. Editor temp files and dotfiles are
/// ignored.
fn discover_documents(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut documents = Vec::new();
    for entry in fs::read_dir(dir).with_context(|| format!("reading {}", dir.display()))? {
        let entry = entry?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let name = entry.file_name();
        let name = name.to_string_lossy();
        if name.starts_with('~') || name.starts_with('.') {
            continue;
        }
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());
        if matches!(ext.as_deref(), Some("pdf") | Some("docx")) {
            documents.push(path);
        }
    }
    documents.sort();
    Ok(documents)
}

fn extraction_usable(ext: &str, text: &str) -> bool {
    let chars = text.trim().len();
    match ext {
        "pdf" => chars >= MIN_PDF_TEXT_CHARS,
        _ => chars > 0,
    }
}

fn process_document(
    engine: &CrossReferencer,
    path: &Path,
    output_dir: &Path,
) -> Result<Outcome> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or_default()
        .to_ascii_lowercase();

    let text = match ext.as_str() {
        "pdf" => shared_pdf::extract_text(path)?,
        "docx" => shared_docx::extract_text(path)?,
        other => bail!("unsupported document extension: {other}"),
    };

    if !extraction_usable(&ext, &text) {
        warn!(
            path = %path.display(),
            chars = text.trim().len(),
            "no usable text extracted; skipping"
        );
        return Ok(Outcome::Skipped);
    }

    let found = engine.match_text(&text)?;
    if found.is_empty() {
        info!(path = %path.display(), "no clause citations found");
        return Ok(Outcome::Skipped);
    }
    info!(path = %path.display(), clauses = found.len(), "matched clauses");

    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("document");
    let timestamp = Local::now().format(TIMESTAMP_FORMAT);

    let matrix = engine.matrix_for(&found);
    let matrix_path = output_dir.join(format!("Compliance_Matrix_{stem}_{timestamp}.xlsx"));
    shared_xlsx::write_matrix(&matrix_path, &matrix)?;
    info!(
        path = %matrix_path.display(),
        rows = matrix.records.len(),
        "wrote compliance matrix"
    );

    // The matrix is already on disk; a highlight failure is logged but
    // does not undo it.
    let highlight_path =
        output_dir.join(format!("Executed_Highlights_{stem}_{timestamp}.{ext}"));
    let highlighted = match ext.as_str() {
        "pdf" => shared_pdf::highlight_pdf(path, &highlight_path, &found).map_err(anyhow::Error::from),
        _ => shared_docx::highlight_docx(path, &highlight_path, &found).map_err(anyhow::Error::from),
    };
    match highlighted {
        Ok(()) => {
            info!(path = %highlight_path.display(), "wrote highlighted copy");
            Ok(Outcome::Persisted { highlighted: true })
        }
        Err(e) => {
            error!(path = %path.display(), error = %e, "highlight reconstruction failed");
            Ok(Outcome::Persisted { highlighted: false })
        }
    }
}
