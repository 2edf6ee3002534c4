pub mod convert;
pub mod grade;
pub mod init;
pub mod validate;

use std::path::Path;

use anyhow::{Context, Result};

use examkit_core::{ingest_with, Ingested, ParseIssue, ParseOptions};

/// Read an exam file and ingest it, using the file name as the format hint.
pub fn read_exam(path: &Path, options: &ParseOptions) -> Result<Ingested> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read exam: {}", path.display()))?;
    let name = path.file_name().and_then(|n| n.to_str());
    Ok(ingest_with(&content, name, options))
}

/// One issue as a printable line.
pub fn describe(issue: &ParseIssue) -> String {
    let prefix = issue
        .question_id
        .as_ref()
        .map(|id| format!("  [{id}]"))
        .unwrap_or_else(|| "  ".to_string());
    let level = if issue.is_error() { "ERROR" } else { "WARNING" };
    format!("{prefix} {level}: {}", issue.message)
}

/// Fail with the first error-level issue, if any.
pub fn ensure_no_errors(ingested: &Ingested, path: &Path) -> Result<()> {
    match ingested.issues.iter().find(|i| i.is_error()) {
        Some(issue) => anyhow::bail!("{}: {}", path.display(), issue.message),
        None => Ok(()),
    }
}
