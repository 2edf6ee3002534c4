//! The `examkit convert` command.

use std::path::PathBuf;

use anyhow::{Context, Result};

use super::{describe, ensure_no_errors, read_exam};
use crate::config::load_config_from;

pub fn execute(
    input: PathBuf,
    output: Option<PathBuf>,
    format: String,
    config: Option<PathBuf>,
) -> Result<()> {
    let config = load_config_from(config.as_deref())?;
    let ingested = read_exam(&input, &config.parse)?;
    ensure_no_errors(&ingested, &input)?;

    let json = match format.as_str() {
        "canonical" => serde_json::to_string_pretty(&ingested.exam)?,
        "editable" => serde_json::to_string_pretty(&ingested.editable)?,
        other => anyhow::bail!("unknown format: {other} (expected canonical or editable)"),
    };

    for issue in ingested.warnings() {
        eprintln!("{}", describe(issue));
    }

    match output {
        Some(path) => {
            std::fs::write(&path, format!("{json}\n"))
                .with_context(|| format!("failed to write output: {}", path.display()))?;
            println!("Wrote {}", path.display());
        }
        None => println!("{json}"),
    }

    Ok(())
}
