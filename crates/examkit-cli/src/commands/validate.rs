//! The `examkit validate` command.

use std::path::PathBuf;

use anyhow::Result;

use super::{describe, read_exam};
use crate::config::load_config_from;

pub fn execute(input: PathBuf, config: Option<PathBuf>) -> Result<()> {
    let config = load_config_from(config.as_deref())?;
    let ingested = read_exam(&input, &config.parse)?;

    if let Some(exam) = &ingested.exam {
        println!("Exam: {} ({} questions)", exam.title, exam.questions.len());
    }

    for issue in &ingested.issues {
        println!("{}", describe(issue));
    }

    let errors = ingested.issues.iter().filter(|i| i.is_error()).count();
    let warnings = ingested.issues.len() - errors;

    if errors > 0 {
        anyhow::bail!("{errors} error(s) found in {}", input.display());
    }
    if warnings == 0 {
        println!("No issues found.");
    } else {
        println!("\n{warnings} warning(s) found.");
    }

    Ok(())
}
