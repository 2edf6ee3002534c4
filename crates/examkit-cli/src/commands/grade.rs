//! The `examkit grade` command.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use examkit_core::{grade, ExamData, GradeSummary, UserAnswer};

use super::{ensure_no_errors, read_exam};
use crate::config::load_config_from;

/// A graded run, as written by `--format json`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GradeReport {
    pub run_id: Uuid,
    pub graded_at: DateTime<Utc>,
    pub exam_title: String,
    #[serde(flatten)]
    pub summary: GradeSummary,
}

pub fn execute(
    input: PathBuf,
    answers_path: PathBuf,
    format: String,
    config: Option<PathBuf>,
) -> Result<()> {
    let config = load_config_from(config.as_deref())?;
    let ingested = read_exam(&input, &config.parse)?;
    ensure_no_errors(&ingested, &input)?;
    let exam = ingested
        .exam
        .context("ingestion produced no exam")?;

    let answers = load_answers(&answers_path)?;
    for id in answers.keys().filter(|id| exam.question(id).is_none()) {
        tracing::warn!(question = %id, "answer given for unknown question");
    }

    let report = GradeReport {
        run_id: Uuid::new_v4(),
        graded_at: Utc::now(),
        exam_title: exam.title.clone(),
        summary: grade(&exam, &answers),
    };

    match format.as_str() {
        "json" => println!("{}", serde_json::to_string_pretty(&report)?),
        "text" => print_summary(&exam, &report.summary),
        other => anyhow::bail!("unknown format: {other} (expected text or json)"),
    }

    Ok(())
}

fn load_answers(path: &Path) -> Result<HashMap<String, UserAnswer>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read answers: {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("failed to parse answers: {}", path.display()))
}

fn print_summary(exam: &ExamData, summary: &GradeSummary) {
    use comfy_table::{Cell, Table};

    let mut table = Table::new();
    table.set_header(vec!["Question", "Type", "Your answer", "Correct answer", "Result"]);

    for result in &summary.results {
        let outcome = match (result.answered, result.correct) {
            (_, true) => "correct",
            (true, false) => "wrong",
            (false, false) => "unanswered",
        };
        table.add_row(vec![
            Cell::new(&result.question_id),
            Cell::new(result.kind),
            Cell::new(result.user_display.as_deref().unwrap_or("-")),
            Cell::new(&result.correct_display),
            Cell::new(outcome),
        ]);
    }

    println!("{}\n", exam.title);
    println!("{table}");
    println!(
        "\nScore: {}/{} ({}%), {} incorrect, {} unanswered",
        summary.correct, summary.total, summary.accuracy, summary.incorrect, summary.unanswered
    );
}
