//! CLI integration tests using assert_cmd.

use std::path::PathBuf;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn examkit() -> Command {
    #[allow(deprecated)]
    Command::cargo_bin("examkit").unwrap()
}

const TEXT_EXAM: &str = "# 쪽지시험

문제 1) 대한민국의 수도는?
① 부산
② 서울
정답: ②

문제 2) 짝수를 모두 고르시오.
① 1
② 2
③ 3
④ 4
정답: ②, ④
";

const JSON_EXAM: &str = r#"{"title":"t","questions":[{"id":"Q1","type":"single","prompt":"p","choices":["1","2"],"answer":0}]}"#;

fn write(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, content).unwrap();
    path
}

#[test]
fn validate_clean_exam() {
    let dir = TempDir::new().unwrap();
    let exam = write(&dir, "quiz.txt", TEXT_EXAM);

    examkit()
        .arg("validate")
        .arg("--input")
        .arg(&exam)
        .assert()
        .success()
        .stdout(predicate::str::contains("쪽지시험 (2 questions)"))
        .stdout(predicate::str::contains("No issues found"));
}

#[test]
fn validate_reports_warnings() {
    let dir = TempDir::new().unwrap();
    let exam = write(
        &dir,
        "bank.json",
        r#"[{"id": "Q1", "type": "multi", "prompt": "no choices", "answer": [0]}]"#,
    );

    examkit()
        .arg("validate")
        .arg("--input")
        .arg(&exam)
        .assert()
        .success()
        .stdout(predicate::str::contains("[Q1] WARNING: no choices provided"))
        .stdout(predicate::str::contains("warning(s) found"));
}

#[test]
fn validate_fails_on_errors() {
    let dir = TempDir::new().unwrap();
    let exam = write(&dir, "empty.txt", "   \n");

    examkit()
        .arg("validate")
        .arg("--input")
        .arg(&exam)
        .assert()
        .failure()
        .stdout(predicate::str::contains("ERROR: input is empty"))
        .stderr(predicate::str::contains("Error"));
}

#[test]
fn validate_nonexistent_file() {
    examkit()
        .arg("validate")
        .arg("--input")
        .arg("nonexistent.txt")
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to read exam"));
}

#[test]
fn convert_to_canonical_json() {
    let dir = TempDir::new().unwrap();
    let exam = write(&dir, "quiz.txt", TEXT_EXAM);

    let output = examkit()
        .arg("convert")
        .arg("--input")
        .arg(&exam)
        .output()
        .unwrap();
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["title"], "쪽지시험");
    assert_eq!(json["questions"][0]["type"], "single");
    assert_eq!(json["questions"][0]["answer"], 1);
    assert_eq!(json["questions"][1]["type"], "multi");
    assert_eq!(json["questions"][1]["answer"], serde_json::json!([1, 3]));
}

#[test]
fn convert_to_editable_file() {
    let dir = TempDir::new().unwrap();
    let exam = write(&dir, "quiz.txt", TEXT_EXAM);
    let out = dir.path().join("editable.json");

    examkit()
        .arg("convert")
        .arg("--input")
        .arg(&exam)
        .arg("--format")
        .arg("editable")
        .arg("--output")
        .arg(&out)
        .assert()
        .success()
        .stdout(predicate::str::contains("Wrote"));

    let json: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&out).unwrap()).unwrap();
    assert_eq!(json["questions"][0]["choicesText"], "① 부산\n② 서울");
    assert_eq!(json["questions"][1]["answerText"], "②, ④");
}

#[test]
fn convert_unknown_format() {
    let dir = TempDir::new().unwrap();
    let exam = write(&dir, "exam.json", JSON_EXAM);

    examkit()
        .arg("convert")
        .arg("--input")
        .arg(&exam)
        .arg("--format")
        .arg("yaml")
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown format: yaml"));
}

#[test]
fn grade_text_summary() {
    let dir = TempDir::new().unwrap();
    let exam = write(&dir, "quiz.txt", TEXT_EXAM);
    let answers = write(&dir, "answers.json", r#"{"Q1": 1, "Q2": [3]}"#);

    examkit()
        .arg("grade")
        .arg("--input")
        .arg(&exam)
        .arg("--answers")
        .arg(&answers)
        .assert()
        .success()
        .stdout(predicate::str::contains("Score: 1/2 (50%)"))
        .stdout(predicate::str::contains("wrong"));
}

#[test]
fn grade_json_report() {
    let dir = TempDir::new().unwrap();
    let exam = write(&dir, "exam.json", JSON_EXAM);
    let answers = write(&dir, "answers.json", r#"{"Q1": 0}"#);

    let output = examkit()
        .arg("grade")
        .arg("--input")
        .arg(&exam)
        .arg("--answers")
        .arg(&answers)
        .arg("--format")
        .arg("json")
        .output()
        .unwrap();
    assert!(output.status.success());

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["examTitle"], "t");
    assert_eq!(report["accuracy"], 100);
    assert_eq!(report["results"][0]["correct"], true);
    assert!(report["runId"].is_string());
    assert!(report["gradedAt"].is_string());
}

#[test]
fn grade_rejects_bad_answers_file() {
    let dir = TempDir::new().unwrap();
    let exam = write(&dir, "exam.json", JSON_EXAM);
    let answers = write(&dir, "answers.json", "not json");

    examkit()
        .arg("grade")
        .arg("--input")
        .arg(&exam)
        .arg("--answers")
        .arg(&answers)
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to parse answers"));
}

#[test]
fn config_changes_default_title() {
    let dir = TempDir::new().unwrap();
    let exam = write(&dir, "bank.json", r#"[{"prompt": "p", "answer": "x"}]"#);
    let config = write(&dir, "custom.toml", "[parse]\ndefault_title = \"Practice\"\n");

    examkit()
        .arg("validate")
        .arg("--input")
        .arg(&exam)
        .arg("--config")
        .arg(&config)
        .assert()
        .success()
        .stdout(predicate::str::contains("Exam: Practice"));
}

#[test]
fn init_creates_files() {
    let dir = TempDir::new().unwrap();

    examkit()
        .current_dir(dir.path())
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("Created examkit.toml"))
        .stdout(predicate::str::contains("Created sample-exam.txt"));

    assert!(dir.path().join("examkit.toml").exists());
    assert!(dir.path().join("sample-exam.txt").exists());

    examkit()
        .current_dir(dir.path())
        .arg("grade")
        .arg("--input")
        .arg("sample-exam.txt")
        .arg("--answers")
        .arg("sample-answers.json")
        .assert()
        .success()
        .stdout(predicate::str::contains("(100%)"));
}

#[test]
fn init_skips_existing() {
    let dir = TempDir::new().unwrap();

    examkit().current_dir(dir.path()).arg("init").assert().success();

    examkit()
        .current_dir(dir.path())
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("already exists"));
}
