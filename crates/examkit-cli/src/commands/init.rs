//! The `examkit init` command.

use std::path::Path;

use anyhow::{Context, Result};

pub fn execute() -> Result<()> {
    for (name, content) in [
        ("examkit.toml", SAMPLE_CONFIG),
        ("sample-exam.txt", SAMPLE_EXAM),
        ("sample-answers.json", SAMPLE_ANSWERS),
    ] {
        if Path::new(name).exists() {
            println!("{name} already exists, skipping.");
        } else {
            std::fs::write(name, content).with_context(|| format!("failed to write {name}"))?;
            println!("Created {name}");
        }
    }

    println!("\nNext steps:");
    println!("  1. Run: examkit validate --input sample-exam.txt");
    println!("  2. Run: examkit convert --input sample-exam.txt --format editable");
    println!("  3. Run: examkit grade --input sample-exam.txt --answers sample-answers.json");

    Ok(())
}

const SAMPLE_CONFIG: &str = r#"# examkit configuration

[parse]
# Title for inputs that do not name one.
default_title = "Untitled Exam"
# Answer-key answers up to this many characters may carry a "(explanation)".
short_answer_max_chars = 24
# Drop answers that point past the last choice.
validate_answer_range = true
"#;

const SAMPLE_EXAM: &str = "# Sample Exam

문제 1) 대한민국의 수도는?
① 부산
② 서울
③ 대구
정답: ②
해설: 서울은 조선 시대부터 수도였다.

Q2. Which of these are prime numbers?
A) 2
B) 4
C) 5
Answer: A, C

Q3. The earth orbits the sun.
Answer: O

문제 4) 물의 화학식은?

정답
4) H2O (수소 두 개와 산소 하나)
";

const SAMPLE_ANSWERS: &str = r#"{
  "Q1": 1,
  "Q2": [0, 2],
  "Q3": 0,
  "Q4": "h2o"
}
"#;
