use assert_cmd::Command;
use predicates::prelude::*;
use std::path::{Path, PathBuf};

fn lecture_scribe() -> Command {
    let mut cmd = Command::cargo_bin("lecture-scribe").unwrap();
    cmd.env_remove("OPENAI_API_KEY")
        .env_remove("LECTURE_SCRIBE_RECOGNITION_API_KEY")
        .env_remove("LECTURE_SCRIBE_TEXT_API_KEY")
        .env_remove("LECTURE_SCRIBE_CONFIG")
        .env_remove("RUST_LOG");
    cmd
}

#[test]
fn languages_lists_the_mapping() {
    lecture_scribe()
        .arg("languages")
        .assert()
        .success()
        .stdout(predicate::str::contains("Hindi (hi)"))
        .stdout(predicate::str::contains("Gujarati (gu)"));
}

#[test]
fn transcribe_without_recognizer_key_fails() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("config.yaml");
    let scratch = dir.path().join("scratch");
    std::fs::write(
        &config,
        format!(
            "app:\n  scratch_dir: {}\n  request_timeout_secs: 5\n",
            scratch.display()
        ),
    )
    .unwrap();

    lecture_scribe()
        .args(["--quiet", "--config"])
        .arg(&config)
        .args(["transcribe", "http://127.0.0.1:9/a.mp3", "--title", "Intro"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Speech recognition is not configured"));

    let leftovers = std::fs::read_dir(&scratch).map(|d| d.count()).unwrap_or(0);
    assert_eq!(leftovers, 0);
}

fn write_config(dir: &Path, content: &str) -> PathBuf {
    let config = dir.join("config.yaml");
    std::fs::write(&config, content).unwrap();
    config
}

#[test]
fn render_writes_pdf_from_saved_result() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_config(dir.path(), "report: {}\n");
    let input = dir.path().join("result.json");
    let output = dir.path().join("intro.pdf");
    std::fs::write(
        &input,
        r#"{"transcript": "Hello world.", "summary": "A short talk.", "language": "English"}"#,
    )
    .unwrap();

    lecture_scribe()
        .arg("--config")
        .arg(&config)
        .arg("render")
        .arg("--input")
        .arg(&input)
        .args(["--title", "Intro", "--output"])
        .arg(&output)
        .assert()
        .success();

    let bytes = std::fs::read(&output).unwrap();
    assert!(bytes.starts_with(b"%PDF"));
}

#[test]
fn render_hindi_without_font_fails_loudly() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_config(dir.path(), "report: {}\n");
    let input = dir.path().join("result.json");
    let output = dir.path().join("hindi.pdf");
    std::fs::write(
        &input,
        r#"{"transcript": "नमस्ते दुनिया", "summary": "नमस्ते", "language": "Hindi"}"#,
    )
    .unwrap();

    lecture_scribe()
        .arg("--config")
        .arg(&config)
        .arg("render")
        .arg("--input")
        .arg(&input)
        .args(["--title", "Intro", "--output"])
        .arg(&output)
        .assert()
        .failure()
        .stderr(predicate::str::contains("report.font_path"));

    assert!(!output.exists());
}

#[test]
fn render_with_missing_font_file_fails() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_config(dir.path(), "report:\n  font_path: /nonexistent/font.ttf\n");
    let input = dir.path().join("result.json");
    std::fs::write(
        &input,
        r#"{"transcript": "Hello world.", "summary": "A short talk.", "language": "English"}"#,
    )
    .unwrap();

    lecture_scribe()
        .arg("--config")
        .arg(&config)
        .arg("render")
        .arg("--input")
        .arg(&input)
        .args(["--title", "Intro"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot read report font"));
}
