use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

use crate::cli::OutputFormat;
use crate::transcribe::TranscriptionResult;
use crate::utils;

pub mod report;

pub use report::{EmbeddedFont, ReportRenderer, ReportRequest};

/// Download filename for a report: the sanitized title plus a fixed suffix
pub fn report_filename(title: &str) -> String {
    let stem = utils::sanitize_filename(title);
    if stem.is_empty() {
        "lecture_transcript.pdf".to_string()
    } else {
        format!("{}_transcript.pdf", stem)
    }
}

/// Plain-text rendering of a result
pub fn format_as_text(result: &TranscriptionResult, title: &str) -> String {
    format!(
        "{}\nLanguage: {}\n\nSummary\n-------\n{}\n\nFull Transcript\n---------------\n{}\n",
        title, result.language, result.summary, result.transcript
    )
}

pub fn format_as_json(result: &TranscriptionResult) -> Result<String> {
    serde_json::to_string_pretty(result).context("Failed to serialize transcription result")
}

/// Read a result previously written with [`format_as_json`]
pub async fn load_result(path: &Path) -> Result<TranscriptionResult> {
    let content = fs_err::tokio::read_to_string(path).await?;
    serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse transcription result {}", path.display()))
}

/// Write a result in the chosen format. PDF output always goes to a file; when no path is given
/// the file is named after the title in the current directory.
pub async fn write_result(
    result: &TranscriptionResult,
    title: &str,
    format: &OutputFormat,
    path: Option<&Path>,
    renderer: &ReportRenderer,
) -> Result<Option<PathBuf>> {
    let content = match format {
        OutputFormat::Text => format_as_text(result, title).into_bytes(),
        OutputFormat::Json => format_as_json(result)?.into_bytes(),
        OutputFormat::Pdf => {
            let request = ReportRequest::from_result(result, title);
            let bytes = renderer.render(&request).await?;
            let path = path
                .map(Path::to_path_buf)
                .unwrap_or_else(|| PathBuf::from(report_filename(title)));
            fs_err::tokio::write(&path, bytes).await?;
            return Ok(Some(path));
        }
    };

    match path {
        Some(path) => {
            fs_err::tokio::write(path, content).await?;
            Ok(Some(path.to_path_buf()))
        }
        None => {
            println!("{}", String::from_utf8_lossy(&content));
            Ok(None)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> TranscriptionResult {
        TranscriptionResult {
            transcript: "Hello world.".to_string(),
            summary: "A short talk.".to_string(),
            language: "English".to_string(),
        }
    }

    #[test]
    fn test_report_filename() {
        assert_eq!(report_filename("Lecture 1: Intro"), "Lecture_1__Intro_transcript.pdf");
        assert_eq!(report_filename("   "), "lecture_transcript.pdf");
    }

    #[test]
    fn test_text_output_has_sections_in_order() {
        let text = format_as_text(&sample(), "Intro");

        let summary = text.find("Summary").unwrap();
        let transcript = text.find("Full Transcript").unwrap();
        assert!(text.starts_with("Intro"));
        assert!(summary < transcript);
    }

    #[tokio::test]
    async fn test_json_output_can_be_loaded_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("result.json");

        let written = write_result(
            &sample(),
            "Intro",
            &OutputFormat::Json,
            Some(path.as_path()),
            &ReportRenderer::new(),
        )
        .await
        .unwrap();
        let loaded = load_result(&path).await.unwrap();

        assert_eq!(written, Some(path));
        assert_eq!(loaded, sample());
    }

    #[tokio::test]
    async fn test_pdf_output_is_written_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.pdf");

        write_result(
            &sample(),
            "Intro",
            &OutputFormat::Pdf,
            Some(path.as_path()),
            &ReportRenderer::new(),
        )
        .await
        .unwrap();

        let bytes = fs_err::read(&path).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }

    #[tokio::test]
    async fn test_unrenderable_pdf_leaves_no_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.pdf");
        let mut hindi = sample();
        hindi.transcript = "नमस्ते दुनिया".to_string();

        let outcome = write_result(
            &hindi,
            "Intro",
            &OutputFormat::Pdf,
            Some(path.as_path()),
            &ReportRenderer::new(),
        )
        .await;

        assert!(outcome.is_err());
        assert!(!path.exists());
    }
}
