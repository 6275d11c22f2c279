//! Lecture Scribe - turn a lecture recording into a transcript, a summary and a PDF report
//!
//! The library downloads media from a URL, runs speech recognition, optionally translates the
//! transcript, summarizes it with a text-generation provider and renders the result as a
//! paginated document.

pub mod cli;
pub mod config;
pub mod fetcher;
pub mod language;
pub mod output;
pub mod providers;
pub mod transcribe;
pub mod utils;

pub use cli::{Cli, Commands, OutputFormat};
pub use config::Config;
pub use language::Language;
pub use output::report::{ReportRenderer, ReportRequest};
pub use providers::{Capabilities, ProviderError, SpeechRecognizer, TextGenerator};
pub use transcribe::{TranscriptionPipeline, TranscriptionRequest, TranscriptionResult};

/// Result type used by configuration and CLI helpers
pub type Result<T> = anyhow::Result<T>;

/// Fatal failures of the transcription pipeline and the report renderer
#[derive(thiserror::Error, Debug)]
pub enum PipelineError {
    #[error("Speech recognition is not configured")]
    RecognizerUnavailable,

    #[error("Download failed: {0}")]
    DownloadFailure(String),

    #[error("Recognition failed: {0}")]
    RecognitionFailure(#[source] ProviderError),

    #[error("Report rendering failed: {0}")]
    RenderFailure(String),

    #[error("Scratch directory unavailable: {0}")]
    Scratch(#[source] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recognition_failure_keeps_provider_message() {
        let err = PipelineError::RecognitionFailure(ProviderError::Status {
            status: 500,
            body: "overloaded".to_string(),
        });

        assert_eq!(
            err.to_string(),
            "Recognition failed: provider returned status 500: overloaded"
        );
        assert!(std::error::Error::source(&err).is_some());
    }
}
