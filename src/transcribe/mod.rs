use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Instant;

use crate::config::Config;
use crate::fetcher::{Fetcher, MediaFormat};
use crate::language::Language;
use crate::providers::Capabilities;
use crate::PipelineError;

pub mod recognizer;
pub mod scratch;
pub mod summarizer;
pub mod translator;

pub use recognizer::Recognizer;
pub use scratch::TemporaryMediaFile;
pub use summarizer::Summarizer;
pub use translator::Translator;

/// A request to transcribe one remote recording
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranscriptionRequest {
    pub media_url: String,
    pub title: String,
    /// Human-readable language name the transcript and summary should be in
    pub target_language: String,
    /// Language spoken in the recording, when it differs from the target
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spoken_language: Option<String>,
}

impl TranscriptionRequest {
    pub fn new(media_url: impl Into<String>, title: impl Into<String>, target_language: impl Into<String>) -> Self {
        Self {
            media_url: media_url.into(),
            title: title.into(),
            target_language: target_language.into(),
            spoken_language: None,
        }
    }

    pub fn with_spoken_language(mut self, spoken_language: impl Into<String>) -> Self {
        self.spoken_language = Some(spoken_language.into());
        self
    }
}

/// Transcript and synopsis produced by one pipeline run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranscriptionResult {
    pub transcript: String,
    pub summary: String,
    /// The requested target language name
    pub language: String,
}

/// Download, recognize, translate and summarize one recording per call.
///
/// The pipeline holds only read-only state, so one instance can serve many concurrent calls.
#[derive(Clone)]
pub struct TranscriptionPipeline {
    fetcher: Fetcher,
    recognizer: Recognizer,
    translator: Translator,
    summarizer: Summarizer,
    scratch_dir: PathBuf,
}

impl TranscriptionPipeline {
    pub fn new(config: &Config, capabilities: Capabilities) -> Self {
        let timeout = config.request_timeout();
        let text = &config.text_generation;

        Self {
            fetcher: Fetcher::new(timeout),
            recognizer: Recognizer::new(capabilities.recognizer, timeout),
            translator: Translator::new(
                capabilities.generator.clone(),
                text.translation_temperature,
                text.translation_max_tokens,
                timeout,
            ),
            summarizer: Summarizer::new(
                capabilities.generator,
                text.summary_temperature,
                text.summary_max_tokens,
                timeout,
            ),
            scratch_dir: config.scratch_dir(),
        }
    }

    /// Show a download progress bar
    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.fetcher = self.fetcher.with_progress(show_progress);
        self
    }

    /// Run the whole pipeline for one request.
    ///
    /// The temporary media file is removed on every exit path, including when this future is
    /// dropped before completion.
    pub async fn generate_transcription(
        &self,
        request: &TranscriptionRequest,
    ) -> Result<TranscriptionResult, PipelineError> {
        let started = Instant::now();

        fs_err::tokio::create_dir_all(&self.scratch_dir)
            .await
            .map_err(PipelineError::Scratch)?;

        let format = MediaFormat::from_url(&request.media_url);
        let media = TemporaryMediaFile::reserve(&self.scratch_dir, format.as_str());

        let outcome = self.run_stages(request, media.path()).await;
        media.release().await;

        match &outcome {
            Ok(result) => tracing::info!(
                title = %request.title,
                language = %result.language,
                elapsed_ms = started.elapsed().as_millis() as u64,
                "Transcription pipeline finished"
            ),
            Err(e) => tracing::error!(title = %request.title, error = %e, "Transcription pipeline failed"),
        }

        outcome
    }

    async fn run_stages(
        &self,
        request: &TranscriptionRequest,
        media_path: &Path,
    ) -> Result<TranscriptionResult, PipelineError> {
        if !self.recognizer.is_configured() {
            return Err(PipelineError::RecognizerUnavailable);
        }

        self.fetcher.download(&request.media_url, media_path).await?;

        let target = Language::resolve(&request.target_language);
        let spoken = request
            .spoken_language
            .as_deref()
            .map(Language::resolve)
            .unwrap_or(target);

        let mut transcript = self.recognizer.recognize(media_path, spoken.code()).await?;

        if target != Language::English && spoken.code() == Language::English.code() {
            transcript = self
                .translator
                .translate(&transcript, &request.target_language)
                .await;
        } else {
            tracing::debug!(
                target_language = target.name(),
                spoken_language = spoken.name(),
                "Skipping translation"
            );
        }

        let summary = self
            .summarizer
            .summarize(&transcript, target.name())
            .await;

        Ok(TranscriptionResult {
            transcript,
            summary,
            language: request.target_language.clone(),
        })
    }
}
