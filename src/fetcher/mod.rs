use futures_util::StreamExt;
use indicatif::{ProgressBar, ProgressStyle};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::io::AsyncWriteExt;

use crate::utils;
use crate::PipelineError;

/// Media formats recognised from a URL's file extension
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MediaFormat {
    Mp3,
    M4a,
    Wav,
    Flac,
    Ogg,
    Webm,
    Mp4,
}

impl MediaFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaFormat::Mp3 => "mp3",
            MediaFormat::M4a => "m4a",
            MediaFormat::Wav => "wav",
            MediaFormat::Flac => "flac",
            MediaFormat::Ogg => "ogg",
            MediaFormat::Webm => "webm",
            MediaFormat::Mp4 => "mp4",
        }
    }

    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "mp3" => Some(MediaFormat::Mp3),
            "m4a" | "aac" => Some(MediaFormat::M4a),
            "wav" => Some(MediaFormat::Wav),
            "flac" => Some(MediaFormat::Flac),
            "ogg" | "oga" => Some(MediaFormat::Ogg),
            "webm" => Some(MediaFormat::Webm),
            "mp4" | "m4v" | "mov" => Some(MediaFormat::Mp4),
            _ => None,
        }
    }

    /// Format of the media behind a URL, defaulting to MP3 when the path has no known extension
    pub fn from_url(url: &str) -> Self {
        url::Url::parse(url)
            .ok()
            .and_then(|parsed| {
                parsed
                    .path_segments()
                    .and_then(|segments| segments.last().map(str::to_string))
            })
            .and_then(|filename| {
                Path::new(&filename)
                    .extension()
                    .and_then(|ext| Self::from_extension(&ext.to_string_lossy()))
            })
            .unwrap_or(MediaFormat::Mp3)
    }

    /// Format of a local file, by extension
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|ext| Self::from_extension(&ext.to_string_lossy()))
    }

    /// Get MIME type for the format
    pub fn mime_type(&self) -> &'static str {
        match self {
            MediaFormat::Mp3 => "audio/mpeg",
            MediaFormat::M4a => "audio/mp4",
            MediaFormat::Wav => "audio/wav",
            MediaFormat::Flac => "audio/flac",
            MediaFormat::Ogg => "audio/ogg",
            MediaFormat::Webm => "audio/webm",
            MediaFormat::Mp4 => "video/mp4",
        }
    }
}

/// Streams remote media into a caller-supplied file
#[derive(Clone)]
pub struct Fetcher {
    client: Client,
    timeout: Duration,
    show_progress: bool,
}

impl Fetcher {
    pub fn new(timeout: Duration) -> Self {
        Self {
            client: Client::new(),
            timeout,
            show_progress: false,
        }
    }

    /// Show a progress bar on stderr while downloading
    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    /// Download `url` into `dest`. No retries; a partially written file is removed on failure.
    pub async fn download(&self, url: &str, dest: &Path) -> Result<PathBuf, PipelineError> {
        let parsed = utils::validate_url(url)
            .map_err(|e| PipelineError::DownloadFailure(e.to_string()))?;

        tracing::info!(url = %parsed, path = %dest.display(), "Downloading media");

        let outcome = match tokio::time::timeout(self.timeout, self.stream_to_file(parsed, dest)).await {
            Ok(outcome) => outcome,
            Err(_) => Err(format!("timed out after {}s", self.timeout.as_secs())),
        };

        match outcome {
            Ok(bytes) => {
                tracing::info!(
                    path = %dest.display(),
                    size = %utils::format_file_size(bytes),
                    "Download complete"
                );
                Ok(dest.to_path_buf())
            }
            Err(reason) => {
                remove_partial(dest).await;
                Err(PipelineError::DownloadFailure(reason))
            }
        }
    }

    async fn stream_to_file(&self, url: url::Url, dest: &Path) -> Result<u64, String> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| format!("request error: {}", e))?;

        if !response.status().is_success() {
            return Err(format!("HTTP {}", response.status()));
        }

        let progress = self.progress_bar(response.content_length());

        let mut file = fs_err::tokio::File::create(dest)
            .await
            .map_err(|e| e.to_string())?;
        let mut downloaded = 0u64;
        let mut stream = response.bytes_stream();

        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|e| format!("stream error: {}", e))?;
            file.write_all(&chunk).await.map_err(|e| e.to_string())?;
            downloaded += chunk.len() as u64;
            progress.set_position(downloaded);
        }

        file.flush().await.map_err(|e| e.to_string())?;
        progress.finish_and_clear();

        Ok(downloaded)
    }

    fn progress_bar(&self, total: Option<u64>) -> ProgressBar {
        if !self.show_progress {
            return ProgressBar::hidden();
        }

        let progress = ProgressBar::new(total.unwrap_or(0));
        let style = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {bytes}/{total_bytes} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        progress.set_style(style);
        progress.set_message("Downloading media...");
        progress
    }
}

async fn remove_partial(dest: &Path) {
    match fs_err::tokio::remove_file(dest).await {
        Ok(()) => tracing::debug!(path = %dest.display(), "Removed partial download"),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => tracing::warn!(error = %e, "Failed to remove partial download"),
    }
}
