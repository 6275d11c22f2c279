use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use crate::providers::{ProviderError, SpeechRecognizer};
use crate::PipelineError;

/// Recognition stage: wraps the optional speech-recognition capability
#[derive(Clone)]
pub struct Recognizer {
    engine: Option<Arc<dyn SpeechRecognizer>>,
    timeout: Duration,
}

impl Recognizer {
    pub fn new(engine: Option<Arc<dyn SpeechRecognizer>>, timeout: Duration) -> Self {
        Self { engine, timeout }
    }

    pub fn is_configured(&self) -> bool {
        self.engine.is_some()
    }

    /// Full recognized text of `audio`, using `language_code` as the language hint
    pub async fn recognize(&self, audio: &Path, language_code: &str) -> Result<String, PipelineError> {
        let engine = self
            .engine
            .as_ref()
            .ok_or(PipelineError::RecognizerUnavailable)?;

        let started = std::time::Instant::now();
        let text = tokio::time::timeout(self.timeout, engine.recognize(audio, language_code))
            .await
            .map_err(|_| ProviderError::Timeout(self.timeout))
            .and_then(|result| result)
            .map_err(PipelineError::RecognitionFailure)?;

        tracing::info!(
            language = language_code,
            chars = text.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Recognized speech"
        );
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::MockSpeechRecognizer;
    use async_trait::async_trait;

    struct SlowEngine;

    #[async_trait]
    impl SpeechRecognizer for SlowEngine {
        async fn recognize(&self, _audio: &Path, _language_code: &str) -> Result<String, ProviderError> {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok("too late".to_string())
        }
    }

    #[tokio::test]
    async fn test_unconfigured_recognizer_fails_immediately() {
        let recognizer = Recognizer::new(None, Duration::from_secs(5));

        let err = recognizer.recognize(Path::new("/nonexistent.mp3"), "en").await.unwrap_err();

        assert!(matches!(err, PipelineError::RecognizerUnavailable));
    }

    #[tokio::test]
    async fn test_passes_language_code_to_engine() {
        let mut engine = MockSpeechRecognizer::new();
        engine
            .expect_recognize()
            .withf(|_, code| code == "gu")
            .times(1)
            .returning(|_, _| Ok("kem cho".to_string()));

        let recognizer = Recognizer::new(Some(Arc::new(engine)), Duration::from_secs(5));
        let text = recognizer.recognize(Path::new("a.mp3"), "gu").await.unwrap();

        assert_eq!(text, "kem cho");
    }

    #[tokio::test]
    async fn test_provider_error_becomes_recognition_failure() {
        let mut engine = MockSpeechRecognizer::new();
        engine
            .expect_recognize()
            .returning(|_, _| Err(ProviderError::Request("connection reset".to_string())));

        let recognizer = Recognizer::new(Some(Arc::new(engine)), Duration::from_secs(5));
        let err = recognizer.recognize(Path::new("a.mp3"), "en").await.unwrap_err();

        assert!(matches!(
            err,
            PipelineError::RecognitionFailure(ProviderError::Request(ref msg)) if msg == "connection reset"
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_is_a_recognition_failure() {
        let recognizer = Recognizer::new(Some(Arc::new(SlowEngine)), Duration::from_secs(1));

        let err = recognizer.recognize(Path::new("a.mp3"), "en").await.unwrap_err();

        assert!(matches!(
            err,
            PipelineError::RecognitionFailure(ProviderError::Timeout(limit)) if limit == Duration::from_secs(1)
        ));
    }
}
