use async_trait::async_trait;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use crate::config::Config;

pub mod openai;

pub use openai::{OpenAiChat, OpenAiWhisper};

/// Failure reported by an external provider
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("request failed: {0}")]
    Request(String),

    #[error("provider returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("invalid response: {0}")]
    InvalidResponse(String),

    #[error("timed out after {0:?}")]
    Timeout(Duration),
}

/// External speech-recognition capability
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SpeechRecognizer: Send + Sync {
    /// Recognize the speech in a media file. `language_code` is a recognition code such as `en`.
    async fn recognize(&self, audio: &Path, language_code: &str) -> Result<String, ProviderError>;
}

/// External text-generation capability
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn complete(
        &self,
        system_instruction: &str,
        user_text: &str,
        temperature: f32,
        max_output_tokens: u32,
    ) -> Result<String, ProviderError>;
}

/// The external capabilities available to a pipeline. Built once and shared read-only.
#[derive(Clone, Default)]
pub struct Capabilities {
    pub recognizer: Option<Arc<dyn SpeechRecognizer>>,
    pub generator: Option<Arc<dyn TextGenerator>>,
}

impl Capabilities {
    pub fn new(
        recognizer: Option<Arc<dyn SpeechRecognizer>>,
        generator: Option<Arc<dyn TextGenerator>>,
    ) -> Self {
        Self { recognizer, generator }
    }

    /// Build OpenAI-compatible clients for every provider that has an API key
    pub fn from_config(config: &Config) -> Self {
        let recognizer = config
            .recognition
            .api_key
            .as_ref()
            .filter(|_| config.recognition_configured())
            .map(|key| {
                Arc::new(OpenAiWhisper::new(
                    key.clone(),
                    config.recognition.base_url.clone(),
                    config.recognition.model.clone(),
                )) as Arc<dyn SpeechRecognizer>
            });

        let generator = config
            .text_generation
            .api_key
            .as_ref()
            .filter(|_| config.text_generation_configured())
            .map(|key| {
                Arc::new(OpenAiChat::new(
                    key.clone(),
                    config.text_generation.base_url.clone(),
                    config.text_generation.model.clone(),
                )) as Arc<dyn TextGenerator>
            });

        tracing::debug!(
            recognition = recognizer.is_some(),
            text_generation = generator.is_some(),
            "Configured external capabilities"
        );

        Self { recognizer, generator }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capabilities_follow_api_keys() {
        let mut config = Config::default();
        config.recognition.api_key = Some("sk-test".to_string());
        config.text_generation.api_key = None;

        let caps = Capabilities::from_config(&config);

        assert!(caps.recognizer.is_some());
        assert!(caps.generator.is_none());
    }

    #[test]
    fn test_blank_keys_leave_capabilities_unconfigured() {
        let mut config = Config::default();
        config.recognition.api_key = Some(String::new());

        let caps = Capabilities::from_config(&config);

        assert!(caps.recognizer.is_none());
    }
}
