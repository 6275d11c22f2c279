use std::sync::Arc;
use std::time::Duration;

use crate::language::Language;
use crate::providers::{ProviderError, TextGenerator};

/// Translation stage. Degrades to the identity function: provider failures are logged and
/// the original text is returned.
#[derive(Clone)]
pub struct Translator {
    generator: Option<Arc<dyn TextGenerator>>,
    temperature: f32,
    max_tokens: u32,
    timeout: Duration,
}

impl Translator {
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

    pub async fn translate(&self, text: &str, target_language: &str) -> String {
        let target = Language::resolve(target_language);
        let generator = match &self.generator {
            Some(generator) if target != Language::English => generator,
            _ => return text.to_string(),
        };

        let instruction = format!(
            "You are a translator. Translate the following lecture transcript into {}. \
             Return only the translated text.",
            target.name()
        );

        let outcome = tokio::time::timeout(
            self.timeout,
            generator.complete(&instruction, text, self.temperature, self.max_tokens),
        )
        .await
        .map_err(|_| ProviderError::Timeout(self.timeout))
        .and_then(|result| result);

        match outcome {
            Ok(translated) => {
                tracing::info!(language = target.name(), chars = translated.len(), "Translated transcript");
                translated
            }
            Err(e) => {
                tracing::warn!(error = %e, language = target.name(), "Translation degraded, keeping original text");
                text.to_string()
            }
        }
    }
}
