use async_trait::async_trait;
use reqwest::multipart;
use reqwest::Client;
use serde::Deserialize;
use std::path::Path;

use super::{ProviderError, SpeechRecognizer, TextGenerator};
use crate::fetcher::MediaFormat;

/// Speech recognition through an OpenAI-compatible `/audio/transcriptions` endpoint
pub struct OpenAiWhisper {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
}

impl OpenAiWhisper {
    pub fn new(api_key: String, base_url: String, model: String) -> Self {
        Self {
            client: Client::new(),
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            model,
        }
    }
}

#[derive(Deserialize)]
struct TranscriptionResponse {
    text: String,
}

#[async_trait]
impl SpeechRecognizer for OpenAiWhisper {
    async fn recognize(&self, audio: &Path, language_code: &str) -> Result<String, ProviderError> {
        let url = format!("{}/audio/transcriptions", self.base_url);

        let audio_data = fs_err::tokio::read(audio)
            .await
            .map_err(|e| ProviderError::Request(format!("read audio: {}", e)))?;
        let format = MediaFormat::from_path(audio).unwrap_or(MediaFormat::Mp3);
        let file_name = audio
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| format!("audio.{}", format.as_str()));

        let file_part = multipart::Part::bytes(audio_data)
            .file_name(file_name)
            .mime_str(format.mime_type())
            .map_err(|e| ProviderError::Request(format!("mime: {}", e)))?;

        let form = multipart::Form::new()
            .text("model", self.model.clone())
            .text("language", language_code.to_string())
            .text("response_format", "json")
            .part("file", file_part);

        tracing::debug!(model = %self.model, language = language_code, "Sending audio to recognition API");

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .multipart(form)
            .send()
            .await
            .map_err(|e| ProviderError::Request(e.to_string()))?;

        let body: TranscriptionResponse = read_json(response).await?;

        tracing::info!(chars = body.text.len(), "Recognition completed");
        Ok(body.text.trim().to_string())
    }
}

/// Text generation through an OpenAI-compatible `/chat/completions` endpoint
pub struct OpenAiChat {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
}

impl OpenAiChat {
    pub fn new(api_key: String, base_url: String, model: String) -> Self {
        Self {
            client: Client::new(),
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            model,
        }
    }
}

#[derive(Deserialize)]
struct ChatCompletion {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChatMessage,
}

#[derive(Deserialize)]
struct ChatMessage {
    content: Option<String>,
}

#[async_trait]
impl TextGenerator for OpenAiChat {
    async fn complete(
        &self,
        system_instruction: &str,
        user_text: &str,
        temperature: f32,
        max_output_tokens: u32,
    ) -> Result<String, ProviderError> {
        let url = format!("{}/chat/completions", self.base_url);

        let body = serde_json::json!({
            "model": self.model,
            "messages": [
                { "role": "system", "content": system_instruction },
                { "role": "user", "content": user_text }
            ],
            "temperature": temperature,
            "max_tokens": max_output_tokens,
        });

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| ProviderError::Request(e.to_string()))?;

        let completion: ChatCompletion = read_json(response).await?;

        completion
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .map(|content| content.trim().to_string())
            .ok_or_else(|| ProviderError::InvalidResponse("no completion choices".to_string()))
    }
}

async fn read_json<T: serde::de::DeserializeOwned>(response: reqwest::Response) -> Result<T, ProviderError> {
    let status = response.status();
    if !status.is_success() {
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "unknown error".to_string());
        return Err(ProviderError::Status {
            status: status.as_u16(),
            body,
        });
    }

    let raw = response
        .bytes()
        .await
        .map_err(|e| ProviderError::Request(format!("body: {}", e)))?;

    serde_json::from_slice(&raw).map_err(|e| ProviderError::InvalidResponse(e.to_string()))
}
