use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

const RECOGNITION_KEY_ENV: &str = "LECTURE_SCRIBE_RECOGNITION_API_KEY";
const TEXT_KEY_ENV: &str = "LECTURE_SCRIBE_TEXT_API_KEY";
const SHARED_KEY_ENV: &str = "OPENAI_API_KEY";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Speech recognition provider
    pub recognition: RecognitionConfig,

    /// Text generation provider used for translation and summaries
    pub text_generation: TextGenerationConfig,

    /// PDF report settings
    pub report: ReportConfig,

    /// Application settings
    pub app: AppConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RecognitionConfig {
    /// API key; recognition is unavailable without one
    pub api_key: Option<String>,

    /// Base URL of an OpenAI-compatible API
    pub base_url: String,

    /// Transcription model
    pub model: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TextGenerationConfig {
    /// API key; translation and summaries fall back without one
    pub api_key: Option<String>,

    /// Base URL of an OpenAI-compatible API
    pub base_url: String,

    /// Chat completion model
    pub model: String,

    pub translation_temperature: f32,
    pub translation_max_tokens: u32,
    pub summary_temperature: f32,
    pub summary_max_tokens: u32,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    /// TrueType font for report text. Needed for scripts outside Latin-1, such as Devanagari.
    pub font_path: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Scratch directory for downloaded media
    pub scratch_dir: Option<PathBuf>,

    /// Upper bound for every external call, in seconds
    pub request_timeout_secs: u64,
}

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

impl Default for RecognitionConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            model: "whisper-1".to_string(),
        }
    }
}

impl Default for TextGenerationConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            model: "gpt-4o-mini".to_string(),
            translation_temperature: 0.3,
            translation_max_tokens: 4000,
            summary_temperature: 0.5,
            summary_max_tokens: 500,
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            scratch_dir: None,
            request_timeout_secs: 300,
        }
    }
}

impl Config {
    /// Load configuration from the default location, creating it when missing
    pub async fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        if config_path.exists() {
            Self::load_from(&config_path).await
        } else {
            let config = Self::default();
            config.save_to(&config_path).await?;
            Ok(config.with_env_overrides())
        }
    }

    /// Load configuration from an explicit file
    pub async fn load_from(path: &Path) -> Result<Self> {
        let content = fs_err::tokio::read_to_string(path)
            .await
            .context("Failed to read config file")?;

        let config: Config = serde_yaml::from_str(&content)
            .context("Failed to parse config file")?;

        config.validate()?;
        Ok(config.with_env_overrides())
    }

    /// Save configuration to a file
    pub async fn save_to(&self, config_path: &Path) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            fs_err::tokio::create_dir_all(parent).await?;
        }

        let content = serde_yaml::to_string(self)
            .context("Failed to serialize config")?;

        fs_err::tokio::write(config_path, content)
            .await
            .context("Failed to write config file")?;

        tracing::debug!(path = %config_path.display(), "Wrote configuration file");
        Ok(())
    }

    /// Get configuration file path
    pub fn config_path() -> Result<PathBuf> {
        // First try current directory for easy testing
        let local_config = PathBuf::from("config.yaml");
        if local_config.exists() {
            return Ok(local_config);
        }

        let config_dir = dirs::config_dir()
            .context("Could not determine config directory")?;

        Ok(config_dir.join("lecture-scribe").join("config.yaml"))
    }

    /// Validate configuration
    fn validate(&self) -> Result<()> {
        Url::parse(&self.recognition.base_url)
            .with_context(|| format!("Invalid recognition base_url: {}", self.recognition.base_url))?;
        Url::parse(&self.text_generation.base_url).with_context(|| {
            format!("Invalid text_generation base_url: {}", self.text_generation.base_url)
        })?;

        if self.app.request_timeout_secs == 0 {
            anyhow::bail!("app.request_timeout_secs must be greater than zero");
        }

        Ok(())
    }

    /// Fill missing API keys from the environment
    pub fn with_env_overrides(mut self) -> Self {
        let shared = env_key(SHARED_KEY_ENV);

        if !has_key(&self.recognition.api_key) {
            self.recognition.api_key = env_key(RECOGNITION_KEY_ENV).or_else(|| shared.clone());
        }
        if !has_key(&self.text_generation.api_key) {
            self.text_generation.api_key = env_key(TEXT_KEY_ENV).or(shared);
        }

        self
    }

    pub fn recognition_configured(&self) -> bool {
        has_key(&self.recognition.api_key)
    }

    pub fn text_generation_configured(&self) -> bool {
        has_key(&self.text_generation.api_key)
    }

    /// Scratch directory for downloaded media
    pub fn scratch_dir(&self) -> PathBuf {
        self.app
            .scratch_dir
            .clone()
            .unwrap_or_else(|| std::env::temp_dir().join("lecture-scribe"))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.app.request_timeout_secs)
    }

    /// Display current configuration
    pub fn display(&self) {
        println!("Current Configuration:");
        println!("  Recognition: {} ({})", self.recognition.model, self.recognition.base_url);
        println!("  Recognition key: {}", describe_key(&self.recognition.api_key));
        println!(
            "  Text generation: {} ({})",
            self.text_generation.model, self.text_generation.base_url
        );
        println!("  Text generation key: {}", describe_key(&self.text_generation.api_key));
        match &self.report.font_path {
            Some(path) => println!("  Report font: {}", path.display()),
            None => println!("  Report font: builtin Helvetica"),
        }
        println!("  Scratch directory: {}", self.scratch_dir().display());
        println!("  Request timeout: {}s", self.app.request_timeout_secs);
    }
}

fn env_key(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|value| !value.trim().is_empty())
}

fn has_key(key: &Option<String>) -> bool {
    key.as_deref().is_some_and(|k| !k.trim().is_empty())
}

fn describe_key(key: &Option<String>) -> &'static str {
    if has_key(key) {
        "configured"
    } else {
        "not set"
    }
}
