use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "lecture-scribe",
    about = "Lecture Scribe - Turn lecture recordings into a transcript, a summary and a PDF report",
    version,
    long_about = "Downloads a lecture recording from a URL, converts the speech to text, optionally translates it, summarizes it and renders a readable report."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable progress indicators
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Configuration file (defaults to ./config.yaml or the user config directory)
    #[arg(long, global = true, value_name = "FILE", env = "LECTURE_SCRIBE_CONFIG")]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Transcribe and summarize a recording from a URL
    Transcribe {
        /// HTTP or HTTPS URL of the audio or video file
        #[arg(value_name = "URL")]
        url: String,

        /// Title of the lecture, used in the report and its filename
        #[arg(short, long)]
        title: String,

        /// Language of the transcript and summary (e.g. English, Hindi, Gujarati)
        #[arg(short, long, default_value = "English", value_name = "LANG")]
        language: String,

        /// Language spoken in the recording, when it differs from --language
        #[arg(long, value_name = "LANG")]
        spoken_language: Option<String>,

        /// Output format
        #[arg(short, long, value_enum, default_value = "text")]
        format: OutputFormat,

        /// Output file path (prints to console if not specified; PDF defaults to a title-based name)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },

    /// Render a PDF report from a saved JSON result
    Render {
        /// JSON file written by `transcribe --format json`
        #[arg(short, long, value_name = "FILE")]
        input: PathBuf,

        /// Title of the lecture
        #[arg(short, long)]
        title: String,

        /// Output file path (defaults to a title-based name)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },

    /// Show or create the configuration file
    Config {
        /// Show current configuration
        #[arg(short, long)]
        show: bool,
    },

    /// List supported languages
    Languages,
}

#[derive(ValueEnum, Clone, Debug)]
pub enum OutputFormat {
    /// Plain text
    Text,
    /// JSON result (can be rendered later)
    Json,
    /// PDF report
    Pdf,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Pdf => write!(f, "pdf"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_definition_is_valid() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_transcribe_defaults() {
        let cli = Cli::parse_from(["lecture-scribe", "transcribe", "https://host/a.mp3", "--title", "Intro"]);

        match cli.command {
            Commands::Transcribe { language, format, spoken_language, .. } => {
                assert_eq!(language, "English");
                assert!(matches!(format, OutputFormat::Text));
                assert!(spoken_language.is_none());
            }
            _ => panic!("expected transcribe command"),
        }
    }
}
