use anyhow::Result;
use clap::Parser;
use console::style;
use std::path::Path;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use lecture_scribe::cli::{Cli, Commands};
use lecture_scribe::config::Config;
use lecture_scribe::language::Language;
use lecture_scribe::output::{self, ReportRenderer, ReportRequest};
use lecture_scribe::providers::Capabilities;
use lecture_scribe::transcribe::{TranscriptionPipeline, TranscriptionRequest};
use lecture_scribe::utils;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let default_filter = if cli.verbose {
        "lecture_scribe=debug"
    } else {
        "lecture_scribe=info"
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config_file = cli.config.clone();
    let show_progress = !cli.quiet;

    match cli.command {
        Commands::Transcribe {
            url,
            title,
            language,
            spoken_language,
            format,
            output: destination,
        } => {
            let config = load_config(config_file.as_deref()).await?;
            let capabilities = Capabilities::from_config(&config);
            let renderer = ReportRenderer::from_config(&config.report).await?;
            let pipeline = TranscriptionPipeline::new(&config, capabilities).with_progress(show_progress);

            let mut request = TranscriptionRequest::new(url, title.clone(), language);
            if let Some(spoken) = spoken_language {
                request = request.with_spoken_language(spoken);
            }

            tracing::info!(url = %request.media_url, "Starting transcription");
            let started = std::time::Instant::now();
            let result = pipeline.generate_transcription(&request).await?;

            if let Some(path) =
                output::write_result(&result, &title, &format, destination.as_deref(), &renderer).await?
            {
                eprintln!(
                    "{} {} ({})",
                    style("Saved").green().bold(),
                    path.display(),
                    utils::format_duration(started.elapsed().as_secs_f64())
                );
            }
        }
        Commands::Render {
            input,
            title,
            output: destination,
        } => {
            let config = load_config(config_file.as_deref()).await?;
            let renderer = ReportRenderer::from_config(&config.report).await?;
            let result = output::load_result(&input).await?;
            let request = ReportRequest::from_result(&result, &title);
            let bytes = renderer.render(&request).await?;

            let path = destination.unwrap_or_else(|| output::report_filename(&title).into());
            fs_err::tokio::write(&path, bytes).await?;
            eprintln!("{} {}", style("Report saved to").green().bold(), path.display());
        }
        Commands::Config { show } => {
            let config = load_config(config_file.as_deref()).await?;
            if show {
                config.display();
            } else {
                let path = match config_file {
                    Some(path) => path,
                    None => Config::config_path()?,
                };
                println!("Configuration file: {}", path.display());
                println!("Edit it to set provider API keys, or export OPENAI_API_KEY.");
            }
        }
        Commands::Languages => {
            println!("Supported languages:");
            for lang in Language::ALL {
                println!("  • {} ({})", style(lang.name()).bold(), lang.code());
            }
            println!("Unknown names fall back to English.");
        }
    }

    Ok(())
}

async fn load_config(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(path) => Config::load_from(path).await,
        None => Config::load().await,
    }
}
