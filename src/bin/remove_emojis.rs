//! Emoji remover
//!
//! Strips emoji from a fixed set of project files.

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;

use telemetry_demo::config::LoggingConfig;
use telemetry_demo::emoji::{clean_files, FileOutcome, DEFAULT_FILES};

/// Remove emoji characters from project text files
#[derive(Parser)]
#[command(name = "remove-emojis")]
#[command(version = telemetry_demo::VERSION)]
struct Cli {
    /// Directory the file names are resolved against (default: current directory)
    #[arg(short, long)]
    base_dir: Option<PathBuf>,

    /// Files to clean (defaults to the project docs and scripts)
    files: Vec<String>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    telemetry_demo::util::init_tracing(&LoggingConfig {
        level: "warn".to_string(),
        ..LoggingConfig::default()
    })?;

    let base_dir = match cli.base_dir {
        Some(dir) => dir,
        None => std::env::current_dir().context("Failed to resolve the current directory")?,
    };

    let files: Vec<String> = if cli.files.is_empty() {
        DEFAULT_FILES.iter().map(|f| f.to_string()).collect()
    } else {
        cli.files
    };

    let report = clean_files(&base_dir, files.as_slice());

    for (path, outcome) in &report.files {
        match outcome {
            FileOutcome::Cleaned => println!("Cleaned: {}", path.display()),
            FileOutcome::Unchanged => {}
            FileOutcome::NotFound => {
                let name = path.strip_prefix(&base_dir).unwrap_or(path);
                println!("File not found: {}", name.display());
            }
            FileOutcome::Failed(e) => println!("Error processing {}: {}", path.display(), e),
        }
    }

    println!("\nTotal files cleaned: {}", report.cleaned_count());
    Ok(())
}
