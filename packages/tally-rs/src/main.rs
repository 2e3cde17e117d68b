mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Args, Commands};
use std::path::{Path, PathBuf};
use tally_rs::prelude::*;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() {
  let args = Args::parse();
  init_tracing(args.verbose);

  if let Err(e) = run(args).await {
    eprintln!("Error: {:#}", e);
    std::process::exit(1);
  }
}

fn init_tracing(verbose: bool) {
  let default_level = if verbose { "debug" } else { "warn" };
  let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

  let _ = tracing_subscriber::registry()
    .with(filter)
    .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
    .try_init();
}

async fn run(args: Args) -> Result<()> {
  match args.command {
    Commands::Version => {
      println!("tally {}", env!("CARGO_PKG_VERSION"));
    }
    Commands::Extract {
      input,
      config,
      table_aware,
      reference_date,
      output,
      compact,
    } => {
      let mut config = load_or_default(config.as_deref())?;
      if table_aware {
        config.mode = ExtractionMode::TableAware;
      }

      let mut extractor = ReceiptExtractor::new(config)?;
      if let Some(date) = reference_date {
        extractor = extractor.with_reference_date(date);
      }

      let document = load_document(&input).await?;
      let record = extractor.extract(&document);
      info!(
        input = %input.display(),
        overall = record.overall_confidence,
        "extraction complete"
      );

      let json = if compact {
        serde_json::to_string(&record)?
      } else {
        serde_json::to_string_pretty(&record)?
      };
      emit(&json, output).await?;
    }
    Commands::Lines {
      input,
      min_confidence,
      tolerance,
    } => {
      let document = load_document(&input).await?;
      let words = filter_by_confidence(document.words(), min_confidence);
      for (i, line) in group_into_lines(words, tolerance).iter().enumerate() {
        println!("{:>3}: {}", i + 1, line.text());
      }
    }
    Commands::Batch {
      inputs,
      config,
      max_concurrent,
      output,
    } => {
      let options = BatchOptions {
        inputs,
        config: load_or_default(config.as_deref())?,
        max_concurrent_files: max_concurrent,
        reference_date: None,
      };
      let result = BatchRunner::new(options)?.run().await?;
      emit(&serde_json::to_string_pretty(&result)?, output).await?;
    }
    Commands::Config { output } => {
      let config = ExtractionConfig::default();
      match output {
        Some(path) => save_config(&config, &path)?,
        None => print!("{}", toml::to_string_pretty(&config)?),
      }
    }
  }

  Ok(())
}

fn load_or_default(path: Option<&Path>) -> Result<ExtractionConfig> {
  match path {
    Some(path) => load_config(path),
    None => Ok(ExtractionConfig::default()),
  }
}

async fn load_document(path: &Path) -> Result<Document> {
  VisionJsonSource::new()
    .load(&OcrInput::FilePath(path.to_path_buf()))
    .await
    .with_context(|| format!("Failed to load OCR payload {}", path.display()))
}

async fn emit(content: &str, output: Option<PathBuf>) -> Result<()> {
  match output {
    Some(path) => {
      tokio::fs::write(&path, content)
        .await
        .with_context(|| format!("Failed to write {}", path.display()))?;
      info!("Output written to {}", path.display());
    }
    None => println!("{}", content),
  }
  Ok(())
}
