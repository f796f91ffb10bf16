//! CLI for the offline side of the classifier
//!
//! # Usage
//!
//! ```bash
//! # Show shape and class distribution of the raw dataset
//! phish-train inspect
//!
//! # Normalize the raw dataset into the cleaned CSV
//! phish-train preprocess
//!
//! # Train from the raw dataset, or from an existing cleaned CSV
//! phish-train train
//! phish-train train --from-cleaned
//! phish-train train --json
//!
//! # Download configured remote files that are missing locally
//! phish-train fetch
//!
//! # Classify one email with the saved artifacts
//! phish-train predict "Your account has been suspended"
//! ```

use anyhow::Context;
use clap::{Parser, Subcommand};
use phish_rs::dataset::Dataset;
use phish_rs::fetch::fetch_all;
use phish_rs::{telemetry, Config, Predictor, TrainingPipeline};
use std::path::PathBuf;
use tracing::info;

#[derive(Parser)]
#[command(name = "phish-train")]
#[command(about = "Train and query the phishing email classifier", long_about = None)]
struct Cli {
    /// Path to a TOML config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print shape, class distribution and the first rows of the raw dataset
    Inspect {
        /// Number of rows to preview
        #[arg(short = 'n', long, default_value_t = 5)]
        rows: usize,
    },
    /// Write the normalized dataset
    Preprocess,
    /// Train, evaluate and save the vectorizer/model pair
    Train {
        /// Start from the cleaned CSV instead of the raw dataset
        #[arg(long)]
        from_cleaned: bool,
        /// Print the outcome as JSON
        #[arg(long)]
        json: bool,
    },
    /// Download remote files that are not present locally
    Fetch,
    /// Classify one email
    Predict {
        /// Email text
        text: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = Config::load(cli.config.as_deref()).context("failed to load configuration")?;
    telemetry::init(&config.logging)?;

    match cli.command {
        Commands::Inspect { rows } => {
            let dataset = Dataset::load_raw(&config.data.raw_path)?;
            println!("{}", dataset.summary());
            println!();
            for record in dataset.records().iter().take(rows) {
                let text = record.text.as_deref().unwrap_or("");
                let preview: String = text.chars().take(80).collect();
                println!("[{}] {}", record.label, preview.replace('\n', " "));
            }
        }
        Commands::Preprocess => {
            let cleaned = TrainingPipeline::new(config.clone()).preprocess()?;
            println!(
                "Wrote {} rows to {}",
                cleaned.len(),
                config.data.cleaned_path.display()
            );
        }
        Commands::Train { from_cleaned, json } => {
            let pipeline = TrainingPipeline::new(config);
            let outcome = if from_cleaned {
                pipeline.run_from_cleaned()?
            } else {
                pipeline.run()?
            };
            if json {
                println!("{}", serde_json::to_string_pretty(&outcome)?);
            } else {
                println!("{}", outcome);
            }
        }
        Commands::Fetch => {
            if config.remote_files.is_empty() {
                println!("No remote files configured");
                return Ok(());
            }
            let client = reqwest::Client::new();
            let present = fetch_all(&client, &config.remote_files).await;
            println!("{}/{} files present", present, config.remote_files.len());
            if present < config.remote_files.len() {
                anyhow::bail!("some remote files could not be fetched");
            }
        }
        Commands::Predict { text } => {
            let predictor = Predictor::from_config(&config)?;
            let prediction = predictor.predict_one(&text)?;
            info!("Prediction made with run {}", predictor.artifacts().run_id);
            let verdict = if prediction.is_phishing() {
                "phishing"
            } else {
                "legitimate"
            };
            println!(
                "{} ({}), probability {:.4}",
                prediction.label, verdict, prediction.probability
            );
        }
    }

    Ok(())
}
