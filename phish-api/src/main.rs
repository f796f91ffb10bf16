//! phish-api: Phishing detection HTTP server
//!
//! Loads the trained artifact pair once, then serves predictions until
//! stopped. Refuses to start when the artifacts are missing or unreadable.

use phish_api::ApiServer;
use phish_rs::fetch::fetch_all;
use phish_rs::{telemetry, Config, Predictor};
use std::path::PathBuf;
use tracing::{error, info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config_path = std::env::args().nth(1).map(PathBuf::from);
    let config = Config::load(config_path.as_deref())?;

    telemetry::init(&config.logging)?;
    info!("Starting phish-api v{}", env!("CARGO_PKG_VERSION"));

    match &config_path {
        Some(path) => info!("Loaded configuration from {}", path.display()),
        None => info!("No config file specified, using defaults and environment"),
    }

    // Pull remote datasets/artifacts that are not on disk yet
    if !config.remote_files.is_empty() {
        let client = reqwest::Client::new();
        let present = fetch_all(&client, &config.remote_files).await;
        if present < config.remote_files.len() {
            warn!(
                "{} of {} remote files are unavailable",
                config.remote_files.len() - present,
                config.remote_files.len()
            );
        }
    }

    let predictor = match Predictor::from_config(&config) {
        Ok(predictor) => predictor,
        Err(e) => {
            error!("Cannot load model artifacts: {}", e);
            if e.is_artifact_missing() {
                error!("Run `phish-train train` first to produce them");
            }
            return Err(e.into());
        }
    };
    info!(
        "Model run {} ready (normalize_input={})",
        predictor.artifacts().run_id,
        predictor.normalizes_input()
    );

    let server = ApiServer::new(predictor, &config.server);
    server.run().await?;

    Ok(())
}
