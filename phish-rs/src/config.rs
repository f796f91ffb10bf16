//! Configuration for phish-rs
//!
//! Settings are layered: built-in defaults, then an optional TOML file, then
//! `PHISH__SECTION__KEY` environment variables, and finally `PORT` for the
//! listen port.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{PhishError, Result};
use crate::fetch::drive_download_url;

/// Main configuration
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub data: DataConfig,
    pub artifacts: ArtifactsConfig,
    pub training: TrainingConfig,
    pub server: ServerConfig,
    pub serving: ServingConfig,
    pub logging: LoggingConfig,
    pub remote_files: Vec<RemoteFile>,
}

/// Dataset locations
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct DataConfig {
    /// Raw CSV with `text_combined,label`
    pub raw_path: PathBuf,
    /// Preprocessed CSV with `clean_text,label`
    pub cleaned_path: PathBuf,
}

/// Where the trained vectorizer/model pair lives
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ArtifactsConfig {
    pub dir: PathBuf,
    pub vectorizer_file: String,
    pub model_file: String,
}

/// Training hyper-parameters
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct TrainingConfig {
    /// Vocabulary cap
    pub max_features: usize,
    /// Share of rows held out for evaluation
    pub test_ratio: f64,
    /// Split seed
    pub seed: u64,
    /// Optimizer iteration cap
    pub max_iterations: usize,
    /// Inverse L2 strength (C)
    pub regularization: f64,
    /// Gradient tolerance for convergence
    pub tolerance: f64,
}

/// HTTP listener settings
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Serve the HTML form at `/`
    pub enable_form: bool,
}

/// Inference behaviour
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ServingConfig {
    /// Apply the training-time normalizer to incoming text
    pub normalize_input: bool,
}

/// Log output settings
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default filter when `RUST_LOG` is unset
    pub level: String,
    /// `pretty` or `json`
    pub format: String,
}

/// A file to download on startup if it is not present locally
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct RemoteFile {
    /// Google Drive file id
    #[serde(default)]
    pub file_id: Option<String>,
    /// Direct URL, used when `file_id` is not set
    #[serde(default)]
    pub url: Option<String>,
    /// Local path to write to
    pub destination: PathBuf,
}

impl RemoteFile {
    /// URL to download from
    pub fn source_url(&self) -> Result<String> {
        match (&self.file_id, &self.url) {
            (Some(id), _) => Ok(drive_download_url(id)),
            (None, Some(url)) => Ok(url.clone()),
            (None, None) => Err(PhishError::Config(format!(
                "remote file for {} needs either file_id or url",
                self.destination.display()
            ))),
        }
    }
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            raw_path: PathBuf::from("phishing_emails.csv"),
            cleaned_path: PathBuf::from("preprocessed_emails.csv"),
        }
    }
}

impl Default for ArtifactsConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("."),
            vectorizer_file: "vectorizer.bin".to_string(),
            model_file: "phishing_model.bin".to_string(),
        }
    }
}

impl ArtifactsConfig {
    /// Full path of the vectorizer artifact
    pub fn vectorizer_path(&self) -> PathBuf {
        self.dir.join(&self.vectorizer_file)
    }

    /// Full path of the classifier artifact
    pub fn model_path(&self) -> PathBuf {
        self.dir.join(&self.model_file)
    }
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            max_features: crate::features::DEFAULT_MAX_FEATURES,
            test_ratio: crate::split::DEFAULT_TEST_RATIO,
            seed: crate::split::DEFAULT_SEED,
            max_iterations: crate::classifier::DEFAULT_MAX_ITERATIONS,
            regularization: 1.0,
            tolerance: 1e-4,
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
            enable_form: true,
        }
    }
}

impl ServerConfig {
    /// `host:port` string for binding
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for ServingConfig {
    fn default() -> Self {
        Self {
            normalize_input: true,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file only
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| PhishError::Config(format!("Failed to read config file: {}", e)))?;

        let config: Self = toml::from_str(&content)
            .map_err(|e| PhishError::Config(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Load layered configuration.
    ///
    /// `path` is optional; a missing file is not an error when no path was
    /// given explicitly.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let defaults = config::Config::try_from(&Config::default())
            .map_err(|e| PhishError::Config(e.to_string()))?;

        let mut builder = config::Config::builder().add_source(defaults);
        builder = match path {
            Some(path) => builder.add_source(config::File::from(path.to_path_buf()).required(true)),
            None => builder.add_source(config::File::with_name("phish").required(false)),
        };
        builder = builder.add_source(
            config::Environment::with_prefix("PHISH")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        );

        let mut config: Self = builder
            .build()
            .and_then(|c| c.try_deserialize())
            .map_err(|e| PhishError::Config(e.to_string()))?;

        if let Ok(port) = std::env::var("PORT") {
            config.server.port = port
                .trim()
                .parse()
                .map_err(|_| PhishError::Config(format!("PORT is not a valid port: {}", port)))?;
        }

        config.validate()?;
        Ok(config)
    }

    /// Check value ranges
    pub fn validate(&self) -> Result<()> {
        let t = &self.training;
        if t.max_features == 0 {
            return Err(PhishError::Config("training.max_features must be > 0".to_string()));
        }
        if !(t.test_ratio > 0.0 && t.test_ratio < 1.0) {
            return Err(PhishError::Config(format!(
                "training.test_ratio must be in (0, 1), got {}",
                t.test_ratio
            )));
        }
        if t.regularization <= 0.0 {
            return Err(PhishError::Config(
                "training.regularization must be > 0".to_string(),
            ));
        }
        if !matches!(self.logging.format.as_str(), "pretty" | "json") {
            return Err(PhishError::Config(format!(
                "logging.format must be 'pretty' or 'json', got '{}'",
                self.logging.format
            )));
        }
        for remote in &self.remote_files {
            remote.source_url()?;
        }
        Ok(())
    }
}
