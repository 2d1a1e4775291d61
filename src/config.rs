//! Application settings and command-line handling.
//!
//! Settings come from an optional JSON file (`--config <path>`); anything the
//! file leaves out keeps its default. A free argument picks the experiment:
//!
//! ```text
//! sketchbook constellation
//! sketchbook --config sketch.json fireworks
//! sketchbook --list
//! ```
//!
//! ```json
//! { "experiment": "flow-field", "seed": 7, "count": 4000, "smoothing": 0.2 }
//! ```

use crate::error::ConfigError;
use crate::gallery::{self, GallerySettings};
use crate::input::DEFAULT_SMOOTHING;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Everything the desktop host needs to start.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
    /// Gallery id of the experiment to run.
    pub experiment: String,
    pub seed: u64,
    /// Pointer smoothing factor in `(0, 1]`.
    pub smoothing: f32,
    /// Seconds per frame for deterministic runs; `None` uses wall time.
    pub fixed_delta: Option<f32>,
    pub time_scale: f32,
    /// Override the experiment's entity count.
    pub count: Option<usize>,
    /// Where `S` writes PNG snapshots.
    pub snapshot_dir: PathBuf,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            title: "sketchbook".to_string(),
            width: 1280,
            height: 720,
            experiment: "flow-field".to_string(),
            seed: 1,
            smoothing: DEFAULT_SMOOTHING,
            fixed_delta: None,
            time_scale: 1.0,
            count: None,
            snapshot_dir: PathBuf::from("snapshots"),
        }
    }
}

impl AppConfig {
    /// Read and validate a JSON config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_json_str(&text)?;
        log::info!("loaded config from {}", path.display());
        Ok(config)
    }

    /// Parse and validate JSON text.
    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the host cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.width == 0 || self.height == 0 {
            return Err(ConfigError::Invalid {
                field: "width/height",
                reason: format!("window must be non-empty, got {}x{}", self.width, self.height),
            });
        }
        if !(self.smoothing > 0.0 && self.smoothing <= 1.0) {
            return Err(ConfigError::Invalid {
                field: "smoothing",
                reason: format!("must be in (0, 1], got {}", self.smoothing),
            });
        }
        if !(self.time_scale.is_finite() && self.time_scale >= 0.0) {
            return Err(ConfigError::Invalid {
                field: "time_scale",
                reason: format!("must be a non-negative number, got {}", self.time_scale),
            });
        }
        if let Some(delta) = self.fixed_delta {
            if !(delta.is_finite() && delta > 0.0) {
                return Err(ConfigError::Invalid {
                    field: "fixed_delta",
                    reason: format!("must be positive, got {}", delta),
                });
            }
        }
        if gallery::find(&self.experiment).is_none() {
            return Err(ConfigError::UnknownExperiment(self.experiment.clone()));
        }
        Ok(())
    }

    /// Constructor settings for the chosen experiment.
    pub fn gallery_settings(&self) -> GallerySettings {
        GallerySettings {
            seed: self.seed,
            count: self.count,
        }
    }
}

/// What the command line asked for.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Run(AppConfig),
    List,
    Help,
}

pub const USAGE: &str = "\
Usage: sketchbook [OPTIONS] [EXPERIMENT]

Options:
  -c, --config <PATH>   Load settings from a JSON file
  -l, --list            List the gallery and exit
  -h, --help            Show this help

Keys: Space pause, R re-seed, S snapshot, Escape quit";

/// Parse arguments, without the program name.
pub fn parse_args<I>(args: I) -> Result<Command, ConfigError>
where
    I: IntoIterator<Item = String>,
{
    let mut config_path: Option<PathBuf> = None;
    let mut experiment: Option<String> = None;

    let mut args = args.into_iter();
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--config" | "-c" => {
                let path = args.next().ok_or_else(|| ConfigError::Invalid {
                    field: "--config",
                    reason: "expects a file path".to_string(),
                })?;
                config_path = Some(PathBuf::from(path));
            }
            "--list" | "-l" => return Ok(Command::List),
            "--help" | "-h" => return Ok(Command::Help),
            flag if flag.starts_with('-') => {
                return Err(ConfigError::Invalid {
                    field: "arguments",
                    reason: format!("unknown option '{}'", flag),
                });
            }
            _ => experiment = Some(arg),
        }
    }

    let mut config = match config_path {
        Some(path) => AppConfig::load(path)?,
        None => AppConfig::default(),
    };
    if let Some(id) = experiment {
        config.experiment = id;
    }
    config.validate()?;
    Ok(Command::Run(config))
}
