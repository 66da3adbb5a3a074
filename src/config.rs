// src/config.rs

//! Defines the configuration structures for a Mandelbrot render run.
//!
//! Every struct can be deserialized from a JSON file, and every field falls
//! back to its default when missing, so a config file only needs to mention
//! what it changes. The defaults reproduce the classic benchmark setup: a
//! 1600x1200 image of the full set at 256 iterations on two threads.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::dispatcher::MAX_THREADS;
use crate::partition::Partition;
use crate::view::{ImageShape, View, Viewport};

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

// --- Top-Level Configuration Structure ---

/// Represents the complete configuration for a render run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)] // Apply default values for the entire struct if a field is missing.
pub struct Config {
    /// Output image dimensions.
    pub image: ImageConfig,
    /// Which region of the complex plane to render.
    pub view: View,
    /// Iteration cap per pixel.
    pub max_iterations: u32,
    /// Worker thread settings.
    pub threads: ThreadConfig,
    /// Benchmark harness settings.
    pub bench: BenchConfig,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            image: ImageConfig::default(),
            view: View::Full,
            max_iterations: 256,
            threads: ThreadConfig::default(),
            bench: BenchConfig::default(),
        }
    }
}

/// Output image dimensions in pixels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImageConfig {
    pub width: usize,
    pub height: usize,
}

impl Default for ImageConfig {
    fn default() -> Self {
        ImageConfig {
            width: 1600,
            height: 1200,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThreadConfig {
    /// Number of workers, including the calling thread.
    pub count: usize,
    /// Row assignment policy.
    pub partition: Partition,
}

impl Default for ThreadConfig {
    fn default() -> Self {
        ThreadConfig {
            count: 2,
            partition: Partition::Interleaved,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BenchConfig {
    /// Each timing is the best of this many runs.
    pub runs: usize,
    /// Compare the threaded image against the serial one.
    pub verify: bool,
}

impl Default for BenchConfig {
    fn default() -> Self {
        BenchConfig {
            runs: 5,
            verify: true,
        }
    }
}

impl Config {
    /// Reads a JSON config file. Missing fields take their defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Config = serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        log::debug!("Loaded config from {}: {:?}", path.display(), config);
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.image.width == 0 || self.image.height == 0 {
            return Err(ConfigError::Invalid(format!(
                "image must have non-zero dimensions, got {}x{}",
                self.image.width, self.image.height
            )));
        }
        if self.max_iterations == 0 {
            return Err(ConfigError::Invalid(
                "max_iterations must be at least 1".to_string(),
            ));
        }
        if self.threads.count == 0 || self.threads.count > MAX_THREADS {
            return Err(ConfigError::Invalid(format!(
                "thread count must be between 1 and {}, got {}",
                MAX_THREADS, self.threads.count
            )));
        }
        Ok(())
    }

    pub fn shape(&self) -> ImageShape {
        ImageShape::new(self.image.width, self.image.height)
    }

    pub fn viewport(&self) -> Viewport {
        self.view.viewport()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_classic_benchmark() {
        let config = Config::default();
        assert_eq!(config.shape(), ImageShape::new(1600, 1200));
        assert_eq!(config.viewport(), Viewport::FULL);
        assert_eq!(config.max_iterations, 256);
        assert_eq!(config.threads.count, 2);
        assert_eq!(config.threads.partition, Partition::Interleaved);
        assert_eq!(config.bench.runs, 5);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let config: Config = serde_json::from_str(
            r#"{ "view": "zoomed", "threads": { "count": 8, "partition": "block" } }"#,
        )
        .unwrap();
        assert_eq!(config.view, View::Zoomed);
        assert_eq!(config.threads.count, 8);
        assert_eq!(config.threads.partition, Partition::Block);
        assert_eq!(config.image, ImageConfig::default());
        assert_eq!(config.max_iterations, 256);
    }

    #[test]
    fn validate_rejects_bad_values() {
        let mut config = Config::default();
        config.threads.count = MAX_THREADS + 1;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        let mut config = Config::default();
        config.threads.count = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.image.height = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.max_iterations = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn load_round_trips_through_file() {
        let path = std::env::temp_dir().join(format!("mandelbrot-config-{}.json", std::process::id()));
        let mut config = Config::default();
        config.image.width = 320;
        config.threads.count = 4;
        std::fs::write(&path, serde_json::to_string_pretty(&config).unwrap()).unwrap();

        let loaded = Config::load(&path).unwrap();
        std::fs::remove_file(&path).ok();
        assert_eq!(loaded, config);
    }

    #[test]
    fn load_reports_missing_file() {
        let err = Config::load("/nonexistent/mandelbrot.json").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn load_reports_malformed_json() {
        let path = std::env::temp_dir().join(format!("mandelbrot-bad-{}.json", std::process::id()));
        std::fs::write(&path, "{ not json").unwrap();
        let err = Config::load(&path).unwrap_err();
        std::fs::remove_file(&path).ok();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }
}
