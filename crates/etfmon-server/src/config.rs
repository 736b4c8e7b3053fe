//! Server configuration.

use std::path::{Path, PathBuf};

use etfmon::{ConstituentValidator, DEFAULT_TOP_N, DEFAULT_WEIGHT_TOLERANCE};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

/// Weight-sum tolerance override.
pub const ENV_WEIGHT_TOLERANCE: &str = "ETF_WEIGHT_TOLERANCE";
/// Price file override.
pub const ENV_PRICES_PATH: &str = "ETFMON_PRICES_PATH";
/// Bind host override.
pub const ENV_HOST: &str = "ETFMON_HOST";
/// Bind port override.
pub const ENV_PORT: &str = "ETFMON_PORT";

/// Dotenv files tried in order when `ENV_FILE` is unset.
const DOTENV_CANDIDATES: [&str; 3] = [".env.dev", ".env.prod", ".env"];

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Config file could not be read
    #[error("Failed to read config file {path}: {source}")]
    Io {
        /// File that was read
        path: PathBuf,
        /// Underlying error
        source: std::io::Error,
    },

    /// Config file is not valid TOML for [`ServerConfig`]
    #[error("Invalid config file: {0}")]
    Toml(#[from] toml::de::Error),

    /// Negative or non-finite weight tolerance
    #[error("Weight tolerance must be a finite, non-negative number, got {0}")]
    InvalidTolerance(f64),
}

/// Server configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to listen on
    #[serde(default = "default_port")]
    pub port: u16,

    /// Historical price CSV
    #[serde(default = "default_prices_path")]
    pub prices_path: PathBuf,

    /// Allowed deviation of the weight sum from 1.0
    #[serde(default = "default_weight_tolerance")]
    pub weight_tolerance: f64,

    /// Holdings returned per report
    #[serde(default = "default_top_n")]
    pub top_n: usize,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

const fn default_port() -> u16 {
    8000
}

fn default_prices_path() -> PathBuf {
    PathBuf::from("data/prices.csv")
}

const fn default_weight_tolerance() -> f64 {
    DEFAULT_WEIGHT_TOLERANCE
}

const fn default_top_n() -> usize {
    DEFAULT_TOP_N
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            prices_path: default_prices_path(),
            weight_tolerance: default_weight_tolerance(),
            top_n: default_top_n(),
        }
    }
}

impl ServerConfig {
    /// Load configuration from a TOML file. Missing keys take defaults.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = toml::from_str(&content)?;
        config.validator()?;
        Ok(config)
    }

    /// Configuration from the process environment on top of defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();
        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Override fields from environment variables found by `lookup`.
    ///
    /// Values that do not parse are skipped with a warning. A tolerance that
    /// parses but is negative is an error.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(raw) = lookup(ENV_WEIGHT_TOLERANCE) {
            match raw.trim().parse::<f64>() {
                Ok(tolerance) if tolerance.is_finite() && tolerance >= 0.0 => {
                    self.weight_tolerance = tolerance;
                }
                Ok(tolerance) => return Err(ConfigError::InvalidTolerance(tolerance)),
                Err(e) => warn!("Ignoring {}={:?}: {}", ENV_WEIGHT_TOLERANCE, raw, e),
            }
        }

        if let Some(path) = lookup(ENV_PRICES_PATH).filter(|p| !p.trim().is_empty()) {
            self.prices_path = PathBuf::from(path);
        }

        if let Some(host) = lookup(ENV_HOST).filter(|h| !h.trim().is_empty()) {
            self.host = host;
        }

        if let Some(raw) = lookup(ENV_PORT) {
            match raw.trim().parse::<u16>() {
                Ok(port) => self.port = port,
                Err(e) => warn!("Ignoring {}={:?}: {}", ENV_PORT, raw, e),
            }
        }

        info!(
            "{} = {} ({}%)",
            ENV_WEIGHT_TOLERANCE,
            self.weight_tolerance,
            self.weight_tolerance * 100.0
        );
        Ok(())
    }

    /// Validator using the configured tolerance.
    pub fn validator(&self) -> Result<ConstituentValidator, ConfigError> {
        ConstituentValidator::new(self.weight_tolerance)
            .map_err(|e| ConfigError::InvalidTolerance(e.0))
    }
}

/// Load a dotenv file into the process environment.
///
/// `ENV_FILE` names the file when set; otherwise the first of `.env.dev`,
/// `.env.prod` and `.env` found in `base_dir` is used. Variables already set
/// in the environment win. Returns the file that was loaded.
pub fn load_dotenv(base_dir: &Path) -> Option<PathBuf> {
    let candidate = match std::env::var_os("ENV_FILE") {
        Some(file) => Some(PathBuf::from(file)),
        None => DOTENV_CANDIDATES
            .iter()
            .map(|name| base_dir.join(name))
            .find(|path| path.exists()),
    };

    match candidate {
        Some(path) if path.exists() => match dotenvy::from_path(&path) {
            Ok(()) => {
                info!("Loaded configuration from: {}", path.display());
                Some(path)
            }
            Err(e) => {
                warn!("Failed to load {}: {}", path.display(), e);
                None
            }
        },
        _ => {
            info!("Using system environment variables (no .env file found)");
            None
        }
    }
}
