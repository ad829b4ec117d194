//! Configuration management
//!
//! Optional TOML configuration at `$S3SIGN_CONFIG_DIR/config.toml`, or
//! `<config dir>/s3sign/config.toml`. Command-line flags override every
//! value found here.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Current configuration schema version
pub const SCHEMA_VERSION: u32 = 1;

/// Region used when neither flags nor configuration name one
pub const DEFAULT_REGION: &str = "eu-west-1";

/// Environment variable overriding the configuration directory
pub const CONFIG_DIR_ENV: &str = "S3SIGN_CONFIG_DIR";

const DEFAULT_OUTPUT: &str = "human";

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Schema version for migration support
    pub schema_version: u32,

    /// Session settings
    #[serde(default)]
    pub session: SessionSettings,

    /// Output defaults
    #[serde(default)]
    pub defaults: Defaults,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            session: SessionSettings::default(),
            defaults: Defaults::default(),
        }
    }
}

/// Partial session settings, as found in the file or on the command line
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionSettings {
    /// Region name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,

    /// Named profile from the shared AWS config files
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile: Option<String>,

    /// Custom endpoint for S3-compatible services
    #[serde(skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,

    /// Force path-style bucket addressing
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path_style: Option<bool>,
}

impl SessionSettings {
    /// Fill unset values from `fallback`
    pub fn or(self, fallback: SessionSettings) -> SessionSettings {
        SessionSettings {
            region: self.region.or(fallback.region),
            profile: self.profile.or(fallback.profile),
            endpoint: self.endpoint.or(fallback.endpoint),
            path_style: self.path_style.or(fallback.path_style),
        }
    }

    /// Validate and resolve into the session configuration
    pub fn resolve(self, verbose: u8) -> Result<SessionConfig> {
        if let Some(endpoint) = &self.endpoint {
            let url = url::Url::parse(endpoint)?;
            if !matches!(url.scheme(), "http" | "https") {
                return Err(Error::Config(format!(
                    "Endpoint must use http or https: {endpoint}"
                )));
            }
        }

        let region = self
            .region
            .filter(|r| !r.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_REGION.to_string());

        Ok(SessionConfig {
            region,
            profile: self.profile,
            endpoint: self.endpoint,
            force_path_style: self.path_style.unwrap_or(false),
            verbose,
        })
    }
}

/// Fully resolved session configuration, fixed for the process lifetime
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    pub region: String,
    pub profile: Option<String>,
    pub endpoint: Option<String>,
    pub force_path_style: bool,
    /// Number of `-v` flags given
    pub verbose: u8,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            region: DEFAULT_REGION.to_string(),
            profile: None,
            endpoint: None,
            force_path_style: false,
            verbose: 0,
        }
    }
}

/// Default settings for CLI output
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Defaults {
    /// Output format: "human" or "json"
    #[serde(default = "default_output")]
    pub output: String,

    /// Show progress indicators
    #[serde(default = "default_true")]
    pub progress: bool,
}

fn default_output() -> String {
    DEFAULT_OUTPUT.to_string()
}

fn default_true() -> bool {
    true
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            progress: true,
        }
    }
}

impl Defaults {
    /// Whether JSON output is the configured default
    pub fn json(&self) -> bool {
        self.output.eq_ignore_ascii_case("json")
    }
}

/// Configuration manager handles locating and loading the config file
#[derive(Debug)]
pub struct ConfigManager {
    config_path: PathBuf,
}

impl ConfigManager {
    /// Create a new ConfigManager with the default config path
    pub fn new() -> Result<Self> {
        let override_dir = std::env::var_os(CONFIG_DIR_ENV).map(PathBuf::from);
        Ok(Self {
            config_path: default_config_path(override_dir)?,
        })
    }

    /// Create a ConfigManager with a custom path (useful for testing)
    pub fn with_path(path: PathBuf) -> Self {
        Self { config_path: path }
    }

    /// Get the configuration file path
    pub fn config_path(&self) -> &PathBuf {
        &self.config_path
    }

    /// Load configuration from disk
    ///
    /// If the configuration file doesn't exist, returns a default configuration.
    pub fn load(&self) -> Result<Config> {
        if !self.config_path.exists() {
            tracing::debug!("No configuration at {}", self.config_path.display());
            return Ok(Config::default());
        }

        let content = std::fs::read_to_string(&self.config_path)
            .map_err(|e| Error::local(&self.config_path, e))?;
        let config: Config = toml::from_str(&content)?;

        if config.schema_version > SCHEMA_VERSION {
            return Err(Error::Config(format!(
                "Configuration file version {} is newer than supported version {}. Please upgrade s3sign.",
                config.schema_version, SCHEMA_VERSION
            )));
        }

        tracing::debug!("Loaded configuration from {}", self.config_path.display());
        Ok(config)
    }
}

fn default_config_path(override_dir: Option<PathBuf>) -> Result<PathBuf> {
    if let Some(dir) = override_dir.filter(|d| !d.as_os_str().is_empty()) {
        return Ok(dir.join("config.toml"));
    }
    let config_dir = dirs::config_dir()
        .ok_or_else(|| Error::Config("Could not determine config directory".into()))?;
    Ok(config_dir.join("s3sign").join("config.toml"))
}
