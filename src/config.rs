//! Registry configuration.
//!
//! Loaded from an optional YAML file and `KTF__*` environment variables.
//! Everything has a default, so an empty configuration is a valid one.

use serde::Deserialize;

use crate::attr;
use crate::error::{KtfError, KtfResult};

/// Default configuration file name.
pub const DEFAULT_CONFIG_FILE: &str = "ktf.yaml";
/// Environment variable for configuration file path.
pub const CONFIG_ENV_VAR: &str = "KTF_CONFIG";
/// Prefix for configuration environment variables.
pub const CONFIG_ENV_PREFIX: &str = "KTF";
/// Environment variable for logging configuration.
pub const LOG_ENV_VAR: &str = "KTF_LOG";

/// Default bound on a formatted failure message, terminator included.
pub const DEFAULT_MAX_MESSAGE_LEN: usize = 4096;
/// Default capacity of one outgoing result message.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 8192;
/// Default log filter when `KTF_LOG` is unset.
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Main configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct KtfConfig {
    /// Reporting limits.
    pub limits: ReportLimits,
    /// Logging configuration.
    pub log: LogConfig,
}

/// Size limits for result reporting.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ReportLimits {
    /// Maximum formatted message length in bytes, terminator included.
    ///
    /// Default: 4096. Longer messages are truncated, never rejected.
    pub max_message_len: usize,

    /// Capacity in bytes of one outgoing result message.
    ///
    /// Default: 8192. Must hold at least one maximal failure record.
    pub channel_capacity: usize,
}

impl Default for ReportLimits {
    fn default() -> Self {
        Self {
            max_message_len: DEFAULT_MAX_MESSAGE_LEN,
            channel_capacity: DEFAULT_CHANNEL_CAPACITY,
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// `EnvFilter` directive used when `KTF_LOG` is unset.
    pub filter: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            filter: DEFAULT_LOG_FILTER.to_string(),
        }
    }
}

impl KtfConfig {
    /// Load configuration from file and environment.
    ///
    /// Configuration sources (in order of priority, later overrides earlier):
    /// 1. `ktf.yaml` in current directory (if exists)
    /// 2. File specified by `path` argument (if provided)
    /// 3. File specified by `CONFIG_ENV_VAR` environment variable (if set)
    /// 4. Environment variables with `CONFIG_ENV_PREFIX` prefix
    pub fn load(path: Option<&str>) -> KtfResult<Self> {
        use ::config::{Config as ConfigLib, Environment, File, FileFormat};

        let mut builder = ConfigLib::builder()
            .add_source(File::new(DEFAULT_CONFIG_FILE, FileFormat::Yaml).required(false));

        if let Some(config_path) = path {
            builder = builder.add_source(File::new(config_path, FileFormat::Yaml).required(true));
        }

        if let Ok(config_path) = std::env::var(CONFIG_ENV_VAR) {
            builder = builder.add_source(File::new(&config_path, FileFormat::Yaml).required(true));
        }

        let config: KtfConfig = builder
            .add_source(
                Environment::with_prefix(CONFIG_ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;

        config.validate()?;
        Ok(config)
    }

    /// Parse configuration from a YAML document.
    pub fn from_yaml(yaml: &str) -> KtfResult<Self> {
        let config: KtfConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject limits that would make every failure report unencodable.
    pub fn validate(&self) -> KtfResult<()> {
        let limits = &self.limits;
        if limits.max_message_len == 0 {
            return Err(KtfError::InvalidConfig(
                "limits.max_message_len must be at least 1".to_string(),
            ));
        }
        if limits.max_message_len > attr::MAX_ATTR_PAYLOAD {
            return Err(KtfError::InvalidConfig(format!(
                "limits.max_message_len {} exceeds the attribute payload limit {}",
                limits.max_message_len,
                attr::MAX_ATTR_PAYLOAD
            )));
        }
        let needed = attr::failure_record_size(limits.max_message_len);
        if limits.channel_capacity < needed {
            return Err(KtfError::InvalidConfig(format!(
                "limits.channel_capacity {} cannot hold a {} byte message (needs {})",
                limits.channel_capacity, limits.max_message_len, needed
            )));
        }
        Ok(())
    }
}
