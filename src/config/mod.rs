//! Hub configuration.
//!
//! Sources are merged with the later one winning:
//! 1. Hardcoded defaults
//! 2. Optional TOML config file
//! 3. Environment variables (`REFHUB__` prefix, highest priority)

use config::Config;
use config::ConfigError;
use config::Environment;
use config::File;
use serde::Deserialize;

use crate::constants::DEFAULT_CHANNEL_CAPACITY_HINT;
use crate::constants::DEFAULT_PENDING_WARN_THRESHOLD;
use crate::constants::ENV_PREFIX;
use crate::Result;

#[cfg(test)]
mod config_test;

#[derive(Debug, Deserialize, Clone)]
pub struct HubConfig {
    /// Waiting-list length at which enrollment logs a warning; a long list
    /// usually means a producer never issues the write a consumer waits for.
    #[serde(default = "default_pending_warn_threshold")]
    pub pending_warn_threshold: usize,

    /// Pre-allocated capacity for a channel store created on first access.
    #[serde(default = "default_channel_capacity_hint")]
    pub channel_capacity_hint: usize,
}

fn default_pending_warn_threshold() -> usize {
    DEFAULT_PENDING_WARN_THRESHOLD
}

fn default_channel_capacity_hint() -> usize {
    DEFAULT_CHANNEL_CAPACITY_HINT
}

impl Default for HubConfig {
    fn default() -> Self {
        Self {
            pending_warn_threshold: DEFAULT_PENDING_WARN_THRESHOLD,
            channel_capacity_hint: DEFAULT_CHANNEL_CAPACITY_HINT,
        }
    }
}

impl HubConfig {
    /// Load configuration with priority ordering:
    /// 1. Defaults
    /// 2. Optional config file
    /// 3. Environment variables (highest priority)
    pub fn load(config_path: Option<&str>) -> Result<Self> {
        let mut builder = Config::builder();

        if let Some(path) = config_path {
            builder = builder.add_source(File::with_name(path));
        }

        let config: HubConfig = builder
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .ignore_empty(true)
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.pending_warn_threshold == 0 {
            return Err(ConfigError::Message(
                "pending_warn_threshold must be greater than zero".to_string(),
            )
            .into());
        }
        Ok(())
    }
}
