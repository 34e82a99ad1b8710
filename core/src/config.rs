use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::env;
use std::path::Path;
use tracing::debug;

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct ListingConfig {
    pub strict: bool,
    pub date_tokens: usize,
}

impl Default for ListingConfig {
    fn default() -> Self {
        Self {
            strict: false,
            date_tokens: 3,
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct DetectionConfig {
    pub lookahead_bytes: usize,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            lookahead_bytes: 1024,
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct ChunkingConfig {
    pub max_chunk_chars: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            max_chunk_chars: 40,
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct PhoneConfig {
    pub min_digits: usize,
}

impl Default for PhoneConfig {
    fn default() -> Self {
        Self { min_digits: 7 }
    }
}

#[derive(Debug, Deserialize, Clone, Default, PartialEq, Eq)]
#[serde(default)]
pub struct AppConfig {
    pub listing: ListingConfig,
    pub detection: DetectionConfig,
    pub chunking: ChunkingConfig,
    pub phone: PhoneConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let builder = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            .add_source(Environment::with_prefix("DOCLENS").separator("__"));

        let config: Self = builder.build()?.try_deserialize()?;
        debug!("Loaded configuration (run mode {}): {:?}", run_mode, config);
        Ok(config)
    }

    /// Loads a single explicit file, without the environment overlay.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        Config::builder()
            .add_source(File::from(path))
            .build()?
            .try_deserialize()
    }
}
