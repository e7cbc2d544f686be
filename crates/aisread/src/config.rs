//! Layered client configuration.
//!
//! Values come from compiled defaults, then an optional TOML file, then
//! `AISREAD_*` environment variables, each layer overriding the previous one.

use std::path::Path;
use std::time::Duration;

use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use serde::{Deserialize, Serialize};

use crate::data::ReaderOptions;
use crate::error::Result;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub endpoint:             String,
    pub provider:             String,
    pub chunk_size:           usize,
    pub max_resume:           u32,
    pub resume_backoff_ms:    u64,
    pub connect_timeout_secs: u64,
    pub read_timeout_secs:    u64,
    pub validate_checksum:    bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            endpoint:             "http://localhost:8080".to_string(),
            provider:             "ais".to_string(),
            chunk_size:           ReaderOptions::DEFAULT_CHUNK_SIZE,
            max_resume:           ReaderOptions::DEFAULT_MAX_RESUME,
            resume_backoff_ms:    0,
            connect_timeout_secs: 30,
            read_timeout_secs:    30,
            validate_checksum:    false,
        }
    }
}

impl Config {
    pub const ENV_PREFIX: &'static str = "AISREAD_";

    /// The provider stack, exposed so callers can merge their own layers.
    pub fn figment(path: Option<&Path>) -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Config::default()));
        if let Some(path) = path {
            figment = figment.merge(Toml::file(path));
        }
        figment.merge(Env::prefixed(Self::ENV_PREFIX))
    }

    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config: Config = Self::figment(path).extract()?;
        config.reader_options().validate()?;
        Ok(config)
    }

    pub fn reader_options(&self) -> ReaderOptions {
        ReaderOptions::default()
            .chunk_size(self.chunk_size)
            .max_resume(self.max_resume)
            .resume_backoff(Duration::from_millis(self.resume_backoff_ms))
            .validate_checksum(self.validate_checksum)
    }

    /// An HTTP client with the configured timeouts.
    ///
    /// The read timeout bounds each wait for body data, so a stalled stream
    /// surfaces as a transport error and goes through the resume path.
    #[cfg(feature = "reqwest")]
    pub fn http_client(&self) -> Result<reqwest::Client> {
        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(self.connect_timeout_secs))
            .read_timeout(Duration::from_secs(self.read_timeout_secs))
            .build()?;
        Ok(client)
    }
}
