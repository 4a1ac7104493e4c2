//! Client configuration

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Deserializer};
use tracing_subscriber::filter::Directive;

/// Logging output format
#[derive(Debug, Clone, Copy, Deserialize, Default)]
pub enum LogFormat {
    #[default]
    Compact,
    Pretty,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Default)]
pub struct Logging {
    /// Additional filtering directives
    #[serde(default, deserialize_with = "Logging::deserialize_filters")]
    pub filters: Vec<Directive>,

    /// Logging format
    #[serde(default)]
    pub format: LogFormat,
}

impl Logging {
    fn deserialize_filters<'de, D>(deserializer: D) -> Result<Vec<Directive>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let dirs: Vec<String> = Deserialize::deserialize(deserializer)?;
        dirs.into_iter()
            .map(|dir| dir.parse().map_err(serde::de::Error::custom))
            .collect()
    }
}

/// Storefront backend access
#[derive(Debug, Clone, Deserialize)]
pub struct Api {
    /// Backend base URL
    #[serde(default = "Api::default_base_url")]
    pub base_url: String,

    /// Request timeout in seconds
    #[serde(default = "Api::default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Api {
    fn default_base_url() -> String {
        "http://localhost:8001".to_owned()
    }

    fn default_timeout_secs() -> u64 {
        10
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for Api {
    fn default() -> Self {
        Self {
            base_url: Self::default_base_url(),
            timeout_secs: Self::default_timeout_secs(),
        }
    }
}

/// Durable storage for the session token
#[derive(Debug, Clone, Deserialize)]
pub enum Storage {
    /// Nothing survives the process. Mostly for testing.
    Memory,
    /// SQLite database file
    SqLite {
        path: PathBuf,
        /// Run the migrations on startup
        #[serde(default = "Storage::default_migrate")]
        migrate: bool,
    },
}

impl Storage {
    fn default_migrate() -> bool {
        true
    }
}

impl Default for Storage {
    fn default() -> Self {
        Storage::SqLite {
            path: "storefront.db".into(),
            migrate: true,
        }
    }
}

/// Top level client configuration
#[derive(Debug, Clone, Deserialize, Default)]
pub struct Config {
    /// Backend configuration
    #[serde(default)]
    pub api: Api,

    /// Token storage
    #[serde(default)]
    pub storage: Storage,

    /// Logging configuration
    #[serde(default)]
    pub logging: Logging,
}
