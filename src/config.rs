//! Runtime configuration
//!
//! Channel credentials are explicit, optional fields: a missing field means the
//! channel is skipped, not that startup fails.

use std::env;
use std::path::PathBuf;

/// Application configuration
#[derive(Clone, Default)]
pub struct Config {
    /// IndexNow API key (also served at `https://{host}/{key}.txt`)
    pub indexnow_key: Option<String>,
    /// Google service-account JSON credential
    pub indexing_credential: Option<String>,
    /// SQLite database location
    pub database_path: PathBuf,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("indexnow_key", &self.indexnow_key.as_ref().map(|_| "<set>"))
            .field(
                "indexing_credential",
                &self.indexing_credential.as_ref().map(|_| "<set>"),
            )
            .field("database_path", &self.database_path)
            .finish()
    }
}

/// Which channels a config enables
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelAvailability {
    /// IndexNow key present
    pub indexnow_configured: bool,
    /// Google credential present
    pub google_configured: bool,
}

impl Config {
    /// Load configuration from the process environment (and `.env`, if present)
    ///
    /// Reads `INDEXNOW_API_KEY`, `GOOGLE_SERVICE_ACCOUNT_JSON` and `DATABASE_PATH`.
    pub fn from_env() -> Self {
        // Load .env file if present (development)
        let _ = dotenvy::dotenv();
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build configuration from an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        Self {
            indexnow_key: non_empty("INDEXNOW_API_KEY").map(|v| v.trim().to_string()),
            indexing_credential: non_empty("GOOGLE_SERVICE_ACCOUNT_JSON"),
            database_path: non_empty("DATABASE_PATH")
                .map_or_else(default_database_path, PathBuf::from),
        }
    }

    /// Override the database location
    #[must_use]
    pub fn with_database_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.database_path = path.into();
        self
    }

    /// Report which channels are enabled
    pub const fn channel_availability(&self) -> ChannelAvailability {
        ChannelAvailability {
            indexnow_configured: self.indexnow_key.is_some(),
            google_configured: self.indexing_credential.is_some(),
        }
    }
}

/// Default database path: platform data dir, else `./data`
pub fn default_database_path() -> PathBuf {
    dirs::data_dir().map_or_else(
        || PathBuf::from("data").join("indexflow.db"),
        |dir| dir.join("indexflow").join("indexflow.db"),
    )
}
