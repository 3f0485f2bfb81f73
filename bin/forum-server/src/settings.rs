//! # Server Configuration
//!
//! Defaults, overridden by `FORUM_`-prefixed environment variables
//! (a `.env` file is loaded first when present).

use config::{Config, Environment};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub max_connections: u32,
    /// Allowed CORS origin; any origin when unset.
    pub cors_origin: Option<String>,
}

impl Settings {
    pub fn load() -> Result<Self, config::ConfigError> {
        Self::from_source(Environment::with_prefix("FORUM"))
    }

    fn from_source(env: Environment) -> Result<Self, config::ConfigError> {
        Config::builder()
            .set_default("database_url", "sqlite:forum.db")?
            .set_default("host", "127.0.0.1")?
            .set_default("port", 8080)?
            .set_default("max_connections", 5)?
            .add_source(env.try_parsing(true))
            .build()?
            .try_deserialize()
    }
}
