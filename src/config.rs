use std::{env, fmt::Display, path::PathBuf, str::FromStr};

use tracing::{info, warn};

use crate::errors::{Error, Result};

/// Database file used when `STOREFRONT_DB_PATH` is not set
pub const DEFAULT_DB_PATH: &str = "holysmokes.db";

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// SQLite file holding the store
    pub db_path: PathBuf,
    /// Enables the admin login that skips the user directory
    pub admin_quick_login: bool,
    /// How many dishes the home page shows
    pub featured_count: usize,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            db_path: PathBuf::from(DEFAULT_DB_PATH),
            admin_quick_login: false,
            featured_count: 3,
        }
    }
}

impl Config {
    /// Read the configuration from the environment, falling back to defaults
    pub fn load() -> Result<Self> {
        let config = Self {
            db_path: try_load("STOREFRONT_DB_PATH", DEFAULT_DB_PATH)?,
            admin_quick_login: try_load("STOREFRONT_ADMIN_QUICK_LOGIN", "false")?,
            featured_count: try_load("STOREFRONT_FEATURED_COUNT", "3")?,
        };
        if config.admin_quick_login {
            warn!("Admin quick login is enabled, anyone can open the admin dashboard");
        }
        Ok(config)
    }
}

fn try_load<T: FromStr>(key: &str, default: &str) -> Result<T>
where
    T::Err: Display,
{
    let raw = env::var(key).unwrap_or_else(|_| {
        info!("{key} not set, using default: {default}");
        default.to_string()
    });

    raw.parse().map_err(|e| {
        warn!("Invalid {key} value: {e}");
        Error::Config(format!("{key}={raw}: {e}"))
    })
}
