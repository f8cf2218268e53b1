//! Application configuration.
//!
//! Handles loading configuration from environment variables and .env files.

use dotenv::dotenv;
use std::env;
use std::path::PathBuf;

use crate::error::Result;

/// Configuration for the application.
#[derive(Debug, Clone)]
pub struct Config {
    /// The application name
    app_name: String,
    /// The application version
    app_version: String,
    /// Root directory of the project library
    pub library_path: PathBuf,
    /// Log file path, if logging to a file is enabled
    pub log_path: Option<PathBuf>,
}

impl Config {
    /// Get the application name.
    #[must_use]
    pub fn app_name(&self) -> &str {
        &self.app_name
    }

    /// Get the application version.
    #[must_use]
    pub fn app_version(&self) -> &str {
        &self.app_version
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            app_name: env!("CARGO_PKG_NAME").to_string(),
            app_version: env!("CARGO_PKG_VERSION").to_string(),
            library_path: default_library_path(),
            log_path: None,
        }
    }
}

impl Config {
    /// Build a config pointing at a specific library root.
    pub fn with_library(path: impl Into<PathBuf>) -> Self {
        Self { library_path: path.into(), ..Self::default() }
    }

    /// Load configuration from environment variables
    #[allow(clippy::unnecessary_wraps)] // Returns Result for forward-compatible API
    pub fn load() -> Result<Self> {
        // Try to load .env file if present
        dotenv().ok();

        let mut config = Self::default();

        // Library root: env var override, else ~/Documents/Prompterm
        if let Ok(path) = env::var("PROMPTERM_LIBRARY") {
            config.library_path = PathBuf::from(shellexpand::tilde(&path).to_string());
        }

        // Optional log file (the TUI owns stdout, so logs go to a file)
        if let Ok(path) = env::var("PROMPTERM_LOG") {
            config.log_path = Some(PathBuf::from(shellexpand::tilde(&path).to_string()));
        }

        Ok(config)
    }
}

/// Default library location under the user's documents directory.
fn default_library_path() -> PathBuf {
    dirs::document_dir()
        .or_else(dirs::home_dir)
        .unwrap_or_else(|| PathBuf::from("."))
        .join("Prompterm")
}

#[cfg(test)]
mod tests {
    #![allow(clippy::expect_used, clippy::unwrap_used, clippy::panic)]

    use super::*;

    #[test]
    fn test_default_config_has_library_path() {
        let config = Config::default();
        assert!(config.library_path.ends_with("Prompterm"));
        assert!(config.log_path.is_none());
    }

    #[test]
    fn test_app_name_matches_package() {
        let config = Config::default();
        assert_eq!(config.app_name(), "prompterm");
    }
}
