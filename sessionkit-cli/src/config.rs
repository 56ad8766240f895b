//! CLI configuration file

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use sessionkit_client::ClientConfig;
use std::path::{Path, PathBuf};

/// Settings kept in `<config dir>/sessionkit/config.toml`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    /// Base URL of the SessionKit server
    pub server_url: String,
    /// Request timeout in seconds
    pub timeout_seconds: u64,
    /// Give up on a session refresh after this many seconds; 0 waits indefinitely
    pub refresh_timeout_seconds: u64,
    /// Where session cookies are kept (defaults to the data directory)
    pub cookie_file: Option<PathBuf>,
    /// Where the local session view is kept (defaults to the data directory)
    pub session_file: Option<PathBuf>,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            server_url: "http://localhost:8080".to_string(),
            timeout_seconds: 30,
            refresh_timeout_seconds: 10,
            cookie_file: None,
            session_file: None,
        }
    }
}

impl CliConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        toml::from_str(&content).with_context(|| format!("Invalid configuration in {}", path.display()))
    }

    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, toml::to_string_pretty(self)?)
            .with_context(|| format!("Failed to write {}", path.display()))
    }

    /// Load `path`, or the default file when it exists, or the built-in defaults
    pub fn load(path: Option<&Path>) -> Result<Self> {
        if let Some(path) = path {
            return Self::from_file(path);
        }

        match default_config_path() {
            Some(path) if path.exists() => Self::from_file(&path),
            _ => Ok(Self::default()),
        }
    }

    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "server_url" => self.server_url = value.to_string(),
            "timeout_seconds" => {
                self.timeout_seconds = value
                    .parse()
                    .with_context(|| format!("Invalid integer value: {}", value))?
            }
            "refresh_timeout_seconds" => {
                self.refresh_timeout_seconds = value
                    .parse()
                    .with_context(|| format!("Invalid integer value: {}", value))?
            }
            "cookie_file" => self.cookie_file = optional_path(value),
            "session_file" => self.session_file = optional_path(value),
            _ => bail!("Unknown configuration key: {}", key),
        }
        Ok(())
    }

    pub fn get(&self, key: &str) -> Result<String> {
        let value = match key {
            "server_url" => self.server_url.clone(),
            "timeout_seconds" => self.timeout_seconds.to_string(),
            "refresh_timeout_seconds" => self.refresh_timeout_seconds.to_string(),
            "cookie_file" => display_path(self.cookie_file()),
            "session_file" => display_path(self.session_file()),
            _ => bail!("Unknown configuration key: {}", key),
        };
        Ok(value)
    }

    pub fn cookie_file(&self) -> Option<PathBuf> {
        self.cookie_file
            .clone()
            .or_else(|| data_dir().map(|dir| dir.join("cookies")))
    }

    pub fn session_file(&self) -> Option<PathBuf> {
        self.session_file
            .clone()
            .or_else(sessionkit_client::store::default_storage_path)
    }

    pub fn client_config(&self) -> ClientConfig {
        ClientConfig {
            base_url: self.server_url.clone(),
            timeout_seconds: self.timeout_seconds,
            cookie_file: self.cookie_file(),
            ..ClientConfig::default()
        }
    }
}

pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir()
        .or_else(|| dirs::home_dir().map(|d| d.join(".config")))
        .map(|dir| dir.join("sessionkit").join("config.toml"))
}

fn data_dir() -> Option<PathBuf> {
    dirs::data_dir().map(|dir| dir.join("sessionkit"))
}

fn optional_path(value: &str) -> Option<PathBuf> {
    (!value.trim().is_empty()).then(|| PathBuf::from(value.trim()))
}

fn display_path(path: Option<PathBuf>) -> String {
    path.map(|p| p.display().to_string())
        .unwrap_or_else(|| "(none)".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip_through_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let mut config = CliConfig::default();
        config.set("server_url", "https://auth.example.com").unwrap();
        config.set("timeout_seconds", "5").unwrap();
        config.save_to_file(&path).unwrap();

        let loaded = CliConfig::load(Some(&path)).unwrap();
        assert_eq!(loaded, config);
        assert_eq!(loaded.get("server_url").unwrap(), "https://auth.example.com");
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "server_url = \"http://127.0.0.1:9000\"\n").unwrap();

        let loaded = CliConfig::from_file(&path).unwrap();
        assert_eq!(loaded.server_url, "http://127.0.0.1:9000");
        assert_eq!(loaded.timeout_seconds, 30);
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        let mut config = CliConfig::default();
        assert!(config.set("timeout_seconds", "soon").is_err());
        assert!(config.set("colour", "blue").is_err());
        assert!(config.get("colour").is_err());
    }

    #[test]
    fn test_explicit_files_win() {
        let mut config = CliConfig::default();
        config.set("cookie_file", "/tmp/sk-cookies").unwrap();
        assert_eq!(config.cookie_file(), Some(PathBuf::from("/tmp/sk-cookies")));
        assert_eq!(
            config.client_config().cookie_file,
            Some(PathBuf::from("/tmp/sk-cookies"))
        );

        config.set("cookie_file", "").unwrap();
        assert!(config.cookie_file.is_none());
    }
}
