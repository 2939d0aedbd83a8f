//! Configuration loading: TOML file, environment, CLI overrides.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";

/// Env var overriding `api.base_url`, applied between the file and CLI flags.
pub const API_URL_ENV: &str = "TWEETGEN_API_URL";

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct Config {
    pub api: ApiConfig,
    pub ui: UiConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ApiConfig {
    pub base_url: String,
    pub timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: 20,
        }
    }
}

impl ApiConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct UiConfig {
    pub theme: Theme,
    pub tick_ms: u64,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            theme: Theme::Light,
            tick_ms: 250,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, clap::ValueEnum, Default)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }
}

impl Config {
    /// Load configuration. An explicitly given path must exist and parse;
    /// the default path (`<config dir>/tweetgen/config.toml`) falls back
    /// to defaults when missing.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path)
                .with_context(|| format!("failed to load config from {}", path.display())),
            None => match Self::default_path() {
                Some(path) if path.exists() => Self::from_file(&path)
                    .with_context(|| format!("failed to load config from {}", path.display())),
                _ => Ok(Self::default()),
            },
        }
    }

    fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        let mut config: Config = toml::from_str(&raw)?;
        config.normalize();
        Ok(config)
    }

    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("tweetgen").join("config.toml"))
    }

    /// Apply environment overrides, then flag overrides, in that order.
    pub fn apply_overrides(&mut self, api_url: Option<&str>, theme: Option<Theme>) {
        if let Ok(url) = std::env::var(API_URL_ENV) {
            if !url.trim().is_empty() {
                self.api.base_url = url;
            }
        }
        if let Some(url) = api_url {
            self.api.base_url = url.to_string();
        }
        if let Some(theme) = theme {
            self.ui.theme = theme;
        }
        self.normalize();
    }

    fn normalize(&mut self) {
        // trim trailing slashes once here so URL joining stays uniform
        while self.api.base_url.ends_with('/') {
            self.api.base_url.pop();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.api.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.api.timeout_secs, 20);
        assert_eq!(config.ui.theme, Theme::Light);
        assert_eq!(config.ui.tick_ms, 250);
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            "[api]\nbase_url = \"http://10.0.0.5:9000/\"\ntimeout_secs = 5\n\n[ui]\ntheme = \"dark\"\n"
        )
        .unwrap();

        let config = Config::load(Some(file.path())).unwrap();
        assert_eq!(config.api.base_url, "http://10.0.0.5:9000");
        assert_eq!(config.api.timeout_secs, 5);
        assert_eq!(config.ui.theme, Theme::Dark);
        // unspecified keys keep their defaults
        assert_eq!(config.ui.tick_ms, 250);
    }

    #[test]
    fn test_partial_file_uses_section_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "[ui]\ntick_ms = 100\n").unwrap();

        let config = Config::load(Some(file.path())).unwrap();
        assert_eq!(config.api.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.ui.tick_ms, 100);
    }

    #[test]
    fn test_explicit_missing_path_is_an_error() {
        let result = Config::load(Some(Path::new("/nonexistent/tweetgen.toml")));
        assert!(result.is_err());
    }

    #[test]
    fn test_invalid_toml_is_an_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not toml at all [[[").unwrap();
        assert!(Config::load(Some(file.path())).is_err());
    }

    #[test]
    fn test_cli_override_beats_file() {
        let mut config = Config::default();
        config.apply_overrides(Some("http://cli:1234/"), Some(Theme::Dark));
        assert_eq!(config.api.base_url, "http://cli:1234");
        assert_eq!(config.ui.theme, Theme::Dark);
    }

    #[test]
    fn test_theme_toggle() {
        assert_eq!(Theme::Light.toggled(), Theme::Dark);
        assert_eq!(Theme::Dark.toggled(), Theme::Light);
    }
}
