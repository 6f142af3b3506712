use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    io::ErrorKind,
    path::{Path, PathBuf},
};

use crate::model::Coordinates;

pub const DEFAULT_BASE_URL: &str = "https://api.openweathermap.org";
pub const DEFAULT_FORECAST_DAYS: usize = 5;
pub const DEFAULT_SUGGESTION_LIMIT: u8 = 5;

/// Environment variable that overrides the stored API key.
pub const API_KEY_ENV: &str = "OWM_API_KEY";

/// Value shipped in sample env files; treated the same as no key.
const PLACEHOLDER_KEY: &str = "your_openweathermap_api_key_here";

/// Client configuration, stored as TOML on disk.
///
/// Example:
/// ```toml
/// api_key = "..."
/// forecast_days = 5
///
/// [location]
/// lat = 51.5072
/// lon = -0.1276
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api_key: Option<String>,
    pub base_url: String,
    /// How many daily summaries a forecast keeps.
    pub forecast_days: usize,
    /// `limit` passed to the geocoder.
    pub suggestion_limit: u8,
    /// Fixed position used when no device location is available.
    pub location: Option<Coordinates>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            forecast_days: DEFAULT_FORECAST_DAYS,
            suggestion_limit: DEFAULT_SUGGESTION_LIMIT,
            location: None,
        }
    }
}

impl Config {
    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_forecast_days(mut self, days: usize) -> Self {
        self.forecast_days = days;
        self
    }

    /// The API key, if it is usable: present, not blank, not the placeholder.
    pub fn usable_api_key(&self) -> Option<&str> {
        self.api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty() && *k != PLACEHOLDER_KEY)
    }

    pub fn is_api_key_configured(&self) -> bool {
        self.usable_api_key().is_some()
    }

    /// Let an environment variable override the stored key.
    ///
    /// `lookup` is normally `std::env::var(..).ok()`; tests pass a closure.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(key) = lookup(API_KEY_ENV) {
            self.api_key = Some(key);
        }
    }

    /// Effective configuration: the stored file, then the environment on top.
    pub fn load() -> Result<Self> {
        let mut cfg = Self::stored()?;
        cfg.apply_env(|name| std::env::var(name).ok());
        Ok(cfg)
    }

    /// What is on disk, without environment overrides. Use this before
    /// [`Config::save`] so an env-provided key is never persisted.
    pub fn stored() -> Result<Self> {
        Self::read_from(&Self::config_file_path()?)
    }

    /// Parse `path`; a missing file means defaults.
    pub fn read_from(path: &Path) -> Result<Self> {
        match fs::read_to_string(path) {
            Ok(contents) => Self::from_toml(&contents)
                .with_context(|| format!("Failed to parse config file: {}", path.display())),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => Err(e).with_context(|| format!("Failed to read config file: {}", path.display())),
        }
    }

    pub fn from_toml(contents: &str) -> Result<Self> {
        Ok(toml::from_str(contents)?)
    }

    /// Write to the platform config location, returning where it went.
    pub fn save(&self) -> Result<PathBuf> {
        let path = Self::config_file_path()?;
        self.write_to(&path)?;
        Ok(path)
    }

    pub fn write_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory: {}", parent.display()))?;
        }
        let toml = toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;
        fs::write(path, toml).with_context(|| format!("Failed to write config file: {}", path.display()))
    }

    fn config_file_path() -> Result<PathBuf> {
        ProjectDirs::from("dev", "skyglass", "skyglass")
            .map(|dirs| dirs.config_dir().join("config.toml"))
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_has_no_usable_key() {
        let cfg = Config::default();
        assert!(!cfg.is_api_key_configured());
        assert_eq!(cfg.forecast_days, 5);
        assert_eq!(cfg.base_url, DEFAULT_BASE_URL);
    }

    #[test]
    fn blank_and_placeholder_keys_are_not_configured() {
        assert!(!Config::default().with_api_key("").is_api_key_configured());
        assert!(!Config::default().with_api_key("   ").is_api_key_configured());
        assert!(
            !Config::default()
                .with_api_key("your_openweathermap_api_key_here")
                .is_api_key_configured()
        );
    }

    #[test]
    fn real_key_is_trimmed() {
        let cfg = Config::default().with_api_key("  abc123 \n");
        assert_eq!(cfg.usable_api_key(), Some("abc123"));
    }

    #[test]
    fn env_overrides_file_key() {
        let mut cfg = Config::default().with_api_key("FROM_FILE");
        cfg.apply_env(|name| (name == API_KEY_ENV).then(|| "FROM_ENV".to_string()));
        assert_eq!(cfg.usable_api_key(), Some("FROM_ENV"));

        let mut cfg = Config::default().with_api_key("FROM_FILE");
        cfg.apply_env(|_| None);
        assert_eq!(cfg.usable_api_key(), Some("FROM_FILE"));
    }

    #[test]
    fn partial_toml_fills_defaults() {
        let cfg = Config::from_toml(
            r#"
            api_key = "KEY"
            forecast_days = 7

            [location]
            lat = 51.5
            lon = -0.12
            "#,
        )
        .expect("valid toml");

        assert_eq!(cfg.usable_api_key(), Some("KEY"));
        assert_eq!(cfg.forecast_days, 7);
        assert_eq!(cfg.suggestion_limit, DEFAULT_SUGGESTION_LIMIT);
        assert_eq!(cfg.location, Some(Coordinates::new(51.5, -0.12)));
    }

    #[test]
    fn missing_file_reads_as_defaults() {
        let dir = tempfile::TempDir::new().unwrap();
        let cfg = Config::read_from(&dir.path().join("config.toml")).unwrap();
        assert_eq!(cfg, Config::default());
    }

    #[test]
    fn written_file_reads_back() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut cfg = Config::default().with_api_key("KEY").with_forecast_days(3);
        cfg.location = Some(Coordinates::new(48.85, 2.35));
        cfg.write_to(&path).unwrap();

        assert_eq!(Config::read_from(&path).unwrap(), cfg);
    }

    #[test]
    fn unparsable_file_names_the_path() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "forecast_days = \"soon\"").unwrap();

        let err = Config::read_from(&path).unwrap_err();
        assert!(err.to_string().contains("config.toml"), "{err}");
    }

    #[test]
    fn toml_roundtrip() {
        let cfg = Config::default().with_api_key("KEY").with_forecast_days(7);
        let text = toml::to_string_pretty(&cfg).unwrap();
        assert_eq!(Config::from_toml(&text).unwrap(), cfg);
    }
}
