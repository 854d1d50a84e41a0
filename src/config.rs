use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Environment variable naming an optional JSON config file.
pub const CONFIG_ENV_VAR: &str = "SKETCH_PAD_CONFIG";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Read(#[from] std::io::Error),

    #[error("Invalid config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid config value: {0}")]
    Invalid(String),
}

/// Startup configuration. Missing fields fall back to their defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub canvas_width: u32,
    pub canvas_height: u32,
    /// Maximum number of undo steps kept in memory
    pub history_limit: usize,
    /// Initial stroke/fill color as `#rrggbb`
    pub initial_color: String,
    pub line_width: f32,
    pub font_size: f32,
    /// Where exported drawings are written on native targets
    pub download_dir: Option<PathBuf>,
    pub feed: FeedConfig,
}

/// Timeline sizing for the social client
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedConfig {
    pub page_size: usize,
    pub live_limit: usize,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            page_size: 3,
            live_limit: 3,
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            canvas_width: 800,
            canvas_height: 800,
            history_limit: 20,
            initial_color: "#1abc9c".to_owned(),
            line_width: 5.0,
            font_size: 24.0,
            download_dir: None,
            feed: FeedConfig::default(),
        }
    }
}

impl AppConfig {
    /// Loads the config named by `SKETCH_PAD_CONFIG`, or the defaults when unset.
    pub fn load() -> Result<Self, ConfigError> {
        match std::env::var_os(CONFIG_ENV_VAR) {
            Some(path) => Self::from_path(Path::new(&path)),
            None => Ok(Self::default()),
        }
    }

    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)?;
        let config = Self::from_json(&raw)?;
        log::info!("Loaded config from {}", path.display());
        Ok(config)
    }

    pub fn from_json(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.canvas_width == 0 || self.canvas_height == 0 {
            return Err(ConfigError::Invalid("canvas size must be non-zero".into()));
        }
        if self.history_limit == 0 {
            return Err(ConfigError::Invalid("history_limit must be at least 1".into()));
        }
        if self.feed.page_size == 0 {
            return Err(ConfigError::Invalid("feed.page_size must be at least 1".into()));
        }
        if egui::Color32::from_hex(&self.initial_color).is_err() {
            return Err(ConfigError::Invalid(format!(
                "initial_color {:?} is not a hex color",
                self.initial_color
            )));
        }
        Ok(())
    }

    /// Directory exports land in: configured, else the current directory.
    pub fn download_dir(&self) -> PathBuf {
        self.download_dir.clone().unwrap_or_else(|| PathBuf::from("."))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_uses_defaults() {
        let config = AppConfig::from_json(r#"{ "history_limit": 5, "feed": { "page_size": 10 } }"#)
            .unwrap();
        assert_eq!(config.history_limit, 5);
        assert_eq!(config.feed.page_size, 10);
        assert_eq!(config.feed.live_limit, 3);
        assert_eq!(config.canvas_width, 800);
    }

    #[test]
    fn test_invalid_values_rejected() {
        assert!(AppConfig::from_json(r#"{ "canvas_width": 0 }"#).is_err());
        assert!(AppConfig::from_json(r##"{ "initial_color": "teal" }"##).is_err());
        assert!(AppConfig::from_json("not json").is_err());
    }
}
