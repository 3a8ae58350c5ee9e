use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Base URL of the transcript backend
    pub backend_url: String,

    /// Gemini API key; the GEMINI_API_KEY environment variable takes precedence
    pub gemini_api_key: Option<String>,

    /// Base URL of the generative-language API
    pub gemini_base_url: String,

    /// Model used for interview feedback
    pub model: String,

    /// Intervu home directory
    pub intervu_home: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("~"));

        Config {
            backend_url: "http://localhost:5000".to_string(),
            gemini_api_key: None,
            gemini_base_url: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            model: "gemini-2.0-flash".to_string(),
            intervu_home: home.join(".intervu"),
        }
    }
}

impl Config {
    /// Load configuration from `~/.intervu/config.toml`, falling back to
    /// defaults when the file does not exist.
    pub fn load() -> Result<Self> {
        let home = dirs::home_dir().context("Could not find home directory")?;
        Self::load_from(&home.join(".intervu"))
    }

    /// Load configuration rooted at a specific home directory.
    pub fn load_from(intervu_home: &Path) -> Result<Self> {
        fs::create_dir_all(intervu_home).context("Failed to create .intervu directory")?;

        let config_path = intervu_home.join("config.toml");
        let mut config = if config_path.exists() {
            let content =
                fs::read_to_string(&config_path).context("Failed to read config file")?;
            toml::from_str(&content).context("Failed to parse config file")?
        } else {
            Config::default()
        };

        if let Ok(url) = std::env::var("INTERVU_BACKEND_URL") {
            config.backend_url = url;
        }

        config.intervu_home = intervu_home.to_path_buf();

        Ok(config)
    }

    /// Save configuration to file
    pub fn save(&self) -> Result<()> {
        let config_path = self.intervu_home.join("config.toml");
        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        fs::write(&config_path, content).context("Failed to write config file")?;
        Ok(())
    }

    /// Check if a Gemini API key is configured
    pub fn has_api_key(&self) -> bool {
        self.gemini_api_key.is_some() || std::env::var("GEMINI_API_KEY").is_ok()
    }

    /// Get the Gemini API key from the environment or the config file
    pub fn api_key(&self) -> Option<String> {
        std::env::var("GEMINI_API_KEY")
            .ok()
            .or_else(|| self.gemini_api_key.clone())
    }

    /// Path of the log file written while the TUI owns the terminal
    pub fn log_path(&self) -> PathBuf {
        self.intervu_home.join("intervu.log")
    }
}
