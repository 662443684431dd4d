use anyhow::{bail, Context, Result};
use dotenvy::dotenv;
use safebrowse_core::{ApiCredential, Settings};
use std::env;

/// CLI configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub settings: Settings,
    /// Stands in for the browser's active tab
    pub active_tab_url: Option<String>,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present (development)
        let _ = dotenv();

        let defaults = Settings::default();
        let settings = Settings {
            auto_scan: env_flag("SAFEBROWSE_AUTO_SCAN", defaults.auto_scan)?,
            show_notifications: env_flag("SAFEBROWSE_NOTIFICATIONS", defaults.show_notifications)?,
            dark_mode: env_flag("SAFEBROWSE_DARK_MODE", defaults.dark_mode)?,
            enhanced_protection: env_flag(
                "SAFEBROWSE_ENHANCED_PROTECTION",
                defaults.enhanced_protection,
            )?,
            block_high_risk: env_flag("SAFEBROWSE_BLOCK_HIGH_RISK", defaults.block_high_risk)?,
            openai_api_key: env::var("OPENAI_API_KEY")
                .ok()
                .filter(|key| !key.trim().is_empty())
                .map(ApiCredential::from),
        };

        Ok(Self {
            settings,
            active_tab_url: env::var("SAFEBROWSE_ACTIVE_TAB_URL").ok(),
        })
    }
}

fn env_flag(name: &str, default: bool) -> Result<bool> {
    match env::var(name) {
        Ok(value) => parse_flag(&value).with_context(|| format!("{name} must be true or false")),
        Err(_) => Ok(default),
    }
}

fn parse_flag(value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => bail!("unrecognised flag value: {other}"),
    }
}
