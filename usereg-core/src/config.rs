//! Configuration management
//!
//! Settings live in `settings.json` inside the usereg directory:
//! ```json
//! {
//!   "portal": { "baseUrl": "https://usereg.tsinghua.edu.cn", "timeoutSecs": 30 },
//!   "username": "zhangsan"
//! }
//! ```
//! `USEREG_BASE_URL` and `USEREG_TIMEOUT_SECS` take precedence over the file.

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;
use url::Url;

use crate::domain::result::Error;

pub const DEFAULT_BASE_URL: &str = "https://usereg.tsinghua.edu.cn";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Where and how to reach the portal
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortalConfig {
    pub base_url: String,
    pub timeout: Duration,
}

impl Default for PortalConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl PortalConfig {
    /// Validate and build a portal config
    pub fn new(base_url: &str, timeout: Duration) -> crate::domain::result::Result<Self> {
        let parsed = Url::parse(base_url)
            .map_err(|e| Error::Config(format!("Invalid portal URL {:?}: {}", base_url, e)))?;

        if parsed.scheme() != "https" && parsed.scheme() != "http" {
            return Err(Error::Config("Portal URL must use HTTP or HTTPS".to_string()));
        }
        if timeout.is_zero() {
            return Err(Error::Config("Timeout must be greater than zero".to_string()));
        }

        Ok(Self {
            base_url: base_url.to_string(),
            timeout,
        })
    }
}

/// Raw settings.json structure
///
/// Keys this crate does not read are ignored.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SettingsFile {
    #[serde(default)]
    portal: PortalSettings,
    #[serde(default)]
    username: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PortalSettings {
    #[serde(default)]
    base_url: Option<String>,
    #[serde(default)]
    timeout_secs: Option<u64>,
}

/// usereg configuration (simplified view of settings)
#[derive(Debug, Clone)]
pub struct Config {
    pub base_url: String,
    pub timeout_secs: u64,
    /// Account used when none is given on the command line
    pub username: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            username: None,
        }
    }
}

impl Config {
    /// Load config from the usereg directory
    ///
    /// `USEREG_BASE_URL` and `USEREG_TIMEOUT_SECS` override the file.
    pub fn load(usereg_dir: &Path) -> Result<Self> {
        Self::load_with(usereg_dir, |key| std::env::var(key).ok())
    }

    fn load_with(usereg_dir: &Path, env: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let settings_path = usereg_dir.join("settings.json");

        let raw: SettingsFile = if settings_path.exists() {
            let content = std::fs::read_to_string(&settings_path)
                .with_context(|| format!("Failed to read {:?}", settings_path))?;
            serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse {:?}", settings_path))?
        } else {
            SettingsFile::default()
        };

        let base_url = env("USEREG_BASE_URL")
            .or(raw.portal.base_url)
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        let timeout_secs = match env("USEREG_TIMEOUT_SECS") {
            Some(v) => v
                .trim()
                .parse()
                .with_context(|| format!("USEREG_TIMEOUT_SECS is not a number: {:?}", v))?,
            None => raw.portal.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS),
        };

        Ok(Self {
            base_url,
            timeout_secs,
            username: raw.username,
        })
    }

    /// Portal connection settings
    pub fn portal(&self) -> Result<PortalConfig> {
        let portal = PortalConfig::new(&self.base_url, Duration::from_secs(self.timeout_secs))?;
        Ok(portal)
    }
}
