use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use stockview_core::{DisplayPeriod, Overlays};
use stockview_engine::LookbackPolicy;

/// File looked up in the working directory when no `--config` is given.
pub const DEFAULT_CONFIG_FILE: &str = "stockview.toml";

/// Settings read from `stockview.toml`. Every key is optional.
///
/// ```toml
/// data_dir = "data"
/// default_period = "6mo"
/// lookback_slack_days = 30
/// bind = "127.0.0.1:3000"
///
/// [overlays]
/// ichimoku = false
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    pub data_dir: PathBuf,
    pub default_period: DisplayPeriod,
    pub lookback_slack_days: i64,
    pub bind: String,
    pub overlays: Overlays,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            default_period: DisplayPeriod::default(),
            lookback_slack_days: LookbackPolicy::default().slack_days,
            bind: "0.0.0.0:3000".to_string(),
            overlays: Overlays::default(),
        }
    }
}

impl AppConfig {
    /// Load `path` if given, else `stockview.toml` when present, else defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None if Path::new(DEFAULT_CONFIG_FILE).exists() => {
                Self::from_file(Path::new(DEFAULT_CONFIG_FILE))
            }
            None => Ok(Self::default()),
        }
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        toml::from_str(&text).with_context(|| format!("Invalid config {}", path.display()))
    }

    pub fn lookback(&self) -> LookbackPolicy {
        LookbackPolicy {
            slack_days: self.lookback_slack_days,
        }
    }
}
