use crate::clock::DEFAULT_TICK_INTERVAL;
use crate::controller::FOCUS_CLEAR_DELAY;
use crate::layout::LayoutEngine;
use crate::projector::Rings;
use crate::urgency::Thresholds;
use directories::ProjectDirs;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

const CONFIG_FILE: &str = "config.toml";
const MIN_RING_GAP: f64 = 0.05;
const MAX_RING: f64 = 0.5;

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("reading config {path:?}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("parsing config {path:?}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RadarConfig {
    pub tick_interval_secs: u64,
    pub focus_clear_ms: u64,
    pub log_level: String,
    pub thresholds: Thresholds,
    pub rings: Rings,
}

impl Default for RadarConfig {
    fn default() -> Self {
        RadarConfig {
            tick_interval_secs: DEFAULT_TICK_INTERVAL.as_secs(),
            focus_clear_ms: FOCUS_CLEAR_DELAY.as_millis() as u64,
            log_level: "info".to_string(),
            thresholds: Thresholds::default(),
            rings: Rings::default(),
        }
    }
}

impl RadarConfig {
    /// An explicit path must exist. Without one the platform config file is
    /// used when present, otherwise the defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let path = match explicit {
            Some(p) => p.to_path_buf(),
            None => match default_path() {
                Some(p) if p.exists() => p,
                _ => {
                    debug!("no config file, using defaults");
                    return Ok(RadarConfig::default());
                }
            },
        };
        let raw = fs::read_to_string(&path).map_err(|source| ConfigError::Read {
            path: path.clone(),
            source,
        })?;
        let config: RadarConfig =
            toml::from_str(&raw).map_err(|source| ConfigError::Parse { path, source })?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_toml_str(raw: &str) -> Result<Self, ConfigError> {
        let config: RadarConfig = toml::from_str(raw).map_err(|source| ConfigError::Parse {
            path: PathBuf::from("<inline>"),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tick_interval_secs == 0 {
            return Err(ConfigError::Invalid("tick_interval_secs must be at least 1".into()));
        }
        let t = &self.thresholds;
        if !(t.now_hours >= 0.0 && t.now_hours < t.today_hours && t.today_hours.is_finite()) {
            return Err(ConfigError::Invalid(format!(
                "thresholds must satisfy 0 <= now_hours < today_hours (got {} / {})",
                t.now_hours, t.today_hours
            )));
        }
        let r = &self.rings;
        let gaps_ok = r.now > 0.0
            && r.today - r.now >= MIN_RING_GAP
            && r.later - r.today >= MIN_RING_GAP
            && r.later <= MAX_RING;
        if !gaps_ok {
            return Err(ConfigError::Invalid(format!(
                "rings must increase by at least {MIN_RING_GAP} and stay within {MAX_RING} (got {} / {} / {})",
                r.now, r.today, r.later
            )));
        }
        Ok(())
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_secs(self.tick_interval_secs)
    }

    pub fn focus_clear_delay(&self) -> Duration {
        Duration::from_millis(self.focus_clear_ms)
    }

    pub fn engine(&self) -> LayoutEngine {
        LayoutEngine::new(self.thresholds, self.rings)
    }
}

pub fn default_path() -> Option<PathBuf> {
    ProjectDirs::from("", "", "radar").map(|dirs| dirs.config_dir().join(CONFIG_FILE))
}
