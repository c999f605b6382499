// src/config/model.rs

use serde::Deserialize;
use shared::constants::{
    DEFAULT_INDEX, DEFAULT_PLAYBOOK_TARGET, DEFAULT_REGION, DEFAULT_RESULT_CAP,
    DEFAULT_STORE_ENDPOINT,
};
use std::{net::SocketAddr, time::Duration};
use thiserror::Error;

/// Top-level runtime config
#[derive(Debug, Clone)]
pub struct Config {
    pub logging:  LoggingConfig,
    pub store:    StoreConfig,
    pub detector: DetectorConfig,
    pub dispatch: DispatchConfig,
    pub cloud:    CloudConfig,
    pub metrics:  MetricsConfig,
}

/// Mirror of the `[logging]` table
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default)]            pub enable: bool,
    #[serde(default)]            pub file:   Option<String>,
    #[serde(default = "default_level")] pub level: String,
}
fn default_level() -> String { "INFO".into() }

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { enable: false, file: None, level: default_level() }
    }
}

/// Index store addressing
#[derive(Debug, Clone)]
pub struct StoreConfig {
    pub endpoint: String,
    pub index:    String,
    pub timeout:  Duration,
}

/// Detection query and allowlist policy
#[derive(Debug, Clone)]
pub struct DetectorConfig {
    pub result_cap: usize,
    /// Pause between scans in `serve` mode.
    pub interval:   Duration,
    /// CIDR ranges or literal address prefixes that are never remediated.
    pub allowlist:  Vec<String>,
}

/// Detector → responder hand-off
#[derive(Debug, Clone)]
pub struct DispatchConfig {
    /// Responder address: an `http(s)://` URL, or a queue name for the
    /// in-process responder.
    pub target:         String,
    pub queue_capacity: usize,
    pub timeout:        Duration,
}

/// Control-plane addressing for the remediation capabilities
#[derive(Debug, Clone)]
pub struct CloudConfig {
    pub region:   String,
    /// Gateway base URL; `None` selects the dry-run control plane.
    pub endpoint: Option<String>,
    pub timeout:  Duration,
}

/// Mirror of the `[metrics]` table
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MetricsConfig {
    #[serde(default)]
    pub listen: Option<SocketAddr>,
}

// ───── raw TOML stubs (durations as humantime strings) ─────────────────────

/// Holds the config exactly as written in TOML
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RawConfig {
    pub logging:  LoggingConfig,
    pub store:    StoreStub,
    pub detector: DetectorStub,
    pub dispatch: DispatchStub,
    pub cloud:    CloudStub,
    pub metrics:  MetricsConfig,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct StoreStub {
    pub endpoint: String,
    pub index:    String,
    pub timeout:  String,
}

impl Default for StoreStub {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_STORE_ENDPOINT.into(),
            index:    DEFAULT_INDEX.into(),
            timeout:  "10s".into(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct DetectorStub {
    pub result_cap: usize,
    pub interval:   String,
    pub allowlist:  Vec<String>,
}

impl Default for DetectorStub {
    fn default() -> Self {
        Self {
            result_cap: DEFAULT_RESULT_CAP,
            interval:   "5m".into(),
            allowlist:  vec!["203.0.113.0/24".into()],
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct DispatchStub {
    pub target:         String,
    pub queue_capacity: usize,
    pub timeout:        String,
}

impl Default for DispatchStub {
    fn default() -> Self {
        Self { target: DEFAULT_PLAYBOOK_TARGET.into(), queue_capacity: 1_024, timeout: "10s".into() }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct CloudStub {
    pub region:   String,
    pub endpoint: Option<String>,
    pub timeout:  String,
}

impl Default for CloudStub {
    fn default() -> Self {
        Self { region: DEFAULT_REGION.into(), endpoint: None, timeout: "10s".into() }
    }
}

/// All the ways config loading can go wrong
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid duration '{0}': {1}")]
    InvalidDuration(String, #[source] humantime::DurationError),

    #[error("result_cap must be at least 1")]
    ZeroResultCap,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
}

fn parse_duration(raw: &str) -> Result<Duration, ConfigError> {
    humantime::parse_duration(raw).map_err(|e| ConfigError::InvalidDuration(raw.into(), e))
}

impl TryFrom<RawConfig> for Config {
    type Error = ConfigError;

    fn try_from(raw: RawConfig) -> Result<Self, Self::Error> {
        if raw.detector.result_cap == 0 {
            return Err(ConfigError::ZeroResultCap);
        }
        Ok(Config {
            logging: raw.logging,
            store: StoreConfig {
                endpoint: raw.store.endpoint.trim_end_matches('/').to_owned(),
                index:    raw.store.index,
                timeout:  parse_duration(&raw.store.timeout)?,
            },
            detector: DetectorConfig {
                result_cap: raw.detector.result_cap,
                interval:   parse_duration(&raw.detector.interval)?,
                allowlist:  raw.detector.allowlist,
            },
            dispatch: DispatchConfig {
                target:         raw.dispatch.target,
                queue_capacity: raw.dispatch.queue_capacity,
                timeout:        parse_duration(&raw.dispatch.timeout)?,
            },
            cloud: CloudConfig {
                region:   raw.cloud.region,
                endpoint: raw
                    .cloud
                    .endpoint
                    .filter(|e| !e.trim().is_empty())
                    .map(|e| e.trim_end_matches('/').to_owned()),
                timeout:  parse_duration(&raw.cloud.timeout)?,
            },
            metrics: raw.metrics,
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            logging: LoggingConfig::default(),
            store: StoreConfig {
                endpoint: DEFAULT_STORE_ENDPOINT.into(),
                index:    DEFAULT_INDEX.into(),
                timeout:  Duration::from_secs(10),
            },
            detector: DetectorConfig {
                result_cap: DEFAULT_RESULT_CAP,
                interval:   Duration::from_secs(300),
                allowlist:  DetectorStub::default().allowlist,
            },
            dispatch: DispatchConfig {
                target:         DEFAULT_PLAYBOOK_TARGET.into(),
                queue_capacity: 1_024,
                timeout:        Duration::from_secs(10),
            },
            cloud: CloudConfig {
                region:   DEFAULT_REGION.into(),
                endpoint: None,
                timeout:  Duration::from_secs(10),
            },
            metrics: MetricsConfig::default(),
        }
    }
}
