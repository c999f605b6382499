// src/config/loader.rs

//! # Configuration Loader
//!
//! Reads the TOML file into a [`RawConfig`], applies environment overrides
//! (addressing only) and converts the result into a runtime [`Config`].

use crate::config::model::{Config, ConfigError, RawConfig};
use crate::pipeline_log;
use log::Level;
use std::{fs, io::ErrorKind, path::Path};

/// Environment variables that override addressing values from the file.
pub const ENV_STORE_ENDPOINT: &str = "ES_ENDPOINT";
pub const ENV_STORE_INDEX: &str = "ES_INDEX";
pub const ENV_DISPATCH_TARGET: &str = "PLAYBOOK_TARGET";
pub const ENV_DISPATCH_TARGET_LEGACY: &str = "PLAYBOOK_LAMBDA";
pub const ENV_REGION: &str = "AWS_REGION";
pub const ENV_CONTROL_PLANE: &str = "CONTROL_PLANE_ENDPOINT";

/// Load `path` (defaults when it does not exist) and apply the process
/// environment on top.
pub fn load(path: &Path) -> Result<Config, ConfigError> {
    load_with(path, |key| std::env::var(key).ok())
}

/// Same as [`load`] with an explicit variable lookup.
pub fn load_with<F>(path: &Path, lookup: F) -> Result<Config, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    pipeline_log!(Level::Debug, "config", "Reading config from {:?}", path);
    let mut raw = match fs::read_to_string(path) {
        Ok(txt) => toml::from_str::<RawConfig>(&txt)?,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            pipeline_log!(Level::Info, "config", "No config at {:?}, using defaults", path);
            RawConfig::default()
        }
        Err(e) => return Err(e.into()),
    };
    apply_overrides(&mut raw, lookup);
    let cfg = Config::try_from(raw)?;
    pipeline_log!(
        Level::Info,
        "config",
        "Loaded config: store={} index={} dispatch={}",
        cfg.store.endpoint,
        cfg.store.index,
        cfg.dispatch.target
    );
    Ok(cfg)
}

fn apply_overrides<F>(raw: &mut RawConfig, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

    if let Some(v) = get(ENV_STORE_ENDPOINT) {
        raw.store.endpoint = v;
    }
    if let Some(v) = get(ENV_STORE_INDEX) {
        raw.store.index = v;
    }
    if let Some(v) = get(ENV_DISPATCH_TARGET).or_else(|| get(ENV_DISPATCH_TARGET_LEGACY)) {
        raw.dispatch.target = v;
    }
    if let Some(v) = get(ENV_REGION) {
        raw.cloud.region = v;
    }
    if let Some(v) = get(ENV_CONTROL_PLANE) {
        raw.cloud.endpoint = Some(v);
    }
}
