use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

/// Global configuration loaded from `~/.config/ulv/config.toml`.
///
/// Construction-time only: a `BatchValidator` snapshots these values and is
/// not reconfigured afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UlvConfig {
    /// Cache entry lifetime in minutes. Zero means entries are always
    /// considered expired (caching effectively off).
    pub ttl_minutes: u64,
    /// Per-probe timeout in milliseconds, spanning connect + response across
    /// all redirect hops of one probe.
    pub timeout_ms: u64,
    /// Maximum probes in flight per batch window.
    pub max_concurrent: usize,
}

impl Default for UlvConfig {
    fn default() -> Self {
        Self {
            ttl_minutes: 5,
            timeout_ms: 5000,
            max_concurrent: 5,
        }
    }
}

impl UlvConfig {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_minutes * 60)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("ulv")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<UlvConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = UlvConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    let data = fs::read_to_string(&path)?;
    let cfg: UlvConfig = toml::from_str(&data)?;
    Ok(cfg)
}
