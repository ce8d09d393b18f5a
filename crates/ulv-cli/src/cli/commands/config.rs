//! `ulv config` – show the effective configuration.

use anyhow::Result;

use ulv_core::config::{self, UlvConfig};

pub fn run_config(cfg: &UlvConfig) -> Result<()> {
    let path = config::config_path()?;
    println!("# {}", path.display());
    print!("{}", toml::to_string_pretty(cfg)?);
    Ok(())
}
