//! Path resolution for occctl
//!
//! # Config file resolution
//!
//! 1. `--config <path>` (or `OCCCTL_CONFIG`, read by clap)
//! 2. `XDG_CONFIG_HOME/occctl/config.toml` (if set)
//! 3. Platform config dir (`dirs::config_dir()`), `occctl/config.toml`

use anyhow::{Context, Result};
use std::path::PathBuf;

const APP_DIR: &str = "occctl";
const CONFIG_FILE: &str = "config.toml";

/// Get the occctl config directory path
pub fn config_dir() -> Result<PathBuf> {
    if let Ok(xdg_config) = std::env::var("XDG_CONFIG_HOME")
        && !xdg_config.is_empty()
    {
        let path = PathBuf::from(xdg_config).join(APP_DIR);
        log::debug!("Using XDG_CONFIG_HOME: {}", path.display());
        return Ok(path);
    }

    let base = dirs::config_dir().context("Could not determine config directory")?;
    let path = base.join(APP_DIR);
    log::debug!("Using default config dir: {}", path.display());
    Ok(path)
}

/// Default location of the config file
pub fn default_config_file() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE))
}

/// Expand `~` and environment variables in a path string
///
/// Unknown variables are left as written.
pub fn expand(path: &str) -> PathBuf {
    let expanded = shellexpand::full(path).unwrap_or(std::borrow::Cow::Borrowed(path));
    PathBuf::from(expanded.as_ref())
}
