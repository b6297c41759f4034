//! occctl configuration file
//!
//! ```toml
//! [occ]
//! php = "sudo -u www-data php"
//! script = "occ"
//! root_directory = "/var/www/nextcloud"
//! ```

use crate::paths;
use anyhow::{Context, Result};
use occkit::backend::occ::{DEFAULT_PHP, DEFAULT_SCRIPT};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OccctlConfig {
    #[serde(default)]
    pub occ: OccConfig,
}

/// How to launch occ and where Nextcloud lives
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OccConfig {
    /// Interpreter, possibly with a wrapper: `sudo -u www-data php`
    #[serde(default)]
    pub php: Option<String>,
    /// Script path, relative to the root directory
    #[serde(default)]
    pub script: Option<String>,
    /// Used when a request names no root directory
    #[serde(default)]
    pub root_directory: Option<String>,
}

impl OccConfig {
    pub fn php(&self) -> &str {
        self.php.as_deref().unwrap_or(DEFAULT_PHP)
    }

    pub fn script(&self) -> &str {
        self.script.as_deref().unwrap_or(DEFAULT_SCRIPT)
    }

    pub fn root_directory(&self) -> Option<PathBuf> {
        self.root_directory.as_deref().map(paths::expand)
    }
}

impl OccctlConfig {
    /// Load from an explicit path or the default location
    ///
    /// An explicit path must exist; a missing default file means defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let path = match explicit {
            Some(path) => paths::expand(&path.to_string_lossy()),
            None => {
                let path = paths::default_config_file()?;
                if !path.exists() {
                    log::debug!("No config file at {}, using defaults", path.display());
                    return Ok(Self::default());
                }
                path
            }
        };

        Self::load_from(&path)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Could not read config file: {}", path.display()))?;
        log::debug!("Loaded config from {}", path.display());
        toml::from_str(&content)
            .with_context(|| format!("Invalid TOML format in {}", path.display()))
    }

    /// Apply `--php`/`--occ` overrides
    pub fn with_overrides(mut self, php: Option<String>, script: Option<String>) -> Self {
        if php.is_some() {
            self.occ.php = php;
        }
        if script.is_some() {
            self.occ.script = script;
        }
        self
    }
}
