use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::error::{BedlambError, Result};

/// Optional AWS overrides read from `~/.bedlamb/config.toml`.
#[derive(Debug, Deserialize, Default, Clone, PartialEq)]
pub struct BedlambConfig {
    pub region: Option<String>,
    pub profile: Option<String>,
    pub endpoint_url: Option<String>,
}

impl BedlambConfig {
    /// Loads the config file. An explicit path must exist and parse; the
    /// default path is optional.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        match explicit {
            Some(path) => Self::read(path),
            None => {
                let path = Self::config_path();
                if path.exists() {
                    Self::read(&path)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    /// Fills unset fields from `fallback`.
    pub fn or(self, fallback: Self) -> Self {
        Self {
            region: self.region.or(fallback.region),
            profile: self.profile.or(fallback.profile),
            endpoint_url: self.endpoint_url.or(fallback.endpoint_url),
        }
    }

    fn read(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| BedlambError::Config(format!("cannot read {}: {e}", path.display())))?;
        toml::from_str(&content)
            .map_err(|e| BedlambError::Config(format!("invalid {}: {e}", path.display())))
    }

    fn config_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".bedlamb")
            .join("config.toml")
    }
}
