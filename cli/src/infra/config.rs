//! Infrastructure implementation of the `ConfigStore` port.

use anyhow::{Context, Result};
use std::path::PathBuf;

use crate::application::ports::ConfigStore;
use crate::domain::config::ProvisionConfig;

/// Environment variable that overrides the config file location.
pub const CONFIG_ENV: &str = "DENO_PROVISION_CONFIG";
/// Config file looked up in the working directory when nothing else is given.
pub const DEFAULT_CONFIG_FILE: &str = "provision.yaml";

/// Production implementation of `ConfigStore` that reads a YAML file on disk.
///
/// An explicitly chosen file (flag or environment) must exist. The default
/// `./provision.yaml` is optional and yields an empty config when absent.
pub struct YamlConfigStore {
    explicit: Option<PathBuf>,
}

impl YamlConfigStore {
    /// Store reading `explicit` if given, else `$DENO_PROVISION_CONFIG`,
    /// else `./provision.yaml`.
    #[must_use]
    pub fn new(explicit: Option<PathBuf>) -> Self {
        let explicit = explicit.or_else(|| {
            std::env::var_os(CONFIG_ENV)
                .filter(|v| !v.is_empty())
                .map(PathBuf::from)
        });
        Self { explicit }
    }
}

impl ConfigStore for YamlConfigStore {
    fn load(&self) -> Result<ProvisionConfig> {
        let path = self.path();
        if self.explicit.is_none() && !path.exists() {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            return Ok(ProvisionConfig::default());
        }
        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("cannot read {}", path.display()))?;
        if content.trim().is_empty() {
            return Ok(ProvisionConfig::default());
        }
        serde_yaml::from_str(&content).with_context(|| format!("cannot parse {}", path.display()))
    }

    fn path(&self) -> PathBuf {
        self.explicit
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE))
    }
}
