//! Repository-level configuration
//!
//! An optional `tfpilot.toml` at the repository root adjusts the stack
//! layout, the expected secret names, and the boundary command names. A
//! missing file means defaults; a corrupt file is downgraded to a warning
//! so a deployment is never blocked by a bad knob file.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::PilotResult;
use crate::secrets::PLACEHOLDER_VALUE;

pub const CONFIG_FILE: &str = "tfpilot.toml";

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
    /// Stacks root, relative to the repository root.
    pub stacks_dir: PathBuf,
    /// Secret names the workload expects even before foundry provisions them.
    pub expected_secret_names: Vec<String>,
    /// Stand-in value for secrets without provisioned material.
    pub placeholder_value: String,
    /// External build pipeline entry points.
    pub build_gateway_command: String,
    pub build_hydrenv_command: String,
    /// External environment-sync entry point.
    pub sync_env_command: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            stacks_dir: PathBuf::from("infra/terraform/stacks"),
            expected_secret_names: Vec::new(),
            placeholder_value: PLACEHOLDER_VALUE.to_string(),
            build_gateway_command: "build-and-push-gateway".to_string(),
            build_hydrenv_command: "build-and-push-hydrenv".to_string(),
            sync_env_command: "sync-env".to_string(),
        }
    }
}

impl Config {
    pub fn load(path: &Path) -> PilotResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&text)?)
    }

    /// Load `<root>/tfpilot.toml`, defaulting when absent or unreadable.
    pub fn load_or_default(root: &Path) -> Self {
        let path = root.join(CONFIG_FILE);
        if !path.exists() {
            return Self::default();
        }
        match Self::load(&path) {
            Ok(config) => config,
            Err(error) => {
                tracing::warn!("ignoring invalid {} ({error})", path.display());
                Self::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn defaults_match_the_conventional_layout() {
        let config = Config::default();
        assert_eq!(config.stacks_dir, PathBuf::from("infra/terraform/stacks"));
        assert_eq!(config.placeholder_value, "pending-foundry");
        assert_eq!(config.sync_env_command, "sync-env");
    }

    #[test]
    fn absent_file_yields_defaults() {
        let dir = tempdir().unwrap();
        assert_eq!(Config::load_or_default(dir.path()), Config::default());
    }

    #[test]
    fn partial_file_overrides_only_named_fields() {
        let dir = tempdir().unwrap();
        std::fs::write(
            dir.path().join(CONFIG_FILE),
            "stacks_dir = \"stacks\"\nexpected_secret_names = [\"azure-openai-key-0\"]\n",
        )
        .unwrap();

        let config = Config::load_or_default(dir.path());
        assert_eq!(config.stacks_dir, PathBuf::from("stacks"));
        assert_eq!(config.expected_secret_names, vec!["azure-openai-key-0"]);
        assert_eq!(config.placeholder_value, "pending-foundry");
    }

    #[test]
    fn corrupt_file_degrades_to_defaults() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join(CONFIG_FILE), "stacks_dir = [not toml").unwrap();
        assert_eq!(Config::load_or_default(dir.path()), Config::default());
    }
}
