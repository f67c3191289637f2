use crate::cli::Cli;
use anyhow::{Context, Result};
use serde::Deserialize;
use smb_driver::{MountConfig, Platform};
use std::path::Path;

/// Startup configuration: the option rules plus platform selection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    pub required: String,
    pub allowed: String,
    pub defaults: String,
    pub platform: Option<Platform>,
    pub scripts_dir: Option<String>,
}

impl Settings {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading settings {}", path.display()))?;
        toml::from_str(&content).with_context(|| format!("parsing settings {}", path.display()))
    }

    /// Settings file (if any) with command-line flags layered on top.
    pub fn resolve(cli: &Cli) -> Result<Self> {
        let mut settings = match &cli.config {
            Some(path) => Self::load(path)?,
            None => Self::default(),
        };
        if let Some(required) = &cli.required {
            settings.required = required.clone();
        }
        if let Some(allowed) = &cli.allowed {
            settings.allowed = allowed.clone();
        }
        if let Some(defaults) = &cli.defaults {
            settings.defaults = defaults.clone();
        }
        if cli.platform.is_some() {
            settings.platform = cli.platform;
        }
        if cli.scripts_dir.is_some() {
            settings.scripts_dir = cli.scripts_dir.clone();
        }
        Ok(settings)
    }

    pub fn platform(&self) -> Platform {
        self.platform.unwrap_or_else(Platform::host)
    }

    pub fn mount_config(&self) -> Result<MountConfig> {
        MountConfig::read_conf(&self.required, &self.allowed, &self.defaults)
            .context("invalid mount option rules")
    }
}
