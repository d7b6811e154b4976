use anyhow::{Context, Result};
use calbook_core::zone;
use chrono_tz::Tz;
use config::{Config, File};
use serde::Deserialize;
use std::path::{Path, PathBuf};

static DEFAULT_TIMEZONE: &str = "America/New_York";

fn default_timezone() -> String {
    DEFAULT_TIMEZONE.to_string()
}

/// Settings from ~/.config/calbook/config.toml. Every key is optional.
#[derive(Debug, Clone, Deserialize)]
pub struct CalbookConfig {
    /// Zone for `create calendar` when `--timezone` is left out
    #[serde(default = "default_timezone")]
    pub default_timezone: String,

    /// Directory relative export paths are written into
    #[serde(default)]
    pub export_dir: Option<PathBuf>,
}

impl Default for CalbookConfig {
    fn default() -> Self {
        CalbookConfig {
            default_timezone: default_timezone(),
            export_dir: None,
        }
    }
}

impl CalbookConfig {
    /// Get the config file path (~/.config/calbook/config.toml)
    pub fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("Could not determine config directory")?
            .join("calbook");
        Ok(config_dir.join("config.toml"))
    }

    /// Load from `path`, or from the default location when none is given.
    ///
    /// An explicit path must exist; the default file may be missing.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let (path, required) = match path {
            Some(p) => (p.to_path_buf(), true),
            None => (Self::config_path()?, false),
        };

        let config: CalbookConfig = Config::builder()
            .add_source(File::from(path.clone()).required(required))
            .build()
            .with_context(|| format!("Could not read config file {}", path.display()))?
            .try_deserialize()
            .with_context(|| format!("Invalid config file {}", path.display()))?;

        config.default_zone()?;
        Ok(config)
    }

    pub fn default_zone(&self) -> Result<Tz> {
        zone::parse_time_zone(&self.default_timezone)
            .context("Invalid default_timezone in config")
    }

    /// Resolve an export file name against `export_dir`.
    pub fn export_path(&self, file: &Path) -> PathBuf {
        match &self.export_dir {
            Some(dir) if file.is_relative() => dir.join(file),
            _ => file.to_path_buf(),
        }
    }
}
