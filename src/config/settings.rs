//! Effective settings with provenance

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::defaults::builtin_layer;
use super::merge::{merge_layers, toml_to_json};
use crate::driver::{FailurePolicy, PropagationOptions};

/// File name looked up in the working directory when `--config` is absent
pub const LOCAL_CONFIG_FILE: &str = "holiday-sync.toml";

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("cannot read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid TOML in {path}: {source}")]
    Toml {
        path: String,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Where a layer came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfigOrigin {
    Builtin,
    User,
    File,
    Cli,
}

/// A contributing layer
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConfigSource {
    pub origin: ConfigOrigin,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

impl fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let origin = match self.origin {
            ConfigOrigin::Builtin => "builtin",
            ConfigOrigin::User => "user",
            ConfigOrigin::File => "file",
            ConfigOrigin::Cli => "cli",
        };
        match &self.path {
            Some(path) => write!(f, "{} ({})", origin, path),
            None => write!(f, "{}", origin),
        }
    }
}

/// Output rendering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Human,
    Json,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StoreSettings {
    /// Directory holding one `<id>.json` file per instance
    pub path: PathBuf,
}

/// Fully merged settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Settings {
    pub store: StoreSettings,
    pub overwrite_target_holidays: bool,
    pub on_target_failure: FailurePolicy,
    pub output: OutputFormat,
}

/// Inputs for [`Settings::load`]
#[derive(Debug, Clone, Default)]
pub struct LoadOptions {
    /// User-level file, skipped when it does not exist
    pub user_file: Option<PathBuf>,
    /// Explicit `--config` file, which must exist
    pub explicit_file: Option<PathBuf>,
    /// Fallback file in the working directory, skipped when it does not exist
    pub local_file: Option<PathBuf>,
    /// Overrides from command-line flags
    pub cli: Value,
}

impl LoadOptions {
    /// Standard lookup: `~/.config/holiday-sync/config.toml`, then the
    /// explicit file or `./holiday-sync.toml`
    pub fn standard(explicit_file: Option<PathBuf>, cli: Value) -> Self {
        Self {
            user_file: Settings::user_config_path(),
            explicit_file,
            local_file: Some(PathBuf::from(LOCAL_CONFIG_FILE)),
            cli,
        }
    }
}

impl Settings {
    /// `~/.config/holiday-sync/config.toml`, when HOME is set
    pub fn user_config_path() -> Option<PathBuf> {
        std::env::var_os("HOME")
            .map(|home| PathBuf::from(home).join(".config/holiday-sync/config.toml"))
    }

    /// Merge every layer and return the settings with their sources
    pub fn load(options: &LoadOptions) -> Result<(Self, Vec<ConfigSource>), ConfigError> {
        let mut layers = vec![builtin_layer()];
        let mut sources = vec![ConfigSource {
            origin: ConfigOrigin::Builtin,
            path: None,
        }];

        if let Some(path) = options.user_file.as_deref().filter(|p| p.exists()) {
            layers.push(load_toml(path)?);
            sources.push(ConfigSource {
                origin: ConfigOrigin::User,
                path: Some(path.display().to_string()),
            });
        }

        let file = match &options.explicit_file {
            Some(path) => Some(path.as_path()),
            None => options.local_file.as_deref().filter(|p| p.exists()),
        };
        if let Some(path) = file {
            layers.push(load_toml(path)?);
            sources.push(ConfigSource {
                origin: ConfigOrigin::File,
                path: Some(path.display().to_string()),
            });
        }

        if options.cli.as_object().is_some_and(|m| !m.is_empty()) {
            layers.push(options.cli.clone());
            sources.push(ConfigSource {
                origin: ConfigOrigin::Cli,
                path: None,
            });
        }

        let merged = merge_layers(layers);
        let settings: Settings =
            serde_json::from_value(merged).map_err(|e| ConfigError::Invalid(e.to_string()))?;
        settings.validate()?;
        Ok((settings, sources))
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.store.path.as_os_str().is_empty() {
            return Err(ConfigError::Invalid("store.path must not be empty".to_string()));
        }
        Ok(())
    }

    /// Driver options for a run, with the simulate flag supplied by the caller
    pub fn propagation_options(&self, simulate: bool) -> PropagationOptions {
        PropagationOptions {
            overwrite: self.overwrite_target_holidays,
            simulate,
            on_target_failure: self.on_target_failure,
        }
    }
}

fn load_toml(path: &Path) -> Result<Value, ConfigError> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.display().to_string(),
        source,
    })?;
    let doc: toml::Value = toml::from_str(&content).map_err(|source| ConfigError::Toml {
        path: path.display().to_string(),
        source,
    })?;
    Ok(toml_to_json(doc))
}
