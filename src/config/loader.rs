//! Config file loader.

use crate::config::{interpolate, overrides, ConfigTree};
use crate::error::ConfigError;
use serde_json::Value;
use std::fs;
use std::path::Path;

/// Supported on-disk formats, picked by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Yaml,
    Json,
    Toml,
}

impl ConfigFormat {
    /// Detect the format from a path's extension.
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("yaml") | Some("yml") => Ok(ConfigFormat::Yaml),
            Some("json") => Ok(ConfigFormat::Json),
            Some("toml") => Ok(ConfigFormat::Toml),
            Some(ext) => Err(ConfigError::ValidationFailed(format!(
                "Configuration file must have .yaml, .yml, .json or .toml extension, got .{}",
                ext
            ))),
            None => Err(ConfigError::ValidationFailed(
                "Configuration file must have .yaml, .yml, .json or .toml extension".to_string(),
            )),
        }
    }
}

/// Parse configuration text in the given format into a [`ConfigTree`].
pub fn parse_config_str(content: &str, format: ConfigFormat) -> Result<ConfigTree, ConfigError> {
    let root: Value = match format {
        ConfigFormat::Yaml => serde_yaml::from_str(content)?,
        ConfigFormat::Json => serde_json::from_str(content)?,
        ConfigFormat::Toml => toml::from_str(content)?,
    };
    ConfigTree::new(root)
}

/// Load config from a YAML, JSON or TOML file, without overrides or interpolation.
pub fn load_config_from_file(path: &Path) -> Result<ConfigTree, ConfigError> {
    validate_config_path(path)?;
    let format = ConfigFormat::from_path(path)?;

    let content = fs::read_to_string(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            ConfigError::FileNotFound(format!(
                "Configuration file not found at: {}",
                path.display()
            ))
        } else {
            ConfigError::IoError(e)
        }
    })?;

    log::debug!("[Config] Read {} bytes from {}", content.len(), path.display());
    parse_config_str(&content, format)
}

/// Load a config file, apply `key=value` overrides, then resolve `${...}` references.
///
/// This is the full pipeline the CLI runs before handing the tree to the orchestrator.
/// References that cannot be resolved stay in the tree and only fail when read.
pub fn prepare_config<S: AsRef<str>>(
    path: &Path,
    override_args: &[S],
) -> Result<ConfigTree, ConfigError> {
    let mut root = load_config_from_file(path)?.into_inner();

    for arg in override_args {
        let arg = arg.as_ref();
        let parsed = overrides::parse_override(arg)?;
        log::debug!("[Config] Applying override: {}", arg);
        overrides::apply_override(&mut root, &parsed)?;
    }

    let resolved = interpolate::resolve(&root);
    log::info!("[Config] Loaded configuration from {}", path.display());
    ConfigTree::new(resolved)
}

/// Validate config path: non-empty, UTF-8, known extension.
pub fn validate_config_path(path: &Path) -> Result<(), ConfigError> {
    if path.as_os_str().is_empty() {
        return Err(ConfigError::ValidationFailed(
            "Configuration path cannot be empty".to_string(),
        ));
    }

    if path.to_str().is_none() {
        return Err(ConfigError::ValidationFailed(
            "Configuration path contains invalid characters".to_string(),
        ));
    }

    ConfigFormat::from_path(path).map(|_| ())
}
