//! Configuration module for conversion submissions.
//!
//! The configuration is a read-only tree of named parameters. It is loaded from
//! YAML, JSON or TOML, normalised into a `serde_json::Value`, adjusted by
//! command-line overrides, and finally has its `${...}` references resolved.
//! Consumers read it through the typed accessors on [`ConfigTree`], which report
//! the full dotted key path whenever a value is missing, has the wrong type, or
//! still holds a reference that could not be resolved.
//!
//! # Module Structure
//!
//! - `loader`: reads a configuration file into a [`ConfigTree`]
//! - `overrides`: applies `dotted.key=value` arguments
//! - `interpolate`: resolves `${dotted.key}` references

pub mod interpolate;
pub mod loader;
pub mod overrides;

use crate::error::ConfigError;
use serde_json::Value;

/// Immutable view over a hierarchical configuration.
#[derive(Clone, Debug, PartialEq)]
pub struct ConfigTree {
    root: Value,
}

impl ConfigTree {
    /// Wrap an already-parsed value. The root must be a mapping.
    pub fn new(root: Value) -> Result<Self, ConfigError> {
        if !root.is_object() {
            return Err(ConfigError::ValidationFailed(
                "Configuration root must be a mapping".to_string(),
            ));
        }
        Ok(ConfigTree { root })
    }

    /// Access the raw root value.
    pub fn root(&self) -> &Value {
        &self.root
    }

    /// Consume the tree, returning the raw root value.
    pub fn into_inner(self) -> Value {
        self.root
    }

    /// Look up a dotted path. `null` values are reported as absent.
    ///
    /// A value that still holds an unresolved `${...}` reference is an
    /// [`ConfigError::Interpolation`] error, raised here rather than at load time.
    pub fn get(&self, path: &str) -> Result<Option<&Value>, ConfigError> {
        match lookup(&self.root, path).filter(|v| !v.is_null()) {
            Some(value) => {
                interpolate::ensure_resolved(&self.root, path, value)?;
                Ok(Some(value))
            }
            None => Ok(None),
        }
    }

    /// Look up a dotted path that must be present and non-null.
    pub fn require(&self, path: &str) -> Result<&Value, ConfigError> {
        self.get(path)?.ok_or_else(|| ConfigError::MissingKey(path.to_string()))
    }

    /// Required scalar rendered as a string. Numbers and booleans are accepted
    /// since YAML happily turns `mem: 0` or `dependency: 1234` into numbers.
    pub fn require_str(&self, path: &str) -> Result<String, ConfigError> {
        scalar_to_string(path, self.require(path)?)
    }

    /// Optional scalar rendered as a string.
    pub fn optional_str(&self, path: &str) -> Result<Option<String>, ConfigError> {
        self.get(path)?.map(|v| scalar_to_string(path, v)).transpose()
    }

    pub fn require_u64(&self, path: &str) -> Result<u64, ConfigError> {
        value_to_u64(path, self.require(path)?)
    }

    pub fn optional_u64(&self, path: &str) -> Result<Option<u64>, ConfigError> {
        self.get(path)?.map(|v| value_to_u64(path, v)).transpose()
    }

    pub fn require_bool(&self, path: &str) -> Result<bool, ConfigError> {
        self.require(path)?
            .as_bool()
            .ok_or_else(|| ConfigError::invalid_type(path, "a boolean"))
    }
}

/// Walk a dotted path through nested mappings.
pub(crate) fn lookup<'a>(root: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.')
        .try_fold(root, |node, segment| node.as_object()?.get(segment))
}

fn scalar_to_string(path: &str, value: &Value) -> Result<String, ConfigError> {
    match value {
        Value::String(s) => Ok(s.clone()),
        Value::Number(n) => Ok(n.to_string()),
        Value::Bool(b) => Ok(b.to_string()),
        _ => Err(ConfigError::invalid_type(path, "a scalar")),
    }
}

fn value_to_u64(path: &str, value: &Value) -> Result<u64, ConfigError> {
    match value {
        Value::Number(n) => n
            .as_u64()
            .ok_or_else(|| ConfigError::invalid_type(path, "a non-negative integer")),
        Value::String(s) => s
            .trim()
            .parse()
            .map_err(|_| ConfigError::invalid_type(path, "a non-negative integer")),
        _ => Err(ConfigError::invalid_type(path, "a non-negative integer")),
    }
}
