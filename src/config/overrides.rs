//! Command-line overrides in `dotted.key=value` form.
//!
//! Values are read as YAML scalars/flow collections, so `nodes=2` is a number,
//! `account=null` clears a key and `container_mounts=[/data,/scratch]` is a list.
//! A leading `+` is accepted and ignored; a leading `~` removes the key.
//! Unquoted text that YAML would shorten (` #` comments) or turn into a mapping
//! (`a: b`) is kept exactly as typed.

use crate::error::ConfigError;
use serde_json::{Map, Value};

/// What an override does to its key.
#[derive(Debug, Clone, PartialEq)]
pub enum OverrideAction {
    Set(Value),
    Delete,
}

/// A parsed override argument.
#[derive(Debug, Clone, PartialEq)]
pub struct Override {
    pub path: Vec<String>,
    pub action: OverrideAction,
}

/// Parse a single `key=value`, `+key=value` or `~key` argument.
pub fn parse_override(arg: &str) -> Result<Override, ConfigError> {
    let invalid = || ConfigError::InvalidOverride(arg.to_string());

    if let Some(key) = arg.strip_prefix('~') {
        let key = key.split('=').next().unwrap_or_default();
        return Ok(Override {
            path: split_key(key).ok_or_else(invalid)?,
            action: OverrideAction::Delete,
        });
    }

    let arg_body = arg.strip_prefix('+').unwrap_or(arg);
    let (key, raw) = arg_body.split_once('=').ok_or_else(invalid)?;
    let path = split_key(key.trim()).ok_or_else(invalid)?;

    Ok(Override {
        path,
        action: OverrideAction::Set(parse_value(raw)),
    })
}

/// Apply an override to a configuration root, creating intermediate mappings.
pub fn apply_override(root: &mut Value, ov: &Override) -> Result<(), ConfigError> {
    let display = ov.path.join(".");
    let (last, parents) = ov
        .path
        .split_last()
        .ok_or_else(|| ConfigError::InvalidOverride(display.clone()))?;

    let mut node = root;
    for segment in parents {
        let map = as_map_mut(node, &display)?;
        node = map
            .entry(segment.clone())
            .or_insert_with(|| Value::Object(Map::new()));
    }

    let map = as_map_mut(node, &display)?;
    match &ov.action {
        OverrideAction::Set(value) => {
            map.insert(last.clone(), value.clone());
        }
        OverrideAction::Delete => {
            map.remove(last);
        }
    }
    Ok(())
}

fn as_map_mut<'a>(
    node: &'a mut Value,
    display: &str,
) -> Result<&'a mut Map<String, Value>, ConfigError> {
    if node.is_null() {
        *node = Value::Object(Map::new());
    }
    node.as_object_mut().ok_or_else(|| {
        ConfigError::InvalidOverride(format!("{} (parent is not a mapping)", display))
    })
}

fn split_key(key: &str) -> Option<Vec<String>> {
    if key.is_empty() {
        return None;
    }
    let parts: Vec<String> = key.split('.').map(str::to_string).collect();
    if parts.iter().any(|p| p.is_empty()) {
        return None;
    }
    Some(parts)
}

fn parse_value(raw: &str) -> Value {
    let raw = raw.trim();
    if raw.is_empty() {
        return Value::String(String::new());
    }
    let literal = || Value::String(raw.to_string());
    match serde_yaml::from_str::<Value>(raw) {
        Ok(Value::String(s)) if s != raw && !is_quoted(raw) => literal(),
        Ok(Value::Object(_)) if !raw.starts_with('{') => literal(),
        Ok(value) => value,
        // Anything YAML can't read as a value is taken literally
        Err(_) => literal(),
    }
}

fn is_quoted(raw: &str) -> bool {
    raw.starts_with('"') || raw.starts_with('\'')
}
