//! `${dotted.key}` references inside configuration strings.
//!
//! A string that is exactly one reference takes the referenced value as-is
//! (numbers stay numbers, lists stay lists). References embedded in longer
//! strings are spliced in as text and must point at scalars.
//!
//! [`resolve`] substitutes every reference it can and leaves the rest as
//! written. Sections the submission never reads may hold dangling keys or
//! resolver calls like `${oc.env:HOME}`; they only fail once read, through
//! [`ensure_resolved`].

use crate::config::lookup;
use crate::error::ConfigError;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

static REFERENCE_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\$\{\s*([^${}\s]+)\s*\}").expect("Invalid reference regex"));
static WHOLE_REFERENCE_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\$\{\s*([^${}\s]+)\s*\}$").expect("Invalid whole reference regex"));

/// Return a copy of `root` with every resolvable reference substituted.
pub fn resolve(root: &Value) -> Value {
    // Non-strict resolution keeps failing references as text and never errors
    Resolver::new(root, false)
        .node(root)
        .unwrap_or_else(|_| root.clone())
}

/// Fail with [`ConfigError::Interpolation`] if `value` still holds a reference.
///
/// `path` is the dotted key being read and ends up in the error message.
pub fn ensure_resolved(root: &Value, path: &str, value: &Value) -> Result<(), ConfigError> {
    if !has_reference(value) {
        return Ok(());
    }
    Resolver::new(root, true)
        .node(value)
        .map_err(|e| match e {
            ConfigError::Interpolation(msg) => {
                ConfigError::Interpolation(format!("{} (reading {})", msg, path))
            }
            other => other,
        })?;
    Err(ConfigError::Interpolation(format!("{} holds an unresolved reference", path)))
}

fn has_reference(value: &Value) -> bool {
    match value {
        Value::String(s) => REFERENCE_REGEX.is_match(s),
        Value::Array(items) => items.iter().any(has_reference),
        Value::Object(map) => map.values().any(has_reference),
        _ => false,
    }
}

struct Resolver<'a> {
    root: &'a Value,
    strict: bool,
    stack: Vec<String>,
}

impl<'a> Resolver<'a> {
    fn new(root: &'a Value, strict: bool) -> Self {
        Resolver {
            root,
            strict,
            stack: Vec::new(),
        }
    }

    fn node(&mut self, node: &Value) -> Result<Value, ConfigError> {
        match node {
            Value::String(s) => self.string(s),
            Value::Array(items) => items
                .iter()
                .map(|item| self.node(item))
                .collect::<Result<Vec<_>, _>>()
                .map(Value::Array),
            Value::Object(map) => {
                let mut out = serde_json::Map::with_capacity(map.len());
                for (key, value) in map {
                    out.insert(key.clone(), self.node(value)?);
                }
                Ok(Value::Object(out))
            }
            other => Ok(other.clone()),
        }
    }

    fn string(&mut self, s: &str) -> Result<Value, ConfigError> {
        if let Some(caps) = WHOLE_REFERENCE_REGEX.captures(s) {
            return match self.reference(&caps[1]) {
                Err(e) if self.strict => Err(e),
                Err(_) => Ok(Value::String(s.to_string())),
                ok => ok,
            };
        }

        let mut out = String::with_capacity(s.len());
        let mut last = 0;
        for caps in REFERENCE_REGEX.captures_iter(s) {
            let Some(whole) = caps.get(0) else { continue };
            out.push_str(&s[last..whole.start()]);
            let key = &caps[1];
            match self.reference(key) {
                Ok(Value::String(text)) => out.push_str(&text),
                Ok(Value::Number(n)) => out.push_str(&n.to_string()),
                Ok(Value::Bool(b)) => out.push_str(&b.to_string()),
                Ok(_) if self.strict => {
                    return Err(ConfigError::Interpolation(format!(
                        "'${{{}}}' in \"{}\" does not point at a scalar",
                        key, s
                    )))
                }
                Err(e) if self.strict => return Err(e),
                _ => out.push_str(whole.as_str()),
            }
            last = whole.end();
        }
        out.push_str(&s[last..]);
        Ok(Value::String(out))
    }

    fn reference(&mut self, key: &str) -> Result<Value, ConfigError> {
        if self.stack.iter().any(|k| k == key) {
            return Err(ConfigError::Interpolation(format!(
                "circular reference: {} -> {}",
                self.stack.join(" -> "),
                key
            )));
        }
        let root = self.root;
        let target = lookup(root, key).ok_or_else(|| {
            ConfigError::Interpolation(format!("'${{{}}}' points at a missing key", key))
        })?;

        self.stack.push(key.to_string());
        let resolved = self.node(target);
        self.stack.pop();
        resolved
    }
}
