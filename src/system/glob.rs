//! Shell-style path globbing.
//!
//! Supports `*`, `?`, `[abc]`, `[a-z]` and `[!abc]` in any path component.
//! Wildcards never match `/`, and names starting with `.` are only matched by a
//! component that itself starts with `.`. Components without wildcards are
//! taken literally. Unreadable directories simply contribute no matches.

use regex::Regex;
use std::fs;
use std::path::{Component, Path, PathBuf};

/// True when `component` contains glob metacharacters.
pub fn has_magic(component: &str) -> bool {
    component.contains(['*', '?', '['])
}

/// Translate one path component pattern into an anchored regex.
///
/// `None` when a bracket class is not a valid range (`[z-a]`); such a pattern
/// matches nothing.
pub fn component_regex(pattern: &str) -> Option<Regex> {
    let mut re = String::with_capacity(pattern.len() * 2 + 2);
    re.push('^');

    let chars: Vec<char> = pattern.chars().collect();
    let mut i = 0;
    while i < chars.len() {
        match chars[i] {
            '*' => re.push_str("[^/]*"),
            '?' => re.push_str("[^/]"),
            '[' => match class_end(&chars, i) {
                Some(end) => {
                    re.push_str(&translate_class(&chars[i + 1..end]));
                    i = end;
                }
                None => re.push_str(r"\["),
            },
            c => re.push_str(&regex::escape(&c.to_string())),
        }
        i += 1;
    }

    re.push('$');
    Regex::new(&re).ok()
}

/// Index of the `]` closing the class opened at `start`, if any.
/// A `]` directly after `[` or `[!` is a literal member.
fn class_end(chars: &[char], start: usize) -> Option<usize> {
    let mut j = start + 1;
    if j < chars.len() && chars[j] == '!' {
        j += 1;
    }
    if j < chars.len() && chars[j] == ']' {
        j += 1;
    }
    (j..chars.len()).find(|&k| chars[k] == ']')
}

fn translate_class(body: &[char]) -> String {
    let mut out = String::from("[");
    let mut members = body;
    if let Some(('!', rest)) = members.split_first() {
        out.push('^');
        members = rest;
    }
    for &c in members {
        match c {
            '\\' | '[' | ']' | '^' | '&' | '~' => {
                out.push('\\');
                out.push(c);
            }
            other => out.push(other),
        }
    }
    out.push(']');
    out
}

/// Whether `name` matches a single-component pattern.
pub fn matches_component(pattern: &str, name: &str) -> bool {
    if name.starts_with('.') && !pattern.starts_with('.') {
        return false;
    }
    component_regex(pattern).map_or(false, |re| re.is_match(name))
}

/// Expand a path pattern into the sorted list of existing paths it matches.
pub fn glob(pattern: &Path) -> Vec<PathBuf> {
    let mut candidates = vec![PathBuf::new()];

    for component in pattern.components() {
        let magic = match component {
            Component::Normal(part) => part.to_str().filter(|p| has_magic(p)),
            _ => None,
        };

        candidates = match magic {
            Some(part) => match component_regex(part) {
                Some(re) => {
                    let hidden_ok = part.starts_with('.');
                    candidates
                        .iter()
                        .flat_map(|dir| expand_dir(dir, &re, hidden_ok))
                        .collect()
                }
                None => {
                    log::debug!("[Glob] Pattern component '{}' can never match", part);
                    Vec::new()
                }
            },
            None => candidates
                .into_iter()
                .map(|dir| dir.join(component.as_os_str()))
                .collect(),
        };

        if candidates.is_empty() {
            break;
        }
    }

    let mut found: Vec<PathBuf> = candidates
        .into_iter()
        .filter(|p| !p.as_os_str().is_empty() && fs::symlink_metadata(p).is_ok())
        .collect();
    found.sort();
    found
}

fn expand_dir(dir: &Path, re: &Regex, hidden_ok: bool) -> Vec<PathBuf> {
    let listing = if dir.as_os_str().is_empty() {
        Path::new(".")
    } else {
        dir
    };
    let Ok(entries) = fs::read_dir(listing) else {
        return Vec::new();
    };

    entries
        .filter_map(|e| e.ok())
        .filter_map(|entry| {
            let name = entry.file_name();
            let name = name.to_str()?;
            if name.starts_with('.') && !hidden_ok {
                return None;
            }
            re.is_match(name).then(|| dir.join(name))
        })
        .collect()
}
