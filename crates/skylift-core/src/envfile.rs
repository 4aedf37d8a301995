//! Loader for the loosely-structured credentials file.
//!
//! The file is a flat list of `KEY=value` lines, but real-world copies also
//! contain `KEY: value` and `KEY value` lines, so all three forms are
//! accepted. Precedence is last-match-wins: patterns run in a fixed order
//! and each match overwrites any earlier value for the same key.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{SkyliftError, SkyliftResult};

/// Line patterns recognized in the environment file, applied in order.
/// Keys are uppercase letters and underscores; values may be wrapped in
/// single or double quotes, which are stripped. The bare-whitespace form
/// rejects values starting with `=` or `:` so it cannot re-capture a
/// spaced `KEY = value` line with the separator glued to the value.
static LINE_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    vec![
        Regex::new(r#"(?m)^([A-Z_]+)[ \t]*=[ \t]*["']?([^"'\n]+?)["']?[ \t]*$"#).unwrap(),
        Regex::new(r#"(?m)^([A-Z_]+)[ \t]*:[ \t]*["']?([^"'\n]+?)["']?[ \t]*$"#).unwrap(),
        Regex::new(r#"(?m)^([A-Z_]+)[ \t]+["']?([^"'=:\n][^"'\n]*?)["']?[ \t]*$"#).unwrap(),
    ]
});

/// Parsed key/value mapping from a credentials file.
///
/// Loaded once per run and immutable thereafter.
#[derive(Debug, Clone)]
pub struct EnvFile {
    path: PathBuf,
    values: HashMap<String, String>,
}

impl EnvFile {
    /// Read and parse the file at `path`. A missing or unreadable file is
    /// a fatal configuration error.
    pub fn load<P: AsRef<Path>>(path: P) -> SkyliftResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            SkyliftError::config(format!(
                "cannot read environment file {}: {}",
                path.display(),
                e
            ))
        })?;
        Ok(Self {
            path: path.to_path_buf(),
            values: Self::parse(&content),
        })
    }

    /// Build an `EnvFile` from already-known values (used by tests and by
    /// callers that assemble configuration programmatically).
    pub fn from_values(values: HashMap<String, String>) -> Self {
        Self {
            path: PathBuf::new(),
            values,
        }
    }

    /// Apply every line pattern over `content`, accumulating matches.
    /// Last-match-wins across patterns and across duplicate lines.
    pub fn parse(content: &str) -> HashMap<String, String> {
        let mut values = HashMap::new();
        for pattern in LINE_PATTERNS.iter() {
            for caps in pattern.captures_iter(content) {
                let key = caps[1].trim();
                let value = caps[2].trim();
                if !key.is_empty() && !value.is_empty() {
                    values.insert(key.to_string(), value.to_string());
                }
            }
        }
        values
    }

    /// Path this file was loaded from (empty for in-memory values).
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    /// Probe an ordered list of acceptable key names and take the first
    /// non-empty match.
    pub fn resolve(&self, aliases: &[&str]) -> Option<&str> {
        aliases
            .iter()
            .filter_map(|key| self.get(key))
            .find(|value| !value.is_empty())
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
