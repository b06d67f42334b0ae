//! Flat-file key/value configuration store with positional rewrite semantics.
//!
//! Files in this format are ordered lists of `KEY <sep> VALUE` lines. The
//! store keeps each non-comment line as an opaque string, splitting on the
//! separator only when a caller asks for values. Insertion order is
//! preserved and keys are not required to be unique: several appliance
//! parameters are multi-valued and appear once per value.
//!
//! On write the whole line list is serialized at once, wrapped in a fixed
//! banner comment block; the store is never partially flushed.

use std::fs;
use std::path::PathBuf;

use tracing::debug;

use crate::error::{ConsoleError, Result};
use crate::paths::ConsolePaths;

/// First banner line written ahead of the content.
pub const BANNER_HEADER: &str = "# BOOTCONSOLE MANAGED FILE";
/// Warning line written after the header.
pub const BANNER_WARNING: &str = "# Do not edit this file by hand";
/// Closing banner line.
pub const BANNER_FOOTER: &str = "# END BOOTCONSOLE MANAGED FILE";

/// Result of a key lookup.
///
/// Callers must match on `Missing` rather than relying on emptiness: an
/// empty value and an absent key are different answers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup {
    /// No stored line starts with the requested prefix.
    Missing,
    /// Exactly one line matched; collapsed to its bare value.
    One(String),
    /// Several lines matched; values in insertion order.
    Many(Vec<String>),
}

impl Lookup {
    /// The single value, if exactly one line matched.
    pub fn single(&self) -> Option<&str> {
        match self {
            Lookup::One(v) => Some(v),
            _ => None,
        }
    }

    /// All matched values, empty when missing.
    pub fn values(&self) -> Vec<&str> {
        match self {
            Lookup::Missing => Vec::new(),
            Lookup::One(v) => vec![v.as_str()],
            Lookup::Many(vs) => vs.iter().map(String::as_str).collect(),
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, Lookup::Missing)
    }
}

/// An ordered flat-file key/value store.
#[derive(Debug, Clone)]
pub struct ConfigStore {
    path: PathBuf,
    /// Separator between key and value; `None` means any whitespace run.
    separator: Option<char>,
    lines: Vec<String>,
}

impl ConfigStore {
    /// Load a store by file name, resolved against the search directories.
    ///
    /// Blank and comment lines are dropped; everything else is kept verbatim
    /// in file order. Fails with `NotFound` when no candidate directory
    /// contains the file.
    pub fn load(name: &str, paths: &ConsolePaths) -> Result<Self> {
        let path = paths.resolve(name)?;
        Self::load_path(path)
    }

    /// Load a store from an explicit path.
    pub fn load_path(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let content = fs::read_to_string(&path)?;
        let lines = content
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
            .map(str::to_string)
            .collect::<Vec<_>>();
        debug!("loaded {} lines from {}", lines.len(), path.display());
        Ok(Self {
            path,
            separator: None,
            lines,
        })
    }

    /// Use an explicit key/value separator instead of whitespace.
    pub fn with_separator(mut self, sep: char) -> Self {
        self.separator = Some(sep);
        self
    }

    /// The file this store was loaded from and will be written back to.
    pub fn path(&self) -> &std::path::Path {
        &self.path
    }

    /// The raw ordered line list.
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    fn split_line<'a>(&self, line: &'a str) -> (&'a str, &'a str) {
        match self.separator {
            Some(sep) => match line.split_once(sep) {
                Some((k, v)) => (k.trim(), v.trim()),
                None => (line.trim(), ""),
            },
            None => match line.split_once(char::is_whitespace) {
                Some((k, v)) => (k, v.trim()),
                None => (line, ""),
            },
        }
    }

    /// Look up lines whose key starts with `key_prefix`, returning value
    /// portions (after the separator split).
    pub fn get(&self, key_prefix: &str) -> Lookup {
        self.lookup(key_prefix, |line| self.split_line(line).1.to_string())
    }

    /// Look up lines whose key starts with `key_prefix`, returning whole
    /// raw lines.
    pub fn get_raw(&self, key_prefix: &str) -> Lookup {
        self.lookup(key_prefix, str::to_string)
    }

    fn lookup(&self, key_prefix: &str, project: impl Fn(&str) -> String) -> Lookup {
        let mut matches: Vec<String> = self
            .lines
            .iter()
            .filter(|line| self.split_line(line).0.starts_with(key_prefix))
            .map(|line| project(line))
            .collect();
        match matches.len() {
            0 => Lookup::Missing,
            1 => Lookup::One(matches.remove(0)),
            _ => Lookup::Many(matches),
        }
    }

    /// Position of the first line whose key starts with `key_prefix`.
    pub fn position(&self, key_prefix: &str) -> Option<usize> {
        self.lines
            .iter()
            .position(|line| self.split_line(line).0.starts_with(key_prefix))
    }

    /// Append or insert a `key value` line.
    ///
    /// No deduplication is performed: calling `set` twice with the same key
    /// yields two entries. Multi-valued parameters rely on this; callers
    /// that want replace semantics must `delete` first.
    pub fn set(&mut self, key: &str, value: &str, at: Option<usize>) {
        let sep = self.separator.unwrap_or(' ');
        let line = if value.is_empty() {
            key.to_string()
        } else {
            format!("{key}{sep}{value}")
        };
        match at {
            Some(index) if index <= self.lines.len() => self.lines.insert(index, line),
            _ => self.lines.push(line),
        }
    }

    /// Remove every line whose key starts with `key_prefix`; returns the
    /// number of lines removed.
    pub fn delete(&mut self, key_prefix: &str) -> usize {
        let sep = self.separator;
        let before = self.lines.len();
        self.lines.retain(|line| {
            let key = match sep {
                Some(s) => line.split_once(s).map(|(k, _)| k.trim()).unwrap_or(line.trim()),
                None => line
                    .split_once(char::is_whitespace)
                    .map(|(k, _)| k)
                    .unwrap_or(line.as_str()),
            };
            !key.starts_with(key_prefix)
        });
        before - self.lines.len()
    }

    /// Serialize the full ordered line list, wrapped in the banner block.
    ///
    /// The write is a single whole-file rewrite; I/O failure is returned as
    /// a structured error and leaves the caller free to retry or report.
    pub fn write(&self) -> Result<()> {
        let mut out = String::new();
        out.push_str(BANNER_HEADER);
        out.push('\n');
        out.push_str(BANNER_WARNING);
        out.push('\n');
        for line in &self.lines {
            out.push_str(line);
            out.push('\n');
        }
        out.push_str(BANNER_FOOTER);
        out.push('\n');
        fs::write(&self.path, out)?;
        debug!("wrote {} lines to {}", self.lines.len(), self.path.display());
        Ok(())
    }
}
