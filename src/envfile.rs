//! `.env` file loading.
//!
//! Parses `KEY=VALUE` lines into an [`EnvFile`]. The parsed assignments are
//! handed to [`crate::config::ProbeConfig`] explicitly; exporting them into the
//! process environment is a separate, opt-in step ([`EnvFile::apply`]).

use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

/// Default file name, resolved against the working directory.
pub const DEFAULT_ENV_FILE: &str = ".env";

/// Prefix accepted so files written for `source` can be reused.
const EXPORT_PREFIX: &str = "export ";

#[derive(Debug, Error)]
pub enum EnvFileError {
    #[error("{} file not found", path.display())]
    MissingFile { path: PathBuf },

    #[error("failed to read {}: {source}", path.display())]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Assignments parsed from an env file, in file order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvFile {
    entries: Vec<(String, String)>,
}

impl EnvFile {
    /// Read and parse the file at `path`.
    ///
    /// A file with no assignments is still a successful load.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, EnvFileError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(EnvFileError::MissingFile {
                path: path.to_path_buf(),
            });
        }

        let content = std::fs::read_to_string(path).map_err(|source| EnvFileError::FileRead {
            path: path.to_path_buf(),
            source,
        })?;

        let env = Self::parse(&content);
        debug!("Parsed {} assignment(s) from {:?}", env.len(), path);
        Ok(env)
    }

    /// Parse env file content without touching the filesystem.
    pub fn parse(content: &str) -> Self {
        let entries = content.lines().filter_map(parse_line).collect();
        Self { entries }
    }

    /// Last value assigned to `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .rev()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Assigned keys in file order, one per assignment line.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Export every assignment into the process environment.
    ///
    /// Applied in file order, so a repeated key ends up with its last value.
    pub fn apply(&self) {
        for (key, value) in &self.entries {
            // set_var panics on these; such a key can never be looked up anyway
            if key.is_empty() || key.contains('=') || key.contains('\0') || value.contains('\0') {
                debug!("Skipping export of unrepresentable key {:?}", key);
                continue;
            }
            std::env::set_var(key, value);
        }
    }
}

fn parse_line(line: &str) -> Option<(String, String)> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return None;
    }

    let line = line.strip_prefix(EXPORT_PREFIX).unwrap_or(line);
    let (key, value) = line.split_once('=')?;
    Some((key.trim().to_string(), value.trim().to_string()))
}
