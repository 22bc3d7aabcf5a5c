//! Error types for the local settings store.

use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Errors returned by [`SettingsStore`](crate::SettingsStore).
///
/// None of these are fatal to the process: a [`ConfigParse`](Self::ConfigParse)
/// is usually recovered by re-running setup, and [`Io`](Self::Io) is shown to
/// the operator verbatim.
#[derive(Debug, Error)]
pub enum SettingsError {
    /// The settings file exists but is not a valid YAML mapping.
    #[error("Failed to parse settings file '{}': {source}. Fix or remove the file and run setup again.", .path.display())]
    ConfigParse {
        /// The offending file.
        path: PathBuf,
        /// The underlying parse error.
        #[source]
        source: serde_yaml::Error,
    },

    /// Reading or writing a settings file failed.
    #[error("I/O error on '{}': {source}", .path.display())]
    Io {
        /// The file or directory being accessed.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// Settings could not be encoded as YAML.
    #[error("Failed to serialize settings: {0}")]
    Serialize(#[source] serde_yaml::Error),

    /// No home directory is available to hold the settings directory.
    #[error("Could not determine the home directory. Set HOME to choose where settings are stored.")]
    HomeDirNotFound,
}

impl SettingsError {
    /// Returns the file path the error refers to, if any.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::ConfigParse { path, .. } | Self::Io { path, .. } => Some(path),
            Self::Serialize(_) | Self::HomeDirNotFound => None,
        }
    }
}
