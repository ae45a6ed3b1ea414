//! Error types for NetTrackr.
//!
//! Uses `thiserror` for ergonomic error definitions. Only [`ScanError`] can come
//! out of the scan engine; per-port failures are data in the report, not errors.

use crate::types::{PortError, ResolutionError};
use std::path::PathBuf;
use thiserror::Error;

/// Errors that abort a scan before any probe is sent.
#[derive(Error, Debug)]
pub enum ScanError {
    #[error(transparent)]
    Resolution(#[from] ResolutionError),

    #[error("invalid scan configuration: {0}")]
    InvalidConfig(String),
}

pub type ScanResult<T> = Result<T, ScanError>;

/// Settings file and application directory errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("could not determine a home directory for application paths")]
    DirectoryNotFound,

    #[error("failed to read {path}: {reason}")]
    ReadFailed { path: PathBuf, reason: String },

    #[error("failed to write {path}: {reason}")]
    WriteFailed { path: PathBuf, reason: String },

    #[error("invalid settings file: {0}")]
    InvalidFormat(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Scan history store errors.
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("scan not found: {0}")]
    ScanNotFound(String),

    #[error("ambiguous scan ID prefix '{prefix}': {matches} matches")]
    AmbiguousPrefix { prefix: String, matches: usize },

    #[error("storage directory error: {0}")]
    DirectoryError(String),

    #[error("failed to save scan: {0}")]
    SaveFailed(String),

    #[error("failed to load scan: {0}")]
    LoadFailed(String),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type StorageResult<T> = Result<T, StorageError>;

/// Everything a CLI command can fail with.
#[derive(Error, Debug)]
pub enum CliError {
    #[error(transparent)]
    Scan(#[from] ScanError),

    #[error(transparent)]
    Port(#[from] PortError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("output error: {0}")]
    Output(#[from] std::io::Error),
}

pub type CliResult<T> = Result<T, CliError>;
