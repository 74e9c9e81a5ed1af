use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DotfigError {
    #[error("Malformed config key '{key}': {reason}")]
    MalformedConfigKey { key: String, reason: String },

    #[error("Invalid value '{token}' for '--{key}': expected {expected} ({reason})")]
    TypeCoercion {
        key: String,
        token: String,
        expected: String,
        reason: String,
    },

    #[error("Unknown option '{0}'")]
    UnknownOption(String),

    #[error("No config file given (pass one with --{flag})")]
    MissingConfigFile { flag: String },

    #[error("Config file not found: {path}")]
    ConfigFileNotFound { path: PathBuf },

    #[error("Failed to parse {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("Failed to parse {path}: {source}")]
    JsonError {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("Failed to read {path}: {source}")]
    IoError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid value for '{key}': {reason}")]
    InvalidValue { key: String, reason: String },

    #[cfg(feature = "clap")]
    #[error(transparent)]
    Cli(#[from] clap::Error),
}
