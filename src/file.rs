//! Locating and loading the config file.
//!
//! # Locating
//!
//! The config-file path has to be known before the full option set exists,
//! since the set depends on the file's keys. [`find_config_path`] pre-scans
//! the raw tokens for the reserved flag in any of its spellings:
//!
//! - `--configfile PATH` and `--configfile=PATH`
//! - `-c PATH` and `-cPATH`
//!
//! The last occurrence wins. Scanning stops at a bare `--`.
//!
//! # Loading
//!
//! The format is chosen by extension: `.json` is parsed with `serde_json`,
//! anything else as TOML. Either document is converted into a
//! [`ConfigTree`] through [`to_tree`], which validates the keys.
//! Neither format has tuples, so arrays always load as sequences.

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::DotfigError;
use crate::option::ConfigFileFlag;
use crate::tree::to_tree;
use crate::value::ConfigTree;

/// Find the config-file path among the raw tokens (program name excluded).
pub fn find_config_path(tokens: &[String], flag: &ConfigFileFlag) -> Option<PathBuf> {
    let long = format!("--{}", flag.long);
    let long_eq = format!("{long}=");
    let short = flag.short.map(|c| format!("-{c}"));

    let mut found = None;
    let mut iter = tokens.iter();
    while let Some(token) = iter.next() {
        if token == "--" {
            break;
        }
        if *token == long || short.as_deref() == Some(token.as_str()) {
            if let Some(path) = iter.next() {
                found = Some(PathBuf::from(path));
            }
        } else if let Some(path) = token.strip_prefix(&long_eq) {
            found = Some(PathBuf::from(path));
        } else if let Some(path) = short
            .as_deref()
            .and_then(|s| token.strip_prefix(s))
            .filter(|rest| !rest.is_empty())
        {
            found = Some(PathBuf::from(path));
        }
    }
    found
}

/// Read and parse a config file into a tree.
///
/// A missing file is [`DotfigError::ConfigFileNotFound`]; other I/O errors are
/// [`DotfigError::IoError`].
pub fn load_config_file(path: &Path) -> Result<ConfigTree, DotfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            DotfigError::ConfigFileNotFound {
                path: path.to_path_buf(),
            }
        } else {
            DotfigError::IoError {
                path: path.to_path_buf(),
                source: e,
            }
        }
    })?;
    let tree = parse_config(path, &content)?;
    debug!(path = %path.display(), keys = tree.len(), "loaded config file");
    Ok(tree)
}

/// Parse config content, using `path` only to pick the format and label errors.
pub fn parse_config(path: &Path, content: &str) -> Result<ConfigTree, DotfigError> {
    let is_json = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
    if is_json {
        let doc: serde_json::Value =
            serde_json::from_str(content).map_err(|e| DotfigError::JsonError {
                path: path.to_path_buf(),
                source: e,
            })?;
        to_tree(&doc)
    } else {
        let doc: toml::Table = toml::from_str(content).map_err(|e| DotfigError::ParseError {
            path: path.to_path_buf(),
            source: e,
        })?;
        to_tree(&doc)
    }
}
