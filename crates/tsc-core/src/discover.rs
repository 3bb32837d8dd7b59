//! Locating run inputs on disk by file-name suffix.
//!
//! A run directory holds exactly one network/config file of each kind and
//! any number of demand scenarios.  Only names are inspected here; file
//! contents are the collaborator's business.

use std::path::{Path, PathBuf};

use crate::{ConfigError, ConfigResult};

/// All regular files in `dir` whose name ends with `suffix`, sorted by name.
pub fn files_with_suffix(dir: &Path, suffix: &str) -> ConfigResult<Vec<PathBuf>> {
    let mut found = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        let name = entry.file_name();
        if name.to_string_lossy().ends_with(suffix) {
            found.push(entry.path());
        }
    }
    found.sort();
    Ok(found)
}

/// The single file in `dir` ending with `suffix`.
///
/// # Errors
///
/// [`ConfigError::MissingInput`] if there is none, and
/// [`ConfigError::AmbiguousInput`] if there are several.
pub fn unique_file(dir: &Path, suffix: &str) -> ConfigResult<PathBuf> {
    let mut found = files_with_suffix(dir, suffix)?;
    match found.len() {
        0 => Err(ConfigError::MissingInput {
            dir:    dir.to_path_buf(),
            suffix: suffix.to_owned(),
        }),
        1 => Ok(found.remove(0)),
        count => Err(ConfigError::AmbiguousInput {
            dir: dir.to_path_buf(),
            suffix: suffix.to_owned(),
            count,
        }),
    }
}
