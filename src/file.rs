//! Config-file discovery and reading.
//!
//! Two modes, mirroring the two ways `acquire` can be pointed at a file:
//!
//! - **Explicit**: read exactly the named file. Every failure, including a
//!   missing file, is fatal.
//! - **Probe**: check each search location for `{location}/{file_name}` in
//!   declared order and use the first one found. A missing file at a
//!   location is silently skipped; any other read failure aborts the probe
//!   immediately.

use std::path::{Path, PathBuf};

use crate::error::ParamError;

/// The default search locations: current directory, the user's home
/// directory, then `/etc`.
pub(crate) fn default_locations() -> Vec<PathBuf> {
    let mut dirs = vec![PathBuf::new()];
    if let Some(user) = directories::UserDirs::new() {
        dirs.push(user.home_dir().to_path_buf());
    }
    dirs.push(PathBuf::from("/etc"));
    dirs
}

/// Read exactly `path`, failing loudly when it cannot be read.
pub(crate) fn read_explicit(path: &Path) -> Result<String, ParamError> {
    std::fs::read_to_string(path).map_err(|source| ParamError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Probe the search locations for `file_name`; first one found wins.
pub(crate) fn probe(
    locations: &[PathBuf],
    file_name: &str,
) -> Result<Option<(PathBuf, String)>, ParamError> {
    for dir in locations {
        let path = dir.join(file_name);
        match std::fs::read_to_string(&path) {
            Ok(content) => return Ok(Some((path, content))),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => continue,
            Err(source) => return Err(ParamError::Io { path, source }),
        }
    }
    Ok(None)
}
