//! Path utilities for catalog entries
//!
//! Catalog indexes always use forward slashes (`/`) as path separators,
//! regardless of the host operating system. Entry paths are joined onto a
//! cache directory, so they are validated before use: a path that could
//! escape the cache directory is rejected at parse time.
//!
//! # Examples
//!
//! ```
//! use x4_cat::path::{entry_path_to_system, validate_entry_path};
//!
//! assert!(validate_entry_path("libraries/wares.xml").is_ok());
//! assert!(validate_entry_path("../outside.xml").is_err());
//!
//! #[cfg(unix)]
//! assert_eq!(entry_path_to_system("md/setup.xml"), "md/setup.xml");
//! ```

use crate::{Error, Result};
use std::path::{Component, Path, PathBuf};

/// Separator used inside catalog indexes
pub const INDEX_SEPARATOR: char = '/';

/// Validate an entry path read from a catalog index
///
/// The path must be non-empty, relative, free of NUL bytes and must not
/// contain parent directory references.
pub fn validate_entry_path(path: &str) -> Result<()> {
    let reject = |reason| {
        Err(Error::InvalidPath {
            path: path.to_string(),
            reason,
        })
    };

    if path.is_empty() {
        return reject("empty path");
    }

    if path.contains('\0') {
        return reject("contains null bytes");
    }

    if path.starts_with(INDEX_SEPARATOR) || path.starts_with('\\') {
        return reject("absolute paths are not allowed");
    }

    for component in Path::new(&entry_path_to_system(path)).components() {
        match component {
            Component::ParentDir => return reject("contains parent directory reference"),
            Component::RootDir | Component::Prefix(_) => {
                return reject("absolute paths are not allowed");
            }
            _ => {}
        }
    }

    Ok(())
}

/// Convert an index path to a system path
///
/// On Unix-like systems this is a no-op. On Windows the forward slashes
/// become backslashes.
pub fn entry_path_to_system(path: &str) -> String {
    #[cfg(windows)]
    {
        path.replace(INDEX_SEPARATOR, "\\")
    }

    #[cfg(not(windows))]
    {
        path.to_string()
    }
}

/// Location of an entry below a cache directory
pub fn cache_path(cache_dir: &Path, entry_path: &str) -> PathBuf {
    cache_dir.join(entry_path_to_system(entry_path))
}
