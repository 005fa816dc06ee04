//! Catalog index (`.cat`) parsing
//!
//! A catalog index is a UTF-8 text file with one entry per line:
//!
//! ```text
//! <path, possibly with spaces> <size> <modified epoch> <hash>
//! ```
//!
//! Only the three trailing fields are fixed, so lines are split from the
//! right. Entry order is significant: the paired blob stores payloads back to
//! back in exactly this order, with no offsets of its own.

use crate::path::validate_entry_path;
use crate::{Error, Result};
use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;

/// Field separator used by catalog indexes
const SEPARATOR: char = ' ';

/// One record of a catalog index
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CatalogEntry {
    /// Path relative to the archive root, `/` separated
    pub path: String,
    /// Payload size in bytes
    pub size: u64,
    /// Last modification time, seconds since the Unix epoch
    pub modified_epoch: i64,
    /// Content hash as written in the index (MD5 hex)
    pub hash: String,
}

impl CatalogEntry {
    /// Whether the entry carries no payload
    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// File name component of the entry path
    pub fn file_name(&self) -> &str {
        self.path
            .rsplit(crate::path::INDEX_SEPARATOR)
            .next()
            .unwrap_or(&self.path)
    }
}

impl FromStr for CatalogEntry {
    type Err = Error;

    fn from_str(line: &str) -> Result<Self> {
        let mut fields = line.rsplitn(4, SEPARATOR);
        let hash = fields.next();
        let epoch = fields.next();
        let size = fields.next();
        let path = fields.next();

        let (Some(path), Some(size), Some(epoch), Some(hash)) = (path, size, epoch, hash) else {
            return Err(Error::parse(
                0,
                format!("expected `<path> <size> <epoch> <hash>`, got {line:?}"),
            ));
        };

        let size = size
            .parse::<u64>()
            .map_err(|e| Error::parse(0, format!("invalid size {size:?}: {e}")))?;
        let modified_epoch = epoch
            .parse::<i64>()
            .map_err(|e| Error::parse(0, format!("invalid epoch {epoch:?}: {e}")))?;

        validate_entry_path(path)?;

        Ok(CatalogEntry {
            path: path.to_string(),
            size,
            modified_epoch,
            hash: hash.to_string(),
        })
    }
}

impl fmt::Display for CatalogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{SEPARATOR}{}{SEPARATOR}{}{SEPARATOR}{}",
            self.path, self.size, self.modified_epoch, self.hash
        )
    }
}

/// Parse the text of a catalog index into its entries, in file order
///
/// Blank lines are ignored and a trailing `\r` is stripped from each line.
/// An empty index is valid and yields no entries.
pub fn parse_index(content: &str) -> Result<Vec<CatalogEntry>> {
    let mut entries = Vec::new();

    for (number, line) in content.lines().enumerate() {
        let line = line.strip_suffix('\r').unwrap_or(line);
        if line.trim().is_empty() {
            continue;
        }

        let entry = line.parse::<CatalogEntry>().map_err(|e| match e {
            Error::Parse { message, .. } => Error::parse(number + 1, message),
            Error::InvalidPath { path, reason } => {
                Error::parse(number + 1, format!("invalid path {path:?}: {reason}"))
            }
            other => other,
        })?;
        entries.push(entry);
    }

    log::debug!("Parsed {} catalog entries", entries.len());
    Ok(entries)
}

/// Load and parse a catalog index file
pub fn load_index<P: AsRef<Path>>(path: P) -> Result<Vec<CatalogEntry>> {
    let path = path.as_ref();
    let wrap = |source: Error| Error::Index {
        path: path.to_path_buf(),
        source: Box::new(source),
    };

    let bytes = fs::read(path).map_err(|e| wrap(e.into()))?;
    let content = String::from_utf8(bytes)
        .map_err(|e| wrap(Error::parse(0, format!("index is not valid UTF-8: {e}"))))?;

    parse_index(&content).map_err(wrap)
}

/// Total payload size described by a list of entries, saturating at `u64::MAX`
pub fn total_size(entries: &[CatalogEntry]) -> u64 {
    checked_total_size(entries).unwrap_or(u64::MAX)
}

/// Total payload size, `None` if it does not fit in a `u64`
pub fn checked_total_size(entries: &[CatalogEntry]) -> Option<u64> {
    entries
        .iter()
        .try_fold(0u64, |total, entry| total.checked_add(entry.size))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_parse_line_with_spaces_in_path() {
        let entry: CatalogEntry = "a b c.d 12 0000 xyz".parse().unwrap();
        assert_eq!(entry.path, "a b c.d");
        assert_eq!(entry.size, 12);
        assert_eq!(entry.modified_epoch, 0);
        assert_eq!(entry.hash, "xyz");
    }

    #[test]
    fn test_parse_typical_line() {
        let entry: CatalogEntry =
            "libraries/wares.xml 1834 1700000000 0123456789abcdef0123456789abcdef"
                .parse()
                .unwrap();
        assert_eq!(entry.path, "libraries/wares.xml");
        assert_eq!(entry.file_name(), "wares.xml");
        assert_eq!(entry.size, 1834);
        assert_eq!(entry.modified_epoch, 1_700_000_000);
        assert!(!entry.is_empty());
    }

    #[test]
    fn test_parse_too_few_fields() {
        let err = "wares.xml 12 xyz".parse::<CatalogEntry>().unwrap_err();
        assert!(matches!(err, Error::Parse { .. }));
    }

    #[test]
    fn test_parse_invalid_numbers() {
        assert!("a.xml twelve 0 xyz".parse::<CatalogEntry>().is_err());
        assert!("a.xml 12 yesterday xyz".parse::<CatalogEntry>().is_err());
        assert!("a.xml -1 0 xyz".parse::<CatalogEntry>().is_err());
    }

    #[test]
    fn test_parse_negative_epoch() {
        let entry: CatalogEntry = "a.xml 1 -5 xyz".parse().unwrap();
        assert_eq!(entry.modified_epoch, -5);
    }

    #[test]
    fn test_parse_index_reports_line_number() {
        let content = "a.xml 1 0 h1\nb.xml 2 0 h2\nbroken line\n";
        match parse_index(content) {
            Err(Error::Parse { line, .. }) => assert_eq!(line, 3),
            other => panic!("expected parse error, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_index_preserves_order() {
        let content = "z.xml 1 0 h1\r\na.xml 2 0 h2\r\n\r\nm/n.xml 0 0 h3\r\n";
        let entries = parse_index(content).unwrap();
        let paths: Vec<_> = entries.iter().map(|e| e.path.as_str()).collect();
        assert_eq!(paths, ["z.xml", "a.xml", "m/n.xml"]);
        assert_eq!(total_size(&entries), 3);
    }

    #[test]
    fn test_total_size_overflow() {
        let entries = parse_index("a.bin 18446744073709551615 0 h\nb.bin 2 0 h\n").unwrap();
        assert_eq!(checked_total_size(&entries), None);
        assert_eq!(total_size(&entries), u64::MAX);
        assert_eq!(checked_total_size(&entries[..1]), Some(u64::MAX));
        assert_eq!(checked_total_size(&[]), Some(0));
    }

    #[test]
    fn test_parse_empty_index() {
        assert!(parse_index("").unwrap().is_empty());
    }

    #[test]
    fn test_parse_index_rejects_traversal() {
        let err = parse_index("../evil.xml 1 0 h\n").unwrap_err();
        assert!(matches!(err, Error::Parse { line: 1, .. }));
    }

    proptest! {
        #[test]
        fn prop_display_round_trips(
            path in "[a-z0-9_]{1,8}( [a-z0-9_]{1,8}){0,3}(/[a-z0-9_]{1,8}){0,3}(\\.xml)?",
            size in any::<u64>(),
            epoch in any::<i64>(),
            hash in "[0-9a-f]{32}",
        ) {
            let entry = CatalogEntry { path, size, modified_epoch: epoch, hash };
            let parsed: CatalogEntry = entry.to_string().parse().unwrap();
            prop_assert!(!parsed.path.ends_with(&parsed.hash));
            prop_assert_eq!(parsed, entry);
        }
    }
}
