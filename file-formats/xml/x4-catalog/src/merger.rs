//! Ordered merging of fragments into one working document

use crate::diff::{DIFF_TAG, DiffOperation};
use crate::document::{WorkingDocument, element_children};
use crate::error::{Error, Result};
use std::fs;
use std::path::Path;
use sxd_document::dom::ChildOfRoot;
use sxd_document::parser;

const BOM: char = '\u{feff}';

/// Counters describing what a merger has processed so far
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeStats {
    /// Plain fragments merged into sections
    pub fragments: usize,
    /// Diff fragments applied
    pub diffs: usize,
    /// Individual diff directives applied
    pub operations: usize,
    /// Empty files skipped
    pub skipped: usize,
}

impl MergeStats {
    /// Number of files handed to the merger
    pub fn files(&self) -> usize {
        self.fragments + self.diffs + self.skipped
    }
}

/// Folds fragments, strictly in the given order, into one working document
///
/// # Examples
///
/// ```
/// use x4_catalog::CatalogMerger;
///
/// # fn main() -> Result<(), x4_catalog::Error> {
/// let mut merger = CatalogMerger::new();
/// merger.merge_str("wares.xml", "<wares><ware id=\"x\" price=\"10\"/></wares>")?;
/// merger.merge_str(
///     "patch.xml",
///     "<diff><replace sel=\"/wares/ware[@id='x']/@price\">20</replace></diff>",
/// )?;
///
/// let document = merger.into_document();
/// assert_eq!(document.select("/wares/ware/@price")?, vec!["20"]);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Default)]
pub struct CatalogMerger {
    document: WorkingDocument,
    stats: MergeStats,
}

impl CatalogMerger {
    /// Create a merger over an empty working document
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge one file from disk
    pub fn merge_file<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        let path = path.as_ref();
        let bytes = fs::read(path).map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let name = path.display().to_string();
        if bytes.is_empty() {
            log::debug!("Skipping empty fragment {name}");
            self.stats.skipped += 1;
            return Ok(());
        }

        let text = String::from_utf8(bytes)
            .map_err(|e| Error::xml(name.as_str(), format!("not valid UTF-8: {e}")))?;
        self.merge_str(&name, &text)
    }

    /// Merge one fragment given as text
    ///
    /// `name` is used in log output and errors. Text that is empty after a
    /// leading byte-order mark and whitespace is skipped.
    pub fn merge_str(&mut self, name: &str, text: &str) -> Result<()> {
        let text = text.strip_prefix(BOM).unwrap_or(text);
        if text.trim().is_empty() {
            log::debug!("Skipping empty fragment {name}");
            self.stats.skipped += 1;
            return Ok(());
        }

        let package = parser::parse(text).map_err(|e| Error::xml(name, format!("{e:?}")))?;
        let fragment = package.as_document();
        let root = fragment
            .root()
            .children()
            .into_iter()
            .find_map(|child| match child {
                ChildOfRoot::Element(element) => Some(element),
                _ => None,
            })
            .ok_or_else(|| Error::xml(name, "no root element"))?;

        if root.name().local_part() == DIFF_TAG {
            let operations = element_children(root)
                .map(|directive| DiffOperation::parse(directive, name))
                .collect::<Result<Vec<_>>>()?;

            // A diff applies completely or not at all
            let mut staged = self.document.clone();
            for operation in &operations {
                operation.apply(&mut staged, name)?;
            }
            self.document = staged;

            log::info!("Applied {} diff operations from {name}", operations.len());
            self.stats.diffs += 1;
            self.stats.operations += operations.len();
        } else {
            log::info!("Merging <{}> from {name}", root.name().local_part());
            self.document.merge_fragment(root);
            self.stats.fragments += 1;
        }
        Ok(())
    }

    /// Merge files in iteration order, stopping at the first failure
    pub fn merge_files<I, P>(&mut self, files: I) -> Result<()>
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        for file in files {
            self.merge_file(file)?;
        }
        Ok(())
    }

    /// The document merged so far
    pub fn document(&self) -> &WorkingDocument {
        &self.document
    }

    /// Counters for the files merged so far
    pub fn stats(&self) -> MergeStats {
        self.stats
    }

    /// Finish merging and take the document
    pub fn into_document(self) -> WorkingDocument {
        self.document
    }
}

/// Merge a list of files into a fresh working document
pub fn merge_catalog<I, P>(files: I) -> Result<WorkingDocument>
where
    I: IntoIterator<Item = P>,
    P: AsRef<Path>,
{
    let mut merger = CatalogMerger::new();
    merger.merge_files(files)?;
    Ok(merger.into_document())
}
