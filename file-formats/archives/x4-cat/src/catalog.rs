//! Ordered selection of archives from the base game and its extensions
//!
//! A [`ResourceCatalog`] fixes which archives take part in a build and in
//! which order their files are visited: base game archives first, then the
//! accepted extension archives, each group sorted by index path so that the
//! order is the same on every run over the same installation.

use crate::cache::{GameCache, sort_resource_sets};
use crate::extract::{ExtractOptions, ExtractionSummary};
use crate::parallel;
use crate::resource_set::ResourceSet;
use crate::Result;
use std::path::PathBuf;
use std::sync::Arc;

/// Suffix of the files merged into the XML catalog
pub const XML_SUFFIX: &str = ".xml";

/// Which extensions take part in a catalog
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ExtensionFilter {
    /// Every installed extension
    #[default]
    All,
    /// Extensions whose name contains one of these substrings
    Containing(Vec<String>),
}

impl ExtensionFilter {
    /// Filter accepting extensions whose name contains any of `names`
    pub fn containing<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        ExtensionFilter::Containing(names.into_iter().map(Into::into).collect())
    }

    /// Filter rejecting every extension
    pub fn none() -> Self {
        ExtensionFilter::Containing(Vec::new())
    }

    /// Whether an archive with this extension label is included
    ///
    /// Base game archives (no label) are always included.
    pub fn accepts(&self, label: Option<&str>) -> bool {
        let Some(label) = label else {
            return true;
        };

        match self {
            ExtensionFilter::All => true,
            ExtensionFilter::Containing(names) => {
                names.iter().any(|name| label.contains(name.as_str()))
            }
        }
    }
}

/// Base game archives plus the selected extension archives, in merge order
///
/// # Examples
///
/// ```no_run
/// use x4_cat::{ExtensionFilter, GameCache, ResourceCatalog};
///
/// # fn main() -> Result<(), x4_cat::Error> {
/// let cache = GameCache::new("/games/X4 Foundations", "/tmp/x4cache")?;
/// let catalog = ResourceCatalog::from_cache(&cache, &ExtensionFilter::containing(["ego_dlc"]))?;
///
/// for xml in catalog.xml_files()? {
///     println!("{}", xml.display());
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct ResourceCatalog {
    resource_sets: Vec<Arc<ResourceSet>>,
}

impl ResourceCatalog {
    /// Combine base and extension archives
    ///
    /// Base archives are always kept; extension archives are kept when
    /// `filter` accepts their extension label.
    pub fn new<B, E>(base: B, extensions: E, filter: &ExtensionFilter) -> Self
    where
        B: IntoIterator<Item = Arc<ResourceSet>>,
        E: IntoIterator<Item = Arc<ResourceSet>>,
    {
        let mut base: Vec<_> = base.into_iter().collect();
        sort_resource_sets(&mut base);

        let mut selected: Vec<_> = extensions
            .into_iter()
            .filter(|set| filter.accepts(set.extension_label()))
            .collect();
        sort_resource_sets(&mut selected);

        log::debug!(
            "Catalog uses {} base and {} extension archives",
            base.len(),
            selected.len()
        );

        base.extend(selected);
        Self {
            resource_sets: base,
        }
    }

    /// Build a catalog from the archives of a scanned installation
    pub fn from_cache(cache: &GameCache, filter: &ExtensionFilter) -> Result<Self> {
        Ok(Self::new(
            cache.main_data()?.iter().cloned(),
            cache.extension_data()?.iter().cloned(),
            filter,
        ))
    }

    /// Archives in merge order
    pub fn resource_sets(&self) -> &[Arc<ResourceSet>] {
        &self.resource_sets
    }

    /// Number of archives
    pub fn len(&self) -> usize {
        self.resource_sets.len()
    }

    /// Whether the catalog holds no archive
    pub fn is_empty(&self) -> bool {
        self.resource_sets.is_empty()
    }

    /// Extract every archive, optionally on the rayon thread pool
    pub fn extract_all(&self, parallel: bool, options: &ExtractOptions) -> Result<ExtractionSummary> {
        let summaries = if parallel {
            parallel::extract_all(&self.resource_sets, options)?
        } else {
            self.resource_sets
                .iter()
                .map(|set| set.extract_with(options))
                .collect::<Result<Vec<_>>>()?
        };

        let mut total = ExtractionSummary::default();
        for summary in &summaries {
            total.accumulate(summary);
        }
        Ok(total)
    }

    /// Cached files ending in `suffix`, in archive order then index order
    pub fn files_with_suffix(&self, suffix: &str) -> Result<Vec<PathBuf>> {
        let mut files = Vec::new();
        for set in &self.resource_sets {
            files.extend(set.files_with_suffix(suffix)?);
        }
        Ok(files)
    }

    /// Cached XML files in merge order
    pub fn xml_files(&self) -> Result<Vec<PathBuf>> {
        self.files_with_suffix(XML_SUFFIX)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_all() {
        let filter = ExtensionFilter::All;
        assert!(filter.accepts(None));
        assert!(filter.accepts(Some("ego_dlc_split")));
    }

    #[test]
    fn test_filter_containing() {
        let filter = ExtensionFilter::containing(["ego_dlc"]);
        assert!(filter.accepts(None));
        assert!(filter.accepts(Some("ego_dlc_split")));
        assert!(filter.accepts(Some("ego_dlc_terran")));
        assert!(!filter.accepts(Some("my_mod")));
    }

    #[test]
    fn test_filter_none() {
        let filter = ExtensionFilter::none();
        assert!(filter.accepts(None));
        assert!(!filter.accepts(Some("ego_dlc_split")));
    }
}
