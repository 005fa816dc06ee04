//! # x4_cat - X4 catalog archive library
//!
//! Reads the packed resources of X4 installations. Each archive is a pair of
//! files: a text catalog index (`.cat`) describing every packed file and a
//! blob (`.dat`) holding their payloads back to back. This crate parses the
//! indexes and extracts the blobs into an on-disk cache, skipping files that
//! are already cached and newer than the index says.
//!
//! ## Layout
//!
//! - [`index`]: catalog index parsing ([`CatalogEntry`])
//! - [`extract`]: sequential blob extraction with staleness checks
//! - [`ResourceSet`]: one archive with lazy parsing and one-shot extraction
//! - [`GameCache`]: scans an installation for base game and extension archives
//! - [`ResourceCatalog`]: ordered, filtered selection of archives
//! - [`parallel`]: extracting several archives on a thread pool
//!
//! ## Examples
//!
//! ```no_run
//! use x4_cat::{ExtensionFilter, GameCache, ResourceCatalog};
//!
//! # fn main() -> Result<(), x4_cat::Error> {
//! let cache = GameCache::new("/games/X4 Foundations", "/home/me/.cache/x4data")?;
//! println!("extensions: {:?}", cache.extensions()?);
//!
//! let catalog = ResourceCatalog::from_cache(&cache, &ExtensionFilter::All)?;
//! let xml_files = catalog.xml_files()?;
//! println!("{} xml files", xml_files.len());
//! # Ok(())
//! # }
//! ```

#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(
    missing_docs,
    missing_debug_implementations,
    rust_2018_idioms,
    unreachable_pub
)]

pub mod cache;
pub mod catalog;
pub mod error;
pub mod extract;
pub mod index;
pub mod parallel;
pub mod path;
pub mod resource_set;

// Re-export commonly used types
pub use cache::GameCache;
pub use catalog::{ExtensionFilter, ResourceCatalog, XML_SUFFIX};
pub use error::{Error, Result};
pub use extract::{ExtractOptions, ExtractionSummary, ZeroSizePolicy};
pub use index::{CatalogEntry, load_index, parse_index};
pub use resource_set::ResourceSet;

/// File extension of catalog indexes
pub const INDEX_EXTENSION: &str = "cat";

/// File extension of blobs
pub const BLOB_EXTENSION: &str = "dat";

/// Directory holding one subdirectory per installed extension
pub const EXTENSIONS_DIR: &str = "extensions";
