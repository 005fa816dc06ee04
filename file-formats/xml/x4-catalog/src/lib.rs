//! # x4_catalog - merged X4 XML catalogs
//!
//! X4 spreads its game data over many XML files. The base game ships plain
//! fragments (`<wares>`, `<jobs>`, ...) and extensions ship either more
//! fragments or `<diff>` patches that edit what is already there. This crate
//! folds an ordered list of such files into one [`WorkingDocument`].
//!
//! ## Examples
//!
//! ```no_run
//! use x4_catalog::CatalogMerger;
//!
//! # fn main() -> Result<(), x4_catalog::Error> {
//! let mut merger = CatalogMerger::new();
//! merger.merge_files(["cache/01/libraries/wares.xml", "cache/extensions/ego_dlc_boron/ext_01/libraries/wares.xml"])?;
//!
//! let document = merger.into_document();
//! for tag in document.section_names() {
//!     println!("{tag}: {:?} entries", document.section_child_count(&tag));
//! }
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

pub mod diff;
pub mod document;
pub mod error;
pub mod merger;
pub mod selector;

// Re-export commonly used types
pub use diff::{DIFF_TAG, DiffOperation, Position};
pub use document::{ROOT_TAG, WorkingDocument};
pub use error::{Error, Result};
pub use merger::{CatalogMerger, MergeStats, merge_catalog};
