//! One archive: a catalog index, its blob and a private cache directory
//!
//! A [`ResourceSet`] parses its index on first use and extracts its blob into
//! the cache the first time a cached file is requested. Both steps happen at
//! most once per instance and are safe to trigger from several threads.

use crate::extract::{self, ExtractOptions, ExtractionSummary};
use crate::index::{CatalogEntry, load_index};
use crate::path::cache_path;
use crate::{BLOB_EXTENSION, EXTENSIONS_DIR, Error, INDEX_EXTENSION, Result};
use once_cell::sync::OnceCell;
use parking_lot::Mutex;
use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};

/// A `.cat`/`.dat` pair together with the cache directory it extracts into
///
/// # Examples
///
/// ```no_run
/// use x4_cat::ResourceSet;
///
/// # fn main() -> Result<(), x4_cat::Error> {
/// let set = ResourceSet::open("/games/X4 Foundations", "01", "/tmp/x4cache")?;
/// for entry in set.entries()? {
///     println!("{} ({} bytes)", entry.path, entry.size);
/// }
///
/// // First access extracts the whole archive
/// for file in set.files()? {
///     println!("{}", file.display());
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct ResourceSet {
    name: String,
    archive_dir: PathBuf,
    index_file: PathBuf,
    blob_file: PathBuf,
    cache_dir: PathBuf,
    install_dir_name: Option<String>,
    entries: OnceCell<Vec<CatalogEntry>>,
    extracted: Mutex<bool>,
}

impl ResourceSet {
    /// Open the archive `name` located in `archive_dir`
    ///
    /// `archive_dir` must contain both `name.cat` and `name.dat`. If the final
    /// component of `cache_dir` is not `name`, a `name` subdirectory is used.
    /// The cache directory is created when missing.
    pub fn open<P, Q>(archive_dir: P, name: &str, cache_dir: Q) -> Result<Self>
    where
        P: AsRef<Path>,
        Q: AsRef<Path>,
    {
        let archive_dir = archive_dir.as_ref();
        let index_file = archive_dir.join(format!("{name}.{INDEX_EXTENSION}"));
        let blob_file = archive_dir.join(format!("{name}.{BLOB_EXTENSION}"));

        let mut cache_dir = cache_dir.as_ref().to_path_buf();
        if cache_dir.file_name() != Some(OsStr::new(name)) {
            cache_dir.push(name);
        }

        if !index_file.is_file() {
            return Err(Error::configuration(format!(
                "missing file {}",
                index_file.display()
            )));
        }
        if !blob_file.is_file() {
            return Err(Error::configuration(format!(
                "missing file {}",
                blob_file.display()
            )));
        }
        fs::create_dir_all(&cache_dir).map_err(|e| {
            Error::configuration(format!("can't create dir {}: {e}", cache_dir.display()))
        })?;

        Ok(Self {
            name: name.to_string(),
            archive_dir: archive_dir.to_path_buf(),
            index_file,
            blob_file,
            cache_dir,
            install_dir_name: None,
            entries: OnceCell::new(),
            extracted: Mutex::new(false),
        })
    }

    /// Record the main installation directory used to derive the extension label
    pub fn in_installation<P: AsRef<Path>>(mut self, install_dir: P) -> Self {
        self.install_dir_name = install_dir
            .as_ref()
            .file_name()
            .map(|n| n.to_string_lossy().into_owned());
        self
    }

    /// Archive base name, e.g. `01` or `ext_01`
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Directory holding the `.cat`/`.dat` pair
    pub fn archive_dir(&self) -> &Path {
        &self.archive_dir
    }

    /// Path to the catalog index
    pub fn index_file(&self) -> &Path {
        &self.index_file
    }

    /// Path to the blob
    pub fn blob_file(&self) -> &Path {
        &self.blob_file
    }

    /// Cache directory owned by this archive
    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    /// Stable ordering key: the absolute path of the index file
    pub fn sort_key(&self) -> PathBuf {
        std::path::absolute(&self.index_file).unwrap_or_else(|_| self.index_file.clone())
    }

    /// Name of the extension this archive belongs to, if any
    ///
    /// When the main installation directory is known, any archive whose
    /// directory name differs from it belongs to the extension of that name.
    /// Otherwise archives found directly below an `extensions` directory are
    /// considered extension archives.
    pub fn extension_label(&self) -> Option<&str> {
        let dir_name = self.archive_dir.file_name()?.to_str()?;
        match &self.install_dir_name {
            Some(install) => (install != dir_name).then_some(dir_name),
            None => {
                let parent = self.archive_dir.parent()?.file_name()?;
                (parent == EXTENSIONS_DIR).then_some(dir_name)
            }
        }
    }

    /// Entries of the index, parsed on first call
    pub fn entries(&self) -> Result<&[CatalogEntry]> {
        self.entries
            .get_or_try_init(|| load_index(&self.index_file))
            .map(Vec::as_slice)
    }

    /// Whether extraction already completed for this instance
    pub fn is_extracted(&self) -> bool {
        *self.extracted.lock()
    }

    /// Extract the archive into its cache directory with default options
    pub fn extract(&self) -> Result<ExtractionSummary> {
        self.extract_with(&ExtractOptions::default())
    }

    /// Extract the archive into its cache directory
    ///
    /// Runs at most once per instance. Concurrent callers wait for the first
    /// one to finish; later calls return an empty summary immediately. A
    /// failed run leaves the archive unextracted so a later call retries.
    pub fn extract_with(&self, options: &ExtractOptions) -> Result<ExtractionSummary> {
        let mut extracted = self.extracted.lock();
        if *extracted {
            return Ok(ExtractionSummary::default());
        }

        let entries = self.entries()?;
        log::info!(
            "Extracting {} ({} entries) into {}",
            self.blob_file.display(),
            entries.len(),
            self.cache_dir.display()
        );

        let summary = extract::extract(entries, &self.blob_file, &self.cache_dir, options)?;
        *extracted = true;

        log::info!(
            "{}: {} written, {} up to date, {} removed",
            self.name,
            summary.written,
            summary.skipped,
            summary.removed
        );
        Ok(summary)
    }

    /// Cache location of one entry, extracting the archive first
    pub fn entry_file(&self, entry: &CatalogEntry) -> Result<PathBuf> {
        self.extract()?;
        Ok(cache_path(&self.cache_dir, &entry.path))
    }

    /// Cache locations of every entry, in index order, extracting first
    ///
    /// Each call returns a fresh iterator.
    pub fn files(&self) -> Result<impl Iterator<Item = PathBuf> + '_> {
        self.extract()?;
        let entries = self.entries()?;
        Ok(entries
            .iter()
            .map(move |entry| cache_path(&self.cache_dir, &entry.path)))
    }

    /// Cache locations of the entries whose path ends with `suffix`
    pub fn files_with_suffix<'a>(
        &'a self,
        suffix: &'a str,
    ) -> Result<impl Iterator<Item = PathBuf> + 'a> {
        self.extract()?;
        let entries = self.entries()?;
        Ok(entries
            .iter()
            .filter(move |entry| entry.path.ends_with(suffix))
            .map(move |entry| cache_path(&self.cache_dir, &entry.path)))
    }
}
