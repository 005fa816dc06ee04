//! Sequential extraction of a blob (`.dat`) into a cache directory
//!
//! Blob files have no framing: each entry's payload follows the previous one,
//! so offsets are implied by the cumulative sizes of the preceding entries.
//! Extraction therefore walks the index in order with a single cursor and
//! must advance it by `size` bytes for every entry, including the ones it
//! decides not to write.

use crate::index::{CatalogEntry, checked_total_size};
use crate::path::cache_path;
use crate::{Error, Result};
use md5::{Digest, Md5};
use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::Path;
use std::time::UNIX_EPOCH;

/// What to do with entries whose size is zero
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ZeroSizePolicy {
    /// Materialize an empty file at the destination
    #[default]
    WriteEmpty,
    /// Delete a stale destination file and write nothing
    RemoveExisting,
}

/// Options controlling an extraction run
///
/// # Examples
///
/// ```
/// use x4_cat::{ExtractOptions, ZeroSizePolicy};
///
/// let options = ExtractOptions::new()
///     .zero_size_policy(ZeroSizePolicy::RemoveExisting)
///     .verify_hashes(true);
/// assert!(options.verify_hashes);
/// ```
#[derive(Debug, Clone, Default)]
pub struct ExtractOptions {
    /// Handling of zero-size entries
    pub zero_size: ZeroSizePolicy,
    /// Compare the MD5 of every written payload with the index hash
    pub verify_hashes: bool,
}

impl ExtractOptions {
    /// Default options: empty files for zero-size entries, no verification
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the zero-size entry policy
    pub fn zero_size_policy(mut self, policy: ZeroSizePolicy) -> Self {
        self.zero_size = policy;
        self
    }

    /// Enable or disable hash verification
    pub fn verify_hashes(mut self, verify: bool) -> Self {
        self.verify_hashes = verify;
        self
    }
}

/// Outcome of one extraction run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExtractionSummary {
    /// Entries written to the cache
    pub written: usize,
    /// Entries skipped because the cached copy is newer than the index
    pub skipped: usize,
    /// Stale zero-size destinations removed
    pub removed: usize,
    /// Payload bytes written
    pub bytes_written: u64,
}

impl ExtractionSummary {
    /// Number of entries visited
    pub fn total(&self) -> usize {
        self.written + self.skipped + self.removed
    }

    /// True when the run left the cache untouched
    pub fn is_noop(&self) -> bool {
        self.written == 0 && self.removed == 0
    }

    /// Add another run's counters to this one
    pub fn accumulate(&mut self, other: &ExtractionSummary) {
        self.written += other.written;
        self.skipped += other.skipped;
        self.removed += other.removed;
        self.bytes_written += other.bytes_written;
    }
}

/// Extract every entry of `blob_file` into `cache_dir`
///
/// Entries whose destination exists with a modification time strictly newer
/// than the entry's epoch are skipped. Any failure aborts the run; files
/// written before the failure are left in place.
pub fn extract<P, Q>(
    entries: &[CatalogEntry],
    blob_file: P,
    cache_dir: Q,
    options: &ExtractOptions,
) -> Result<ExtractionSummary>
where
    P: AsRef<Path>,
    Q: AsRef<Path>,
{
    let blob_path = blob_file.as_ref();
    let cache_dir = cache_dir.as_ref();

    let file = File::open(blob_path)?;
    let blob_len = file.metadata()?.len();
    // Sizes adding up past u64::MAX cannot be backed by any blob
    let required = match checked_total_size(entries) {
        Some(required) if required <= blob_len => required,
        required => {
            return Err(Error::BlobTooShort {
                blob: blob_path.to_path_buf(),
                expected: required.unwrap_or(u64::MAX),
                actual: blob_len,
            });
        }
    };
    if blob_len > required {
        log::warn!(
            "{} has {} trailing bytes not covered by its index",
            blob_path.display(),
            blob_len - required
        );
    }

    let mut reader = BufReader::new(file);
    let mut summary = ExtractionSummary::default();

    for entry in entries {
        let destination = cache_path(cache_dir, &entry.path);

        if is_fresh(&destination, entry.modified_epoch) {
            skip_entry(&mut reader, entry)?;
            summary.skipped += 1;
            continue;
        }

        if entry.is_empty() {
            match options.zero_size {
                ZeroSizePolicy::WriteEmpty => {
                    create_parent(&destination, entry)?;
                    File::create(&destination).map_err(|e| Error::extraction(&entry.path, e))?;
                    summary.written += 1;
                }
                ZeroSizePolicy::RemoveExisting => {
                    if destination.is_file() {
                        log::debug!("removing empty entry {}", destination.display());
                        fs::remove_file(&destination)
                            .map_err(|e| Error::extraction(&entry.path, e))?;
                        summary.removed += 1;
                    }
                }
            }
            continue;
        }

        log::debug!(
            "extracting {}/{} into {}",
            blob_path.file_name().unwrap_or_default().to_string_lossy(),
            entry.path,
            destination.display()
        );
        write_entry(&mut reader, entry, &destination, options.verify_hashes)?;
        summary.written += 1;
        summary.bytes_written += entry.size;
    }

    Ok(summary)
}

/// Whether a cached file is newer than the entry's modification epoch
///
/// Both times are compared in whole seconds, so a file modified within the
/// same second as the epoch is stale.
pub fn is_fresh(destination: &Path, modified_epoch: i64) -> bool {
    let Ok(modified) = fs::metadata(destination).and_then(|m| m.modified()) else {
        return false;
    };

    match modified.duration_since(UNIX_EPOCH) {
        Ok(since_epoch) => modified_epoch < 0 || since_epoch.as_secs() > modified_epoch as u64,
        Err(_) => false,
    }
}

fn create_parent(destination: &Path, entry: &CatalogEntry) -> Result<()> {
    if let Some(parent) = destination.parent() {
        fs::create_dir_all(parent).map_err(|e| Error::extraction(&entry.path, e))?;
    }
    Ok(())
}

fn skip_entry(reader: &mut BufReader<File>, entry: &CatalogEntry) -> Result<()> {
    // The blob length was checked against the index, so the offset fits.
    reader
        .seek_relative(entry.size as i64)
        .map_err(|e| Error::extraction(&entry.path, e))
}

fn write_entry(
    reader: &mut BufReader<File>,
    entry: &CatalogEntry,
    destination: &Path,
    verify: bool,
) -> Result<()> {
    let io_error = |e| Error::extraction(&entry.path, e);

    create_parent(destination, entry)?;
    let file = File::create(destination).map_err(io_error)?;
    let mut writer = HashingWriter::new(BufWriter::new(file), verify);

    let copied = io::copy(&mut reader.by_ref().take(entry.size), &mut writer).map_err(io_error)?;
    if copied != entry.size {
        return Err(io_error(io::Error::new(
            io::ErrorKind::UnexpectedEof,
            format!("expected {} bytes, read {copied}", entry.size),
        )));
    }

    if let Some(actual) = writer.finish().map_err(io_error)?
        && !actual.eq_ignore_ascii_case(&entry.hash)
    {
        return Err(Error::HashMismatch {
            entry: entry.path.clone(),
            expected: entry.hash.clone(),
            actual,
        });
    }

    Ok(())
}

/// Writer that optionally computes the MD5 of everything passing through it
struct HashingWriter<W: Write> {
    inner: W,
    hasher: Option<Md5>,
}

impl<W: Write> HashingWriter<W> {
    fn new(inner: W, hash: bool) -> Self {
        Self {
            inner,
            hasher: if hash { Some(Md5::new()) } else { None },
        }
    }

    /// Flush and return the lowercase hex digest, if hashing was enabled
    fn finish(mut self) -> io::Result<Option<String>> {
        self.inner.flush()?;
        Ok(self.hasher.map(|h| hex::encode(h.finalize())))
    }
}

impl<W: Write> Write for HashingWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let written = self.inner.write(buf)?;
        if let Some(hasher) = self.hasher.as_mut() {
            hasher.update(&buf[..written]);
        }
        Ok(written)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}
