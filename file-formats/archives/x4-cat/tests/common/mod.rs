//! Common test utilities and fixtures

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Route library logging to the test harness
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Create a temporary directory for tests
pub fn temp_dir() -> TempDir {
    tempfile::tempdir().expect("Failed to create temp dir")
}

/// Generate test data of a specific size
pub fn generate_test_data(size: usize, seed: u8) -> Vec<u8> {
    (0..size).map(|i| (i as u8).wrapping_add(seed)).collect()
}

/// One file to pack into a test archive
pub struct TestFile {
    pub path: String,
    pub data: Vec<u8>,
    pub epoch: i64,
}

impl TestFile {
    pub fn new(path: &str, data: impl Into<Vec<u8>>) -> Self {
        Self {
            path: path.to_string(),
            data: data.into(),
            epoch: 0,
        }
    }

    pub fn with_epoch(mut self, epoch: i64) -> Self {
        self.epoch = epoch;
        self
    }
}

/// Write `name.cat` and `name.dat` into `dir`, returning the blob path
pub fn write_archive(dir: &Path, name: &str, files: &[TestFile]) -> PathBuf {
    let mut index = String::new();
    let mut blob = Vec::new();
    for file in files {
        index.push_str(&format!(
            "{} {} {} {}\n",
            file.path,
            file.data.len(),
            file.epoch,
            md5_hex(&file.data)
        ));
        blob.extend_from_slice(&file.data);
    }

    fs::create_dir_all(dir).expect("Failed to create archive dir");
    fs::write(dir.join(format!("{name}.cat")), index).expect("Failed to write index");
    let blob_path = dir.join(format!("{name}.dat"));
    fs::write(&blob_path, blob).expect("Failed to write blob");
    blob_path
}

/// Lowercase hex MD5, as used in catalog indexes
pub fn md5_hex(data: &[u8]) -> String {
    use md5::{Digest, Md5};
    hex::encode(Md5::digest(data))
}
