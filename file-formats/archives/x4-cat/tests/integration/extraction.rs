//! Extraction behaviour of resource sets against real files

use crate::common::{TestFile, generate_test_data, init_logging, temp_dir, write_archive};
use filetime::{FileTime, set_file_mtime};
use pretty_assertions::assert_eq;
use std::fs;
use x4_cat::{Error, ExtractOptions, ResourceSet, ZeroSizePolicy};

const INDEX_EPOCH: i64 = 1_600_000_000;

fn sample_files() -> Vec<TestFile> {
    vec![
        TestFile::new("libraries/wares.xml", "<wares><ware id=\"x\"/></wares>"),
        TestFile::new("assets/a b c.bin", generate_test_data(70_000, 7)),
        TestFile::new("libraries/empty.xml", ""),
        TestFile::new("md/setup.xml", "<mdscript name=\"Setup\"/>"),
    ]
    .into_iter()
    .map(|f| f.with_epoch(INDEX_EPOCH))
    .collect()
}

#[test]
fn test_extracted_bytes_match_blob_slices() {
    init_logging();
    let temp = temp_dir();
    let blob = write_archive(temp.path(), "01", &sample_files());
    let blob_bytes = fs::read(&blob).unwrap();

    let set = ResourceSet::open(temp.path(), "01", temp.path().join("cache")).unwrap();
    set.extract().unwrap();

    let mut offset = 0usize;
    for entry in set.entries().unwrap() {
        let size = entry.size as usize;
        let cached = fs::read(set.entry_file(entry).unwrap()).unwrap();
        assert_eq!(cached, blob_bytes[offset..offset + size].to_vec());
        offset += size;
    }
    assert_eq!(offset, blob_bytes.len());
}

#[test]
fn test_second_extraction_writes_nothing() {
    let temp = temp_dir();
    write_archive(temp.path(), "01", &sample_files());
    let cache = temp.path().join("cache");

    let first = ResourceSet::open(temp.path(), "01", &cache).unwrap();
    let summary = first.extract().unwrap();
    assert_eq!(summary.written, 4);

    // Same instance: the extraction flag short-circuits
    assert!(first.extract().unwrap().is_noop());

    // Fresh instance: every cached file is newer than the index
    let second = ResourceSet::open(temp.path(), "01", &cache).unwrap();
    let summary = second.extract().unwrap();
    assert_eq!(summary.written, 0);
    assert_eq!(summary.skipped, 4);
    assert!(summary.is_noop());
}

#[test]
fn test_stale_files_are_rewritten_and_cursor_stays_aligned() {
    let temp = temp_dir();
    let files = sample_files();
    write_archive(temp.path(), "01", &files);
    let cache = temp.path().join("cache");

    ResourceSet::open(temp.path(), "01", &cache)
        .unwrap()
        .extract()
        .unwrap();

    // Tamper with two cached files and make only the second one stale
    let wares = cache.join("01").join("libraries/wares.xml");
    let setup = cache.join("01").join("md/setup.xml");
    fs::write(&wares, "tampered but fresh").unwrap();
    fs::write(&setup, "tampered and stale").unwrap();
    set_file_mtime(&setup, FileTime::from_unix_time(INDEX_EPOCH - 10, 0)).unwrap();

    let set = ResourceSet::open(temp.path(), "01", &cache).unwrap();
    let summary = set.extract().unwrap();
    assert_eq!(summary.written, 1);
    assert_eq!(summary.skipped, 3);

    assert_eq!(fs::read_to_string(&wares).unwrap(), "tampered but fresh");
    assert_eq!(
        fs::read(&setup).unwrap(),
        files[3].data,
        "skipped entries must still advance the blob cursor"
    );
}

#[test]
fn test_file_at_exact_epoch_is_stale() {
    let temp = temp_dir();
    write_archive(
        temp.path(),
        "01",
        &[TestFile::new("a.txt", "fresh data").with_epoch(INDEX_EPOCH)],
    );
    let cached = temp.path().join("cache").join("01").join("a.txt");
    fs::create_dir_all(cached.parent().unwrap()).unwrap();
    fs::write(&cached, "old").unwrap();
    set_file_mtime(&cached, FileTime::from_unix_time(INDEX_EPOCH, 0)).unwrap();

    let set = ResourceSet::open(temp.path(), "01", temp.path().join("cache")).unwrap();
    assert_eq!(set.extract().unwrap().written, 1);
    assert_eq!(fs::read_to_string(&cached).unwrap(), "fresh data");
}

#[test]
fn test_same_second_as_epoch_is_stale() {
    let temp = temp_dir();
    write_archive(
        temp.path(),
        "01",
        &[TestFile::new("a.txt", "fresh data").with_epoch(INDEX_EPOCH)],
    );
    let cached = temp.path().join("cache").join("01").join("a.txt");
    fs::create_dir_all(cached.parent().unwrap()).unwrap();
    fs::write(&cached, "old").unwrap();
    set_file_mtime(&cached, FileTime::from_unix_time(INDEX_EPOCH, 500_000_000)).unwrap();

    let set = ResourceSet::open(temp.path(), "01", temp.path().join("cache")).unwrap();
    assert_eq!(set.extract().unwrap().written, 1);
    assert_eq!(fs::read_to_string(&cached).unwrap(), "fresh data");
}

#[test]
fn test_zero_size_entries() {
    let temp = temp_dir();
    write_archive(
        temp.path(),
        "01",
        &[
            TestFile::new("empty.xml", "").with_epoch(INDEX_EPOCH),
            TestFile::new("after.txt", "after").with_epoch(INDEX_EPOCH),
        ],
    );
    let cache = temp.path().join("cache");

    let set = ResourceSet::open(temp.path(), "01", &cache).unwrap();
    set.extract().unwrap();
    let empty = cache.join("01").join("empty.xml");
    assert_eq!(fs::read(&empty).unwrap().len(), 0);
    assert_eq!(
        fs::read_to_string(cache.join("01").join("after.txt")).unwrap(),
        "after"
    );

    // A stale leftover with content is removed under the opt-in policy
    fs::write(&empty, "leftover").unwrap();
    set_file_mtime(&empty, FileTime::from_unix_time(INDEX_EPOCH - 1, 0)).unwrap();
    let set = ResourceSet::open(temp.path(), "01", &cache).unwrap();
    let options = ExtractOptions::new().zero_size_policy(ZeroSizePolicy::RemoveExisting);
    let summary = set.extract_with(&options).unwrap();
    assert_eq!(summary.removed, 1);
    assert!(!empty.exists());
}

#[test]
fn test_truncated_blob_aborts() {
    let temp = temp_dir();
    let blob = write_archive(temp.path(), "01", &sample_files());
    let len = fs::metadata(&blob).unwrap().len();
    fs::OpenOptions::new()
        .write(true)
        .open(&blob)
        .unwrap()
        .set_len(len - 1)
        .unwrap();

    let set = ResourceSet::open(temp.path(), "01", temp.path().join("cache")).unwrap();
    let err = set.extract().unwrap_err();
    assert!(matches!(err, Error::BlobTooShort { .. }));
    assert!(err.is_corruption());
    assert!(!set.is_extracted());
}

#[test]
fn test_malformed_index_names_the_file() {
    let temp = temp_dir();
    write_archive(temp.path(), "01", &[]);
    fs::write(temp.path().join("01.cat"), "a.xml 1 0 h\nbroken\n").unwrap();

    let set = ResourceSet::open(temp.path(), "01", temp.path().join("cache")).unwrap();
    let err = set.entries().unwrap_err();
    assert!(err.to_string().contains("01.cat"));
    match err {
        Error::Index { source, .. } => {
            assert!(matches!(*source, Error::Parse { line: 2, .. }));
        }
        other => panic!("expected index error, got {other:?}"),
    }
}

#[test]
fn test_hash_verification_on_real_archive() {
    let temp = temp_dir();
    write_archive(temp.path(), "01", &sample_files());

    let set = ResourceSet::open(temp.path(), "01", temp.path().join("cache")).unwrap();
    let summary = set
        .extract_with(&ExtractOptions::new().verify_hashes(true))
        .unwrap();
    assert_eq!(summary.written, 4);
}

#[test]
fn test_overflowing_index_sizes_abort_before_writing() {
    let temp = temp_dir();
    write_archive(temp.path(), "01", &[]);
    fs::write(
        temp.path().join("01.cat"),
        "a.bin 18446744073709551615 0 h\nb.bin 2 0 h\n",
    )
    .unwrap();
    fs::write(temp.path().join("01.dat"), b"abc").unwrap();

    let set = ResourceSet::open(temp.path(), "01", temp.path().join("cache")).unwrap();
    let err = set.extract().unwrap_err();
    match err {
        Error::BlobTooShort {
            expected, actual, ..
        } => {
            assert_eq!(expected, u64::MAX);
            assert_eq!(actual, 3);
        }
        other => panic!("expected BlobTooShort, got {other:?}"),
    }
    assert!(!temp.path().join("cache").join("01").join("a.bin").exists());
    assert!(!set.is_extracted());
}
