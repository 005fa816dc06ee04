//! Catalog assembly over a scanned installation

use crate::common::{TestFile, init_logging, temp_dir, write_archive};
use pretty_assertions::assert_eq;
use std::path::{Path, PathBuf};
use x4_cat::{ExtensionFilter, ExtractOptions, GameCache, ResourceCatalog};

fn build_installation(root: &Path) -> PathBuf {
    let game = root.join("X4 Foundations");
    write_archive(
        &game,
        "02",
        &[
            TestFile::new("libraries/jobs.xml", "<jobs/>"),
            TestFile::new("textures/a.dds", "dds"),
        ],
    );
    write_archive(
        &game,
        "01",
        &[TestFile::new("libraries/wares.xml", "<wares/>")],
    );

    let extensions = game.join("extensions");
    write_archive(
        &extensions.join("ego_dlc_split"),
        "ext_01",
        &[TestFile::new("libraries/wares.xml", "<diff/>")],
    );
    write_archive(
        &extensions.join("ego_dlc_boron"),
        "ext_01",
        &[TestFile::new("libraries/wares.xml", "<diff/>")],
    );
    write_archive(
        &extensions.join("my_mod"),
        "ext_01",
        &[TestFile::new("md/mod.xml", "<mdscript/>")],
    );
    game
}

fn relative_to(paths: &[PathBuf], base: &Path) -> Vec<String> {
    paths
        .iter()
        .map(|p| {
            p.strip_prefix(base)
                .unwrap()
                .to_string_lossy()
                .replace('\\', "/")
        })
        .collect()
}

#[test]
fn test_xml_files_in_merge_order() {
    init_logging();
    let temp = temp_dir();
    let game = build_installation(temp.path());
    let cache_root = temp.path().join("cache");
    let cache = GameCache::new(&game, &cache_root).unwrap();

    let catalog = ResourceCatalog::from_cache(&cache, &ExtensionFilter::All).unwrap();
    assert_eq!(catalog.len(), 5);

    let xml = catalog.xml_files().unwrap();
    assert_eq!(
        relative_to(&xml, &cache_root),
        [
            "01/libraries/wares.xml",
            "02/libraries/jobs.xml",
            "extensions/ego_dlc_boron/ext_01/libraries/wares.xml",
            "extensions/ego_dlc_split/ext_01/libraries/wares.xml",
            "extensions/my_mod/ext_01/md/mod.xml",
        ]
    );
    assert!(xml.iter().all(|p| p.is_file()));
}

#[test]
fn test_extension_filter_by_substring() {
    let temp = temp_dir();
    let game = build_installation(temp.path());
    let cache = GameCache::new(&game, temp.path().join("cache")).unwrap();

    let catalog =
        ResourceCatalog::from_cache(&cache, &ExtensionFilter::containing(["ego_dlc"])).unwrap();
    let labels: Vec<_> = catalog
        .resource_sets()
        .iter()
        .map(|s| s.extension_label().unwrap_or("base").to_string())
        .collect();
    assert_eq!(labels, ["base", "base", "ego_dlc_boron", "ego_dlc_split"]);

    let base_only = ResourceCatalog::from_cache(&cache, &ExtensionFilter::none()).unwrap();
    assert_eq!(base_only.len(), 2);
}

#[test]
fn test_extract_all_parallel_and_sequential_agree() {
    let temp = temp_dir();
    let game = build_installation(temp.path());

    let parallel_cache = GameCache::new(&game, temp.path().join("parallel")).unwrap();
    let parallel = ResourceCatalog::from_cache(&parallel_cache, &ExtensionFilter::All).unwrap();
    let parallel_summary = parallel
        .extract_all(true, &ExtractOptions::default())
        .unwrap();

    let sequential_cache = GameCache::new(&game, temp.path().join("sequential")).unwrap();
    let sequential = ResourceCatalog::from_cache(&sequential_cache, &ExtensionFilter::All).unwrap();
    let sequential_summary = sequential
        .extract_all(false, &ExtractOptions::default())
        .unwrap();

    assert_eq!(parallel_summary, sequential_summary);
    assert_eq!(parallel_summary.written, 6);
}

#[test]
fn test_catalog_shares_resource_sets_with_cache() {
    let temp = temp_dir();
    let game = build_installation(temp.path());
    let cache = GameCache::new(&game, temp.path().join("cache")).unwrap();

    let first = ResourceCatalog::from_cache(&cache, &ExtensionFilter::All).unwrap();
    first.extract_all(false, &ExtractOptions::default()).unwrap();

    // A second catalog over the same context does not extract again
    let second = ResourceCatalog::from_cache(&cache, &ExtensionFilter::All).unwrap();
    assert!(second.resource_sets().iter().all(|s| s.is_extracted()));
    let summary = second
        .extract_all(false, &ExtractOptions::default())
        .unwrap();
    assert_eq!(summary.total(), 0);
}
