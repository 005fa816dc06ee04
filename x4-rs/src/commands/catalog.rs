//! `catalog`: build the merged XML catalog

use anyhow::{Context, Result};
use clap::Args;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use x4_cat::{ExtractOptions, ResourceCatalog};
use x4_catalog::CatalogMerger;

use crate::commands::cat::extract_catalog;
use crate::config::Settings;
use crate::utils::{add_numeric_row, create_progress_bar, create_table, format_summary};

#[derive(Args)]
pub struct CatalogArgs {
    /// Include extensions whose name contains this text (repeatable)
    #[arg(short, long = "extension", value_name = "NAME")]
    pub extensions: Vec<String>,

    /// Include every extension
    #[arg(long, conflicts_with = "extensions")]
    pub all_extensions: bool,

    /// Write the merged document to this file
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Extract archives on a thread pool
    #[arg(short, long)]
    pub parallel: bool,
}

pub fn execute(args: &CatalogArgs, settings: &Settings) -> Result<()> {
    let cache = settings.game_cache()?;
    let filter = settings.extension_filter(&args.extensions, args.all_extensions);
    let catalog =
        ResourceCatalog::from_cache(&cache, &filter).context("Failed to scan archives")?;

    let summary = extract_catalog(&catalog, args.parallel, &ExtractOptions::default())?;
    log::info!("Cache: {}", format_summary(&summary));

    let xml_files = catalog.xml_files().context("Failed to list XML files")?;
    let pb = create_progress_bar(xml_files.len() as u64, "Merging XML");
    let mut merger = CatalogMerger::new();
    for file in &xml_files {
        pb.set_message(format!("Merging: {}", file.display()));
        merger
            .merge_file(file)
            .with_context(|| format!("Failed to merge {}", file.display()))?;
        pb.inc(1);
    }
    pb.finish_and_clear();

    let stats = merger.stats();
    let document = merger.into_document();

    let mut table = create_table(&["Section", "Entries"]);
    for tag in document.section_names() {
        let count = document.section_child_count(&tag).unwrap_or(0);
        add_numeric_row(&mut table, &tag, vec![count.to_string()]);
    }
    table.printstd();
    println!(
        "\n{} fragments, {} diffs ({} operations), {} empty files skipped",
        stats.fragments, stats.diffs, stats.operations, stats.skipped
    );

    if let Some(output) = &args.output {
        let file = File::create(output)
            .with_context(|| format!("Failed to create {}", output.display()))?;
        let mut writer = BufWriter::new(file);
        document
            .write_to(&mut writer)
            .and_then(|()| writer.flush())
            .with_context(|| format!("Failed to write {}", output.display()))?;
        println!("Catalog written to {}", output.display());
    }
    Ok(())
}
