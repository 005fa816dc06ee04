//! Catalog archive commands

use anyhow::{Context, Result};
use clap::Subcommand;
use std::path::{Path, PathBuf};
use x4_cat::{
    CatalogEntry, ExtractOptions, ExtractionSummary, ResourceCatalog, ZeroSizePolicy, load_index,
};

use crate::config::Settings;
use crate::utils::{
    add_table_row, create_progress_bar, create_spinner, create_table, format_bytes,
    format_summary, format_timestamp, matches_pattern, truncate_path,
};

#[derive(Subcommand)]
pub enum CatCommands {
    /// List the entries of a catalog index
    List {
        /// Path to the .cat file
        index: PathBuf,

        /// Show size, timestamp and hash
        #[arg(short, long)]
        long: bool,

        /// Filter entries by pattern (supports wildcards)
        #[arg(short, long)]
        filter: Option<String>,
    },

    /// Extract the archives of the installation into the cache
    Extract {
        /// Extract archives on a thread pool
        #[arg(short, long)]
        parallel: bool,

        /// Check every written file against its MD5 hash
        #[arg(long)]
        verify: bool,

        /// Delete stale cached files for zero-size entries instead of truncating them
        #[arg(long)]
        remove_empty: bool,

        /// Include extensions whose name contains this text (repeatable)
        #[arg(short, long = "extension", value_name = "NAME")]
        extensions: Vec<String>,

        /// Include every extension
        #[arg(long, conflicts_with = "extensions")]
        all_extensions: bool,
    },
}

pub fn execute(command: CatCommands, settings: &Settings) -> Result<()> {
    match command {
        CatCommands::List {
            index,
            long,
            filter,
        } => list_index(&index, long, filter.as_deref()),
        CatCommands::Extract {
            parallel,
            verify,
            remove_empty,
            extensions,
            all_extensions,
        } => {
            let options = ExtractOptions::new()
                .verify_hashes(verify)
                .zero_size_policy(if remove_empty {
                    ZeroSizePolicy::RemoveExisting
                } else {
                    ZeroSizePolicy::WriteEmpty
                });
            let cache = settings.game_cache()?;
            let filter = settings.extension_filter(&extensions, all_extensions);
            let catalog =
                ResourceCatalog::from_cache(&cache, &filter).context("Failed to scan archives")?;

            let summary = extract_catalog(&catalog, parallel, &options)?;
            println!(
                "{} archives into {}: {}",
                catalog.len(),
                cache.cache_dir().display(),
                format_summary(&summary)
            );
            Ok(())
        }
    }
}

fn list_index(path: &Path, long: bool, filter: Option<&str>) -> Result<()> {
    let entries = load_index(path)
        .with_context(|| format!("Failed to read catalog index {}", path.display()))?;
    let pattern = filter.unwrap_or("*");

    let matching: Vec<&CatalogEntry> = entries
        .iter()
        .filter(|e| matches_pattern(&e.path, pattern))
        .collect();

    if matching.is_empty() {
        println!("No entries found matching pattern: {pattern}");
        return Ok(());
    }

    if long {
        let mut table = create_table(&["Path", "Size", "Modified", "Hash"]);
        for entry in &matching {
            add_table_row(
                &mut table,
                vec![
                    truncate_path(&entry.path, 60),
                    format_bytes(entry.size),
                    format_timestamp(entry.modified_epoch),
                    entry.hash.clone(),
                ],
            );
        }
        table.printstd();
    } else {
        for entry in &matching {
            println!("{}", entry.path);
        }
    }

    let bytes: u64 = matching.iter().map(|e| e.size).sum();
    log::info!(
        "{} of {} entries, {}",
        matching.len(),
        entries.len(),
        format_bytes(bytes)
    );
    Ok(())
}

/// Extract every archive of a catalog, reporting progress per archive
pub fn extract_catalog(
    catalog: &ResourceCatalog,
    parallel: bool,
    options: &ExtractOptions,
) -> Result<ExtractionSummary> {
    if parallel {
        let spinner = create_spinner(&format!("Extracting {} archives...", catalog.len()));
        let summary = catalog
            .extract_all(true, options)
            .context("Failed to extract archives")?;
        spinner.finish_and_clear();
        return Ok(summary);
    }

    let pb = create_progress_bar(catalog.len() as u64, "Extracting archives");
    let mut summary = ExtractionSummary::default();
    for set in catalog.resource_sets() {
        pb.set_message(format!("Extracting: {}", set.index_file().display()));
        let run = set
            .extract_with(options)
            .with_context(|| format!("Failed to extract {}", set.index_file().display()))?;
        summary.accumulate(&run);
        pb.inc(1);
    }
    pb.finish_and_clear();
    Ok(summary)
}
