//! `info`: resolved directories and discovered archives

use anyhow::{Context, Result};
use console::style;
use x4_cat::index::total_size;

use crate::config::Settings;
use crate::utils::{add_table_row, create_spinner, create_table, format_bytes};

pub fn execute(settings: &Settings) -> Result<()> {
    let cache = settings.game_cache()?;

    println!("{} {}", style("Game directory: ").bold(), cache.game_dir().display());
    println!("{} {}", style("Cache directory:").bold(), cache.cache_dir().display());

    let extensions = cache.extensions().context("Failed to list extensions")?;
    if extensions.is_empty() {
        println!("{} none", style("Extensions:     ").bold());
    } else {
        println!("{} {}", style("Extensions:     ").bold(), extensions.join(", "));
    }
    println!();

    let spinner = create_spinner("Reading catalog indexes...");
    let sets = cache.all_data().context("Failed to scan archives")?;
    let mut table = create_table(&["Archive", "Extension", "Entries", "Size", "Extracted"]);
    let mut entries = 0;
    let mut bytes = 0;

    for set in &sets {
        let index = set
            .entries()
            .with_context(|| format!("Failed to read {}", set.index_file().display()))?;
        entries += index.len();
        bytes = total_size(index).saturating_add(bytes);

        add_table_row(
            &mut table,
            vec![
                set.name().to_string(),
                set.extension_label().unwrap_or("-").to_string(),
                index.len().to_string(),
                format_bytes(total_size(index)),
                if set.is_extracted() { "yes" } else { "no" }.to_string(),
            ],
        );
    }
    spinner.finish_and_clear();

    table.printstd();
    println!(
        "\n{} archives, {} entries, {}",
        sets.len(),
        entries,
        format_bytes(bytes)
    );
    Ok(())
}
