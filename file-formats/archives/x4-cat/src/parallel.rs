//! Parallel processing utilities for resource sets
//!
//! Every [`ResourceSet`] owns its blob handle and a disjoint cache
//! directory, so independent archives can be extracted on rayon worker
//! threads without coordination.

use crate::extract::{ExtractOptions, ExtractionSummary};
use crate::resource_set::ResourceSet;
use crate::Result;
use rayon::prelude::*;
use std::sync::Arc;

/// Extract several archives in parallel
///
/// Results are returned in the order of `sets`. The first failure is
/// reported; archives that already finished stay extracted.
///
/// # Examples
///
/// ```no_run
/// use x4_cat::{ExtractOptions, GameCache, parallel};
///
/// # fn main() -> Result<(), x4_cat::Error> {
/// let cache = GameCache::new("/games/X4 Foundations", "/tmp/x4cache")?;
/// let summaries = parallel::extract_all(&cache.all_data()?, &ExtractOptions::default())?;
/// println!("{} archives extracted", summaries.len());
/// # Ok(())
/// # }
/// ```
pub fn extract_all(
    sets: &[Arc<ResourceSet>],
    options: &ExtractOptions,
) -> Result<Vec<ExtractionSummary>> {
    process_resource_sets_parallel(sets, |set| set.extract_with(options))
}

/// Process resource sets in parallel with a custom function
pub fn process_resource_sets_parallel<F, T>(sets: &[Arc<ResourceSet>], processor: F) -> Result<Vec<T>>
where
    F: Fn(&ResourceSet) -> Result<T> + Sync,
    T: Send,
{
    sets.par_iter().map(|set| processor(set.as_ref())).collect()
}
