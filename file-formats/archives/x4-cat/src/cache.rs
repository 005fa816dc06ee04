//! Game installation scanning
//!
//! [`GameCache`] is the context object shared by everything that needs
//! catalog access. It is built once from a resolved installation directory
//! and cache root, and lazily enumerates the archives of the base game and of
//! every installed extension.

use crate::resource_set::ResourceSet;
use crate::{EXTENSIONS_DIR, Error, INDEX_EXTENSION, Result};
use once_cell::sync::OnceCell;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Archives of one installation and the cache they extract into
#[derive(Debug)]
pub struct GameCache {
    game_dir: PathBuf,
    cache_dir: PathBuf,
    main_data: OnceCell<Vec<Arc<ResourceSet>>>,
    extension_data: OnceCell<Vec<Arc<ResourceSet>>>,
}

impl GameCache {
    /// Create a context for the installation in `game_dir`
    ///
    /// The cache root is created when missing.
    pub fn new<P: Into<PathBuf>, Q: Into<PathBuf>>(game_dir: P, cache_dir: Q) -> Result<Self> {
        let game_dir = game_dir.into();
        let cache_dir = cache_dir.into();

        if !game_dir.is_dir() {
            return Err(Error::configuration(format!(
                "game directory {} does not exist",
                game_dir.display()
            )));
        }
        fs::create_dir_all(&cache_dir).map_err(|e| {
            Error::configuration(format!("can't create dir {}: {e}", cache_dir.display()))
        })?;

        Ok(Self {
            game_dir,
            cache_dir,
            main_data: OnceCell::new(),
            extension_data: OnceCell::new(),
        })
    }

    /// Installation directory
    pub fn game_dir(&self) -> &Path {
        &self.game_dir
    }

    /// Cache root
    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    /// Archives of the base game, sorted by index path
    pub fn main_data(&self) -> Result<&[Arc<ResourceSet>]> {
        self.main_data
            .get_or_try_init(|| self.list_main_data())
            .map(Vec::as_slice)
    }

    /// Archives of all extensions, sorted by index path
    pub fn extension_data(&self) -> Result<&[Arc<ResourceSet>]> {
        self.extension_data
            .get_or_try_init(|| self.list_extension_data())
            .map(Vec::as_slice)
    }

    /// Base game archives followed by extension archives
    pub fn all_data(&self) -> Result<Vec<Arc<ResourceSet>>> {
        let mut all = self.main_data()?.to_vec();
        all.extend_from_slice(self.extension_data()?);
        Ok(all)
    }

    /// Names of the installed extension directories, sorted
    pub fn extensions(&self) -> Result<Vec<String>> {
        let dir = self.game_dir.join(EXTENSIONS_DIR);
        if !dir.is_dir() {
            return Ok(Vec::new());
        }

        let mut names = Vec::new();
        for entry in fs::read_dir(&dir)? {
            let entry = entry?;
            if entry.file_type()?.is_dir() {
                names.push(entry.file_name().to_string_lossy().into_owned());
            } else {
                log::warn!("Ignoring {} in {}", entry.path().display(), dir.display());
            }
        }
        names.sort();
        Ok(names)
    }

    fn list_main_data(&self) -> Result<Vec<Arc<ResourceSet>>> {
        let mut sets = Vec::new();
        for name in archive_names(&self.game_dir)? {
            let set = ResourceSet::open(&self.game_dir, &name, &self.cache_dir)?
                .in_installation(&self.game_dir);
            sets.push(Arc::new(set));
        }
        sort_resource_sets(&mut sets);

        log::debug!(
            "Found {} base archives in {}",
            sets.len(),
            self.game_dir.display()
        );
        Ok(sets)
    }

    fn list_extension_data(&self) -> Result<Vec<Arc<ResourceSet>>> {
        let base_dir = self.game_dir.join(EXTENSIONS_DIR);
        let base_cache_dir = self.cache_dir.join(EXTENSIONS_DIR);

        let mut sets = Vec::new();
        for extension in self.extensions()? {
            let ext_dir = base_dir.join(&extension);
            let ext_cache = base_cache_dir.join(&extension);
            let names = archive_names(&ext_dir)?;
            if names.is_empty() {
                log::debug!("Extension {extension} has no archives");
                continue;
            }

            for name in names {
                let set = ResourceSet::open(&ext_dir, &name, &ext_cache)?
                    .in_installation(&self.game_dir);
                sets.push(Arc::new(set));
            }
        }
        sort_resource_sets(&mut sets);

        log::debug!("Found {} extension archives", sets.len());
        Ok(sets)
    }
}

/// Base names of the catalog indexes found directly in `dir`
pub fn archive_names(dir: &Path) -> Result<Vec<String>> {
    let mut names = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        let path = entry.path();
        if path.extension().is_some_and(|ext| ext == INDEX_EXTENSION)
            && let Some(stem) = path.file_stem()
        {
            names.push(stem.to_string_lossy().into_owned());
        }
    }
    names.sort();
    Ok(names)
}

/// Sort archives by the absolute path of their index
pub fn sort_resource_sets(sets: &mut [Arc<ResourceSet>]) {
    sets.sort_by_cached_key(|set| set.sort_key());
}
