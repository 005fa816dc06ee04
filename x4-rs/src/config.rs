//! Configuration file and directory resolution
//!
//! The game directory is taken from `--game-dir` / `X4_GAME_DIR`, then from
//! the configuration file, then from well-known Steam locations. The cache
//! directory follows the same order but falls back to the per-user cache
//! directory instead of searching.

use anyhow::{Context, Result, bail};
use directories::{BaseDirs, ProjectDirs};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use x4_cat::{ExtensionFilter, GameCache};

use crate::cli::Cli;

/// Name of the configuration file inside the config directory
pub const CONFIG_FILE: &str = "config.yaml";

/// Name of the cache subdirectory inside the per-user cache directory
pub const CACHE_SUBDIR: &str = "x4data";

/// Where Steam installs X4, relative to a library root
const STEAM_INSTALL: &str = "steamapps/common/X4 Foundations";

/// Library roots relative to the home directory
const HOME_STEAM_ROOTS: &[&str] = &[".steam/debian-installation", ".steam/steam", ".local/share/Steam"];

/// Contents of `config.yaml`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// X4 installation directory
    #[serde(alias = "x4Dir")]
    pub game_dir: Option<PathBuf>,
    /// Extraction cache root
    #[serde(alias = "x4Cache")]
    pub cache_dir: Option<PathBuf>,
    /// Extension name filters used when none are given on the command line
    pub extensions: Option<Vec<String>>,
}

impl Config {
    /// Parse a configuration file
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml_ng::from_str(&text)
            .with_context(|| format!("Invalid config file {}", path.display()))
    }

    /// Load the explicit file if given, else the default file if it exists
    pub fn discover(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load(path);
        }
        match default_config_path() {
            Some(path) if path.is_file() => {
                log::debug!("Using config file {}", path.display());
                Self::load(&path)
            }
            _ => Ok(Self::default()),
        }
    }
}

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("org", "x4-rs", "x4-rs")
}

/// Default location of `config.yaml`
pub fn default_config_path() -> Option<PathBuf> {
    project_dirs().map(|dirs| dirs.config_dir().join(CONFIG_FILE))
}

/// Default extraction cache root
pub fn default_cache_dir() -> Option<PathBuf> {
    project_dirs().map(|dirs| dirs.cache_dir().join(CACHE_SUBDIR))
}

/// Steam install locations that exist on this machine
pub fn steam_candidates() -> Vec<PathBuf> {
    let mut candidates = Vec::new();

    if let Some(base) = BaseDirs::new() {
        for root in HOME_STEAM_ROOTS {
            candidates.push(base.home_dir().join(root).join(STEAM_INSTALL));
        }
    }
    for var in ["ProgramFiles(x86)", "ProgramFiles"] {
        if let Some(programs) = env::var_os(var) {
            candidates.push(PathBuf::from(programs).join("Steam").join(STEAM_INSTALL));
        }
    }

    candidates.retain(|dir| dir.is_dir());
    candidates
}

/// Pick the candidate with the most entries
///
/// A leftover install directory usually holds a few files only, the real
/// installation hundreds.
pub fn pick_install<I: IntoIterator<Item = PathBuf>>(candidates: I) -> Option<PathBuf> {
    candidates
        .into_iter()
        .filter_map(|dir| {
            let count = fs::read_dir(&dir).ok()?.count();
            Some((count, dir))
        })
        .max_by_key(|(count, _)| *count)
        .map(|(_, dir)| dir)
}

/// Directories and defaults resolved from the command line and config file
#[derive(Debug, Clone)]
pub struct Settings {
    /// The loaded configuration file
    pub config: Config,
    game_dir: Option<PathBuf>,
    cache_dir: Option<PathBuf>,
}

impl Settings {
    /// Build settings from parsed arguments, loading the config file
    pub fn from_cli(cli: &Cli) -> Result<Self> {
        let config = Config::discover(cli.config.as_deref())?;
        Ok(Self::new(config, cli.game_dir.clone(), cli.cache_dir.clone()))
    }

    /// Build settings from a config and command line overrides
    pub fn new(config: Config, game_dir: Option<PathBuf>, cache_dir: Option<PathBuf>) -> Self {
        Self {
            config,
            game_dir,
            cache_dir,
        }
    }

    /// Resolve the X4 installation directory
    pub fn game_dir(&self) -> Result<PathBuf> {
        let explicit = self.game_dir.as_ref().or(self.config.game_dir.as_ref());
        if let Some(dir) = explicit {
            if !dir.is_dir() {
                bail!("Game directory {} does not exist", dir.display());
            }
            return Ok(dir.clone());
        }

        match pick_install(steam_candidates()) {
            Some(dir) => {
                log::info!("Found X4 installation at {}", dir.display());
                Ok(dir)
            }
            None => bail!("No X4 installation found, pass --game-dir or set X4_GAME_DIR"),
        }
    }

    /// Resolve the extraction cache root
    pub fn cache_dir(&self) -> Result<PathBuf> {
        self.cache_dir
            .clone()
            .or_else(|| self.config.cache_dir.clone())
            .or_else(default_cache_dir)
            .context("No cache directory available, pass --cache-dir or set X4_CACHE_DIR")
    }

    /// Open the installation with its cache
    pub fn game_cache(&self) -> Result<GameCache> {
        let game_dir = self.game_dir()?;
        let cache_dir = self.cache_dir()?;
        GameCache::new(&game_dir, &cache_dir).with_context(|| {
            format!(
                "Failed to open {} with cache {}",
                game_dir.display(),
                cache_dir.display()
            )
        })
    }

    /// Extension filter from command line names, falling back to the config
    ///
    /// Without any names only the base game is used.
    pub fn extension_filter(&self, names: &[String], all: bool) -> ExtensionFilter {
        if all {
            ExtensionFilter::All
        } else if !names.is_empty() {
            ExtensionFilter::containing(names)
        } else if let Some(names) = &self.config.extensions {
            ExtensionFilter::containing(names)
        } else {
            ExtensionFilter::none()
        }
    }
}
