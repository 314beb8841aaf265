use crate::records::ItemStore;
use anyhow::{Context, Result};
use directories::ProjectDirs;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

const PROJECT_DIR: &str = ".radar";
const STORE_FILE: &str = "items.yml";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreScope {
    Project,
    Global,
}

#[derive(Debug, Clone)]
pub struct StoreLocation {
    pub path: PathBuf,
    pub scope: StoreScope,
}

impl StoreScope {
    pub fn label(self) -> &'static str {
        match self {
            StoreScope::Project => "project",
            StoreScope::Global => "global",
        }
    }
}

pub fn init_project_store(dir: &Path, name: Option<String>) -> Result<StoreLocation> {
    let store_dir = dir.join(PROJECT_DIR);
    fs::create_dir_all(&store_dir).context("failed to create .radar directory")?;
    let location = StoreLocation {
        path: store_dir.join(STORE_FILE),
        scope: StoreScope::Project,
    };
    if !location.path.exists() {
        let store_name = name.unwrap_or_else(|| dir_name(dir, "project"));
        save_store(&location, &ItemStore::named(store_name))?;
        info!(path = %location.path.display(), "initialized item store");
    }
    Ok(location)
}

pub fn locate_store(start: &Path) -> Result<StoreLocation> {
    if let Some(path) = find_project_store(start) {
        return Ok(StoreLocation {
            path,
            scope: StoreScope::Project,
        });
    }
    Ok(StoreLocation {
        path: global_store_path()?,
        scope: StoreScope::Global,
    })
}

pub fn locate_current_store() -> Result<StoreLocation> {
    let cwd = env::current_dir()?;
    locate_store(&cwd)
}

pub fn load_store(location: &StoreLocation) -> Result<ItemStore> {
    if location.path.exists() {
        let data = fs::read_to_string(&location.path)
            .with_context(|| format!("reading {:?}", location.path))?;
        let store: ItemStore = serde_yaml::from_str(&data).context("parsing item file")?;
        let duplicates = store.duplicate_ids();
        if !duplicates.is_empty() {
            warn!(
                path = %location.path.display(),
                ids = ?duplicates,
                "item file repeats ids; only the first record of each is reachable"
            );
        }
        Ok(store)
    } else {
        let fallback_name = match location.scope {
            StoreScope::Project => location
                .path
                .parent()
                .and_then(|p| p.parent())
                .map(|p| dir_name(p, "project"))
                .unwrap_or_else(|| "project".to_string()),
            StoreScope::Global => "default".to_string(),
        };
        let store = ItemStore::named(fallback_name);
        save_store(location, &store)?;
        Ok(store)
    }
}

pub fn save_store(location: &StoreLocation, store: &ItemStore) -> Result<()> {
    if let Some(parent) = location.path.parent() {
        fs::create_dir_all(parent).with_context(|| format!("creating {:?}", parent))?;
    }
    let serialized = serde_yaml::to_string(store).context("serializing items")?;
    fs::write(&location.path, serialized)
        .with_context(|| format!("writing {:?}", location.path))?;
    Ok(())
}

pub fn data_dir() -> Result<PathBuf> {
    let dirs = ProjectDirs::from("", "", "radar").context("locating data directory")?;
    Ok(dirs.data_dir().to_path_buf())
}

fn find_project_store(start: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .map(|dir| dir.join(PROJECT_DIR).join(STORE_FILE))
        .find(|candidate| candidate.exists())
}

fn global_store_path() -> Result<PathBuf> {
    Ok(data_dir()?.join(STORE_FILE))
}

fn dir_name(dir: &Path, fallback: &str) -> String {
    dir.file_name()
        .and_then(|n| n.to_str())
        .unwrap_or(fallback)
        .to_string()
}
