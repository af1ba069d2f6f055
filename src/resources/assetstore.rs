//! Keyed asset storage.
//!
//! An [`AssetStore`] maps string ids to loaded assets. Loading goes through
//! an [`AssetLoader`], so tests and headless runs can swap the file system
//! for something else. [`FileLoader`] reads raw bytes from disk, relative to
//! a root directory.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use log::{debug, info};
use rustc_hash::FxHashMap;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AssetError {
    #[error("asset '{id}' not found at {path:?}: {source}")]
    NotFound {
        id: String,
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("asset '{0}' is not loaded")]
    NotLoaded(String),
}

/// Turns a path into an asset.
pub trait AssetLoader<T> {
    fn load(&self, path: &Path) -> io::Result<T>;
}

/// Reads the file at `root/path` as bytes.
#[derive(Debug, Clone, Default)]
pub struct FileLoader {
    pub root: PathBuf,
}

impl FileLoader {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl AssetLoader<Vec<u8>> for FileLoader {
    fn load(&self, path: &Path) -> io::Result<Vec<u8>> {
        fs::read(self.root.join(path))
    }
}

/// Id-keyed store of loaded assets.
pub struct AssetStore<T> {
    assets: FxHashMap<String, T>,
    loader: Box<dyn AssetLoader<T>>,
}

impl<T> AssetStore<T> {
    pub fn new(loader: impl AssetLoader<T> + 'static) -> Self {
        Self {
            assets: FxHashMap::default(),
            loader: Box::new(loader),
        }
    }

    /// Load `path` under `id`, replacing any asset already stored there.
    pub fn load(&mut self, id: &str, path: impl AsRef<Path>) -> Result<&T, AssetError> {
        let path = path.as_ref();
        let asset = self.loader.load(path).map_err(|source| AssetError::NotFound {
            id: id.to_string(),
            path: path.to_path_buf(),
            source,
        })?;
        info!("Loaded asset '{}' from {:?}", id, path);
        self.assets.insert(id.to_string(), asset);
        self.get(id)
    }

    /// Store an already constructed asset.
    pub fn insert(&mut self, id: &str, asset: T) {
        debug!("Inserted asset '{}'", id);
        self.assets.insert(id.to_string(), asset);
    }

    pub fn get(&self, id: &str) -> Result<&T, AssetError> {
        self.assets.get(id).ok_or_else(|| AssetError::NotLoaded(id.to_string()))
    }

    pub fn contains(&self, id: &str) -> bool {
        self.assets.contains_key(id)
    }

    pub fn unload(&mut self, id: &str) -> Option<T> {
        self.assets.remove(id)
    }

    pub fn len(&self) -> usize {
        self.assets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }
}

impl<T> std::fmt::Debug for AssetStore<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut ids: Vec<&String> = self.assets.keys().collect();
        ids.sort();
        f.debug_struct("AssetStore").field("ids", &ids).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixed;

    impl AssetLoader<String> for Fixed {
        fn load(&self, path: &Path) -> io::Result<String> {
            if path.starts_with("missing") {
                Err(io::Error::new(io::ErrorKind::NotFound, "no such asset"))
            } else {
                Ok(path.display().to_string())
            }
        }
    }

    #[test]
    fn load_then_get() {
        let mut store = AssetStore::new(Fixed);
        assert_eq!(store.load("hero", "sprites/hero.png").unwrap(), "sprites/hero.png");
        assert_eq!(store.get("hero").unwrap(), "sprites/hero.png");
        assert!(store.contains("hero"));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn missing_assets_report_their_id() {
        let mut store = AssetStore::new(Fixed);
        match store.load("ghost", "missing/ghost.png") {
            Err(AssetError::NotFound { id, path, .. }) => {
                assert_eq!(id, "ghost");
                assert_eq!(path, PathBuf::from("missing/ghost.png"));
            }
            other => panic!("unexpected: {other:?}"),
        }
        assert!(matches!(store.get("ghost"), Err(AssetError::NotLoaded(id)) if id == "ghost"));
    }

    #[test]
    fn file_loader_reads_bytes() {
        let dir = std::env::temp_dir().join(format!("ledgehop_assets_{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("tile.bin"), [1u8, 2, 3]).unwrap();
        let mut store = AssetStore::new(FileLoader::new(&dir));
        assert_eq!(store.load("tile", "tile.bin").unwrap(), &vec![1u8, 2, 3]);
        assert!(store.unload("tile").is_some());
        assert!(store.is_empty());
        fs::remove_dir_all(&dir).ok();
    }
}
