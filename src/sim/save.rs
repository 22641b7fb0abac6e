/// Durable key-value persistence.
///
/// The engine reads and writes exactly three logical keys, always as
/// strings, through the `KeyValueStore` trait:
///
///   best-2048         best score (decimal)
///   leaderboard-2048  serialized top-5 run list
///   theme-2048        "dark" / "light" (terminal host only)
///
/// ## File format:
///   `store.toml`: a flat TOML table of string values, rewritten
///   whole on every change. A missing or corrupt file loads as empty.

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

use thiserror::Error;

pub const KEY_BEST: &str = "best-2048";
pub const KEY_LEADERBOARD: &str = "leaderboard-2048";
pub const KEY_THEME: &str = "theme-2048";

const STORE_FILE: &str = "store.toml";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("store serialization error: {0}")]
    Serialize(#[from] toml::ser::Error),
}

pub trait KeyValueStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError>;
    fn remove(&mut self, key: &str) -> Result<(), StoreError>;
}

// ══════════════════════════════════════════════════════════════
// In-memory store
// ══════════════════════════════════════════════════════════════

/// Volatile store: tests, and the fallback when no data dir is writable.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    values: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        MemoryStore::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        self.values.remove(key);
        Ok(())
    }
}

// ══════════════════════════════════════════════════════════════
// File store
// ══════════════════════════════════════════════════════════════

pub struct FileStore {
    path: PathBuf,
    values: BTreeMap<String, String>,
}

impl FileStore {
    /// Open (or lazily create) `store.toml` inside `dir`.
    pub fn open(dir: &Path) -> Result<Self, StoreError> {
        std::fs::create_dir_all(dir).map_err(|source| StoreError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
        let path = dir.join(STORE_FILE);
        let values = load_values(&path);
        Ok(FileStore { path, values })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn flush(&self) -> Result<(), StoreError> {
        let text = toml::to_string(&self.values)?;
        std::fs::write(&self.path, text).map_err(|source| StoreError::Io {
            path: self.path.clone(),
            source,
        })
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        self.values.insert(key.to_string(), value.to_string());
        self.flush()
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        if self.values.remove(key).is_some() {
            self.flush()?;
        }
        Ok(())
    }
}

fn load_values(path: &Path) -> BTreeMap<String, String> {
    let text = match std::fs::read_to_string(path) {
        Ok(t) => t,
        Err(_) => return BTreeMap::new(),
    };
    match toml::from_str::<BTreeMap<String, String>>(&text) {
        Ok(v) => v,
        Err(e) => {
            log::warn!("{} is corrupt ({e}); starting with an empty store", path.display());
            BTreeMap::new()
        }
    }
}

// ══════════════════════════════════════════════════════════════
// Paths
// ══════════════════════════════════════════════════════════════

/// Where persistent files live.
/// Order: configured dir, exe dir (if writable), XDG data home, CWD.
pub fn data_dir(configured: Option<&Path>) -> PathBuf {
    if let Some(dir) = configured {
        return dir.to_path_buf();
    }

    if let Ok(exe) = std::env::current_exe() {
        let resolved = exe.canonicalize().unwrap_or(exe);
        if let Some(parent) = resolved.parent() {
            // System installs like /usr/games/ won't be writable.
            let test_path = parent.join(".write_test_wild2048");
            if std::fs::write(&test_path, "").is_ok() {
                let _ = std::fs::remove_file(&test_path);
                return parent.to_path_buf();
            }
        }
    }

    if let Ok(home) = std::env::var("HOME") {
        let xdg = PathBuf::from(&home).join(".local/share/wild2048");
        if std::fs::create_dir_all(&xdg).is_ok() {
            return xdg;
        }
    }

    std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."))
}
