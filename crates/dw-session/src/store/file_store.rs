use crate::store::{SessionStore, StoreError, StoreResult};

use std::collections::BTreeMap;
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use log::{debug, warn};
use tempfile::NamedTempFile;

/// Session store backed by a small JSON object on disk.
///
/// Shared by every process that points at the same file. Each write goes
/// through its own uniquely named temp file, fsync and rename, so readers see
/// either the old or the new map and never a torn one. Read-modify-write
/// cycles are serialized per store; clones share the lock. A file that does
/// not parse is treated as empty.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
    write_lock: Arc<Mutex<()>>,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn lock_writes(&self) -> MutexGuard<'_, ()> {
        self.write_lock.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn read_map(&self) -> StoreResult<BTreeMap<String, String>> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(e) => return Err(StoreError::file_read(self.path.clone(), e)),
        };

        match serde_json::from_str(&contents) {
            Ok(map) => Ok(map),
            Err(e) => {
                warn!("Session file corrupted at {:?}, ignoring it: {e}", self.path);
                Ok(BTreeMap::new())
            }
        }
    }

    fn write_map(&self, map: &BTreeMap<String, String>) -> StoreResult<()> {
        if map.is_empty() {
            return self.remove_file();
        }

        let dir = match self.path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir,
            _ => Path::new("."),
        };
        fs::create_dir_all(dir).map_err(|e| StoreError::dir_creation(dir.to_path_buf(), e))?;

        let json = serde_json::to_string_pretty(map)?;

        // Unique temp file per write, in the target dir so the rename stays atomic
        let mut temp = NamedTempFile::new_in(dir)
            .map_err(|e| StoreError::file_write(dir.to_path_buf(), e))?;
        let temp_path = temp.path().to_path_buf();

        temp.write_all(json.as_bytes())
            .map_err(|e| StoreError::file_write(temp_path.clone(), e))?;

        temp.as_file()
            .sync_all()
            .map_err(|e| StoreError::file_write(temp_path.clone(), e))?;

        temp.persist(&self.path)
            .map_err(|e| StoreError::atomic_rename(temp_path, self.path.clone(), e.error))?;

        debug!("Session file written: {:?}", self.path);
        Ok(())
    }

    fn remove_file(&self) -> StoreResult<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => {
                debug!("Session file removed: {:?}", self.path);
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StoreError::file_remove(self.path.clone(), e)),
        }
    }
}

impl SessionStore for FileStore {
    fn get(&self, key: &str) -> StoreResult<Option<String>> {
        Ok(self.read_map()?.remove(key))
    }

    fn set_all(&self, entries: &[(&str, &str)]) -> StoreResult<()> {
        let _guard = self.lock_writes();
        let mut map = self.read_map()?;
        for (key, value) in entries {
            map.insert((*key).to_string(), (*value).to_string());
        }
        self.write_map(&map)
    }

    fn remove_all(&self, keys: &[&str]) -> StoreResult<()> {
        let _guard = self.lock_writes();
        let mut map = self.read_map()?;
        let before = map.len();
        for key in keys {
            map.remove(*key);
        }
        if map.len() == before && !map.is_empty() {
            return Ok(());
        }
        self.write_map(&map)
    }
}
