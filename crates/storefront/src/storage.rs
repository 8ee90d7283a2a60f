//! File-backed snapshot storage.
//!
//! One JSON file per key inside a directory. Writes go to a temporary file
//! that is then renamed over the target, so a crash mid-write never leaves a
//! truncated snapshot behind.
//!
//! The [`SnapshotStorage`] port is synchronous. On a multi-threaded tokio
//! runtime the file calls run under `block_in_place`, so a worker thread
//! holding a cart lock hands its other tasks off while it waits on disk.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use galeria_core::storage::{SnapshotStorage, StorageError};
use tokio::runtime::{Handle, RuntimeFlavor};

/// Durable storage rooted at a directory.
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    /// Open (and create if needed) the storage directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(|e| io_error(&dir, &e))?;
        Ok(Self { dir })
    }

    /// Directory holding the snapshot files.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File path for `key`. Characters outside `[A-Za-z0-9_-]` become `_`.
    #[must_use]
    pub fn path_for(&self, key: &str) -> PathBuf {
        let name: String = key
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        self.dir.join(format!("{name}.json"))
    }
}

fn io_error(path: &Path, e: &std::io::Error) -> StorageError {
    if e.kind() == ErrorKind::StorageFull {
        StorageError::Unavailable(format!("{}: {e}", path.display()))
    } else {
        StorageError::Io(format!("{}: {e}", path.display()))
    }
}

/// Run blocking file I/O, moving off the async worker when there is one to
/// move off. Outside a runtime (the CLI) or on a current-thread runtime the
/// call runs inline; `block_in_place` panics there.
fn blocking<T>(f: impl FnOnce() -> T) -> T {
    match Handle::try_current() {
        Ok(handle) if handle.runtime_flavor() == RuntimeFlavor::MultiThread => {
            tokio::task::block_in_place(f)
        }
        _ => f(),
    }
}

impl SnapshotStorage for FileStorage {
    fn load(&self, key: &str) -> Result<Option<String>, StorageError> {
        let path = self.path_for(key);
        blocking(|| match fs::read_to_string(&path) {
            Ok(raw) => Ok(Some(raw)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(io_error(&path, &e)),
        })
    }

    fn save(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let path = self.path_for(key);
        let tmp = path.with_extension("json.tmp");
        blocking(|| {
            fs::write(&tmp, value).map_err(|e| io_error(&tmp, &e))?;
            fs::rename(&tmp, &path).map_err(|e| io_error(&path, &e))
        })
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let path = self.path_for(key);
        blocking(|| match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(io_error(&path, &e)),
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use galeria_core::{CartStore, NewLineItem};

    /// Fresh directory under the system temp dir.
    fn temp_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "galeria-storage-{name}-{}",
            uuid::Uuid::new_v4()
        ));
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_path_for_sanitizes_keys() {
        let storage = FileStorage::open(temp_dir("paths")).unwrap();
        let path = storage.path_for("cart:v1:../../etc/passwd");
        assert_eq!(path.parent(), Some(storage.dir()));
        assert_eq!(
            path.file_name().unwrap().to_str().unwrap(),
            "cart_v1_______etc_passwd.json"
        );
    }

    #[test]
    fn test_save_load_remove() {
        let dir = temp_dir("roundtrip");
        let storage = FileStorage::open(&dir).unwrap();

        assert!(storage.load("cart:v1").unwrap().is_none());
        storage.save("cart:v1", "{\"items\":[]}").unwrap();
        assert_eq!(
            storage.load("cart:v1").unwrap().as_deref(),
            Some("{\"items\":[]}")
        );

        storage.remove("cart:v1").unwrap();
        storage.remove("cart:v1").unwrap();
        assert!(storage.load("cart:v1").unwrap().is_none());

        fs::remove_dir_all(dir).unwrap();
    }

    #[test]
    fn test_cart_survives_reopen() {
        let dir = temp_dir("reopen");
        {
            let mut cart = CartStore::open(FileStorage::open(&dir).unwrap(), "cart:v1");
            cart.add(NewLineItem::new("obra-2", "Memoria de Agua", 380.0), 2.0);
        }

        let cart = CartStore::open(FileStorage::open(&dir).unwrap(), "cart:v1");
        assert_eq!(cart.count(), 2);
        assert!((cart.total() - 760.0).abs() < f64::EPSILON);

        fs::remove_dir_all(dir).unwrap();
    }

    fn exercise(storage: &FileStorage) {
        storage.save("cart:v1:rt", "{\"items\":[]}").unwrap();
        assert!(storage.load("cart:v1:rt").unwrap().is_some());
        storage.remove("cart:v1:rt").unwrap();
        assert!(storage.load("cart:v1:rt").unwrap().is_none());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_io_inside_multi_thread_runtime() {
        let dir = temp_dir("multi");
        let storage = FileStorage::open(&dir).unwrap();

        let mut cart = CartStore::open(storage.clone(), "cart:v1");
        cart.add(NewLineItem::new("p05", "Taza", 90.0), 1.0);
        cart.clear();
        exercise(&storage);

        fs::remove_dir_all(dir).unwrap();
    }

    #[tokio::test]
    async fn test_io_inside_current_thread_runtime() {
        let dir = temp_dir("current");
        exercise(&FileStorage::open(&dir).unwrap());
        fs::remove_dir_all(dir).unwrap();
    }
}
