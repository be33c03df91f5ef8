use std::fs;
use std::io::{Read as _, Write as _};
use std::path::{Path, PathBuf};

use super::adapter::StorageAdapter;
use super::snapshot::SNAPSHOT_KEY;
use crate::error::CoreError;

/// Stores the snapshot as `<dir>/<key>.json`, locked while reading or writing.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    /// A store in `dir` under the current schema key.
    pub fn open(dir: &Path) -> Result<Self, CoreError> {
        Self::open_with_key(dir, SNAPSHOT_KEY)
    }

    /// A store in `dir` under an explicit key. Creates `dir` if needed.
    pub fn open_with_key(dir: &Path, key: &str) -> Result<Self, CoreError> {
        if key.is_empty() || key.contains(['/', '\\']) {
            return Err(CoreError::Storage(format!("invalid storage key: {key:?}")));
        }
        fs::create_dir_all(dir)?;
        Ok(Self {
            path: dir.join(format!("{key}.json")),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl StorageAdapter for FileStore {
    /// Read under a shared lock.
    fn read(&self) -> Result<Option<String>, CoreError> {
        let file = match fs::OpenOptions::new().read(true).open(&self.path) {
            Ok(f) => f,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(CoreError::Io(e)),
        };
        fs2::FileExt::lock_shared(&file).map_err(CoreError::Io)?;
        let mut data = String::new();
        let result = (&file).read_to_string(&mut data);
        fs2::FileExt::unlock(&file).ok();
        result?;
        Ok(Some(data))
    }

    /// Write under an exclusive lock.
    fn write(&self, record: &str) -> Result<(), CoreError> {
        let file = fs::OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&self.path)?;
        fs2::FileExt::lock_exclusive(&file).map_err(CoreError::Io)?;
        (&file).write_all(record.as_bytes())?;
        (&file).flush()?;
        fs2::FileExt::unlock(&file).map_err(CoreError::Io)?;
        tracing::debug!(path = %self.path.display(), bytes = record.len(), "Snapshot written");
        Ok(())
    }

    fn clear(&self) -> Result<(), CoreError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(CoreError::Io(e)),
        }
    }
}
