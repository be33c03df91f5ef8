use std::sync::Mutex;

use crate::error::CoreError;

/// Durable home for the single serialized snapshot record.
///
/// Adapters move opaque text; the snapshot shape and the default-fill policy
/// live in [`PersistedSnapshot`](super::PersistedSnapshot).
pub trait StorageAdapter {
    /// The stored record, or `None` when nothing has been written yet.
    fn read(&self) -> Result<Option<String>, CoreError>;

    /// Replace the stored record.
    fn write(&self, record: &str) -> Result<(), CoreError>;

    /// Remove the stored record. Clearing an empty store is not an error.
    fn clear(&self) -> Result<(), CoreError>;
}

/// In-process store. Nothing survives the process.
#[derive(Debug, Default)]
pub struct MemoryStore {
    record: Mutex<Option<String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store that already holds `record`.
    pub fn with_record(record: impl Into<String>) -> Self {
        Self {
            record: Mutex::new(Some(record.into())),
        }
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Option<String>>, CoreError> {
        self.record
            .lock()
            .map_err(|_| CoreError::Storage("memory store lock poisoned".into()))
    }
}

impl StorageAdapter for MemoryStore {
    fn read(&self) -> Result<Option<String>, CoreError> {
        Ok(self.lock()?.clone())
    }

    fn write(&self, record: &str) -> Result<(), CoreError> {
        *self.lock()? = Some(record.to_string());
        Ok(())
    }

    fn clear(&self) -> Result<(), CoreError> {
        *self.lock()? = None;
        Ok(())
    }
}

impl<S: StorageAdapter + ?Sized> StorageAdapter for &S {
    fn read(&self) -> Result<Option<String>, CoreError> {
        (**self).read()
    }

    fn write(&self, record: &str) -> Result<(), CoreError> {
        (**self).write(record)
    }

    fn clear(&self) -> Result<(), CoreError> {
        (**self).clear()
    }
}
