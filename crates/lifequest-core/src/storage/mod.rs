pub mod adapter;
pub mod file_store;
pub mod snapshot;

pub use adapter::{MemoryStore, StorageAdapter};
pub use file_store::FileStore;
pub use snapshot::{PersistedSnapshot, Restored, SNAPSHOT_KEY};
