//! Key-value persistence for session state.
//!
//! The session manager never caches anything itself; every read and write
//! goes through a `KeyValueStore`. Three implementations are provided:
//! - `MemoryStore`: process-local, used by tests
//! - `FileStore`: a JSON file under the cache directory
//! - `KeyringStore`: the OS keychain

pub mod file;
pub mod keychain;
pub mod memory;

use anyhow::Result;

pub use file::FileStore;
pub use keychain::KeyringStore;
pub use memory::MemoryStore;

/// String key-value storage with local-storage semantics.
pub trait KeyValueStore {
    /// Read a value. A missing key is `Ok(None)`, not an error.
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Write a value, replacing any previous one.
    fn set(&mut self, key: &str, value: &str) -> Result<()>;

    /// Remove a value. Removing a missing key succeeds.
    fn remove(&mut self, key: &str) -> Result<()>;
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for Box<S> {
    fn get(&self, key: &str) -> Result<Option<String>> {
        (**self).get(key)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        (**self).set(key, value)
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        (**self).remove(key)
    }
}
