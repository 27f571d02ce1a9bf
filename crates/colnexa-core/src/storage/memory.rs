use std::collections::HashMap;

use anyhow::Result;

use super::KeyValueStore;

/// In-memory store. Contents are lost when it is dropped.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        self.entries.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_get_remove() {
        let mut store = MemoryStore::new();
        assert_eq!(store.get("jwt").unwrap(), None);

        store.set("jwt", "abc").unwrap();
        assert_eq!(store.get("jwt").unwrap().as_deref(), Some("abc"));

        store.set("jwt", "def").unwrap();
        assert_eq!(store.get("jwt").unwrap().as_deref(), Some("def"));
        assert_eq!(store.len(), 1);

        store.remove("jwt").unwrap();
        assert!(store.is_empty());
        // Removing again is fine
        store.remove("jwt").unwrap();
    }
}
