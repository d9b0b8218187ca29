use super::KvBackend;
use crate::error::{Result, TrendzError};
use std::collections::HashMap;
use std::sync::Mutex;

/// In-memory backend for testing and embedded use.
/// Does NOT persist data.
#[derive(Default)]
pub struct InMemoryBackend {
    data: Mutex<HashMap<String, String>>,
}

impl InMemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, String>>> {
        self.data
            .lock()
            .map_err(|_| TrendzError::Store("backend lock poisoned".to_string()))
    }
}

impl KvBackend for InMemoryBackend {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.lock()?.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.lock()?.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn keys(&self, prefix: &str) -> Result<Vec<String>> {
        Ok(self
            .lock()?
            .keys()
            .filter(|k| k.starts_with(prefix))
            .cloned()
            .collect())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.lock()?.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_get_remove() {
        let backend = InMemoryBackend::new();
        backend.set("a", "1").unwrap();
        assert_eq!(backend.get("a").unwrap().as_deref(), Some("1"));

        backend.remove("a").unwrap();
        assert_eq!(backend.get("a").unwrap(), None);
    }

    #[test]
    fn keys_by_prefix() {
        let backend = InMemoryBackend::new();
        backend.set("trends:a", "{}").unwrap();
        backend.set("trends:b", "{}").unwrap();
        backend.set("cfg", "{}").unwrap();

        let mut keys = backend.keys("trends:").unwrap();
        keys.sort();
        assert_eq!(keys, vec!["trends:a", "trends:b"]);
    }
}
