use super::KvBackend;
use crate::error::{Result, TrendzError};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

const VALUE_EXT: &str = ".json";

/// File-per-key backend. Each key maps to `<root>/<encoded key>.json`.
///
/// Key characters outside `[A-Za-z0-9_-]` are encoded as `%XX` so keys like
/// `trends:-100420` stay portable as filenames and decode back exactly.
pub struct FileBackend {
    root: PathBuf,
    tmp_counter: AtomicU64,
}

impl FileBackend {
    pub fn new(root: PathBuf) -> Self {
        Self {
            root,
            tmp_counter: AtomicU64::new(0),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn encode_key(key: &str) -> String {
        let mut out = String::with_capacity(key.len());
        for b in key.bytes() {
            match b {
                b'a'..=b'z' | b'A'..=b'Z' | b'0'..=b'9' | b'_' | b'-' => out.push(b as char),
                _ => out.push_str(&format!("%{:02X}", b)),
            }
        }
        out
    }

    fn decode_key(name: &str) -> Option<String> {
        let mut out = Vec::with_capacity(name.len());
        let bytes = name.as_bytes();
        let mut i = 0;
        while i < bytes.len() {
            if bytes[i] == b'%' {
                let hex = name.get(i + 1..i + 3)?;
                out.push(u8::from_str_radix(hex, 16).ok()?);
                i += 3;
            } else {
                out.push(bytes[i]);
                i += 1;
            }
        }
        String::from_utf8(out).ok()
    }

    fn key_path(&self, key: &str) -> PathBuf {
        self.root
            .join(format!("{}{}", Self::encode_key(key), VALUE_EXT))
    }

    fn ensure_root(&self) -> Result<()> {
        if !self.root.exists() {
            fs::create_dir_all(&self.root).map_err(TrendzError::Io)?;
        }
        Ok(())
    }
}

impl KvBackend for FileBackend {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let path = self.key_path(key);
        if !path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(path).map_err(TrendzError::Io)?;
        Ok(Some(content))
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.ensure_root()?;

        // Atomic write: temp file in the same directory, then rename
        let n = self.tmp_counter.fetch_add(1, Ordering::Relaxed);
        let tmp = self.root.join(format!(".value-{}-{}.tmp", std::process::id(), n));
        fs::write(&tmp, value).map_err(TrendzError::Io)?;
        fs::rename(&tmp, self.key_path(key)).map_err(TrendzError::Io)?;
        Ok(())
    }

    fn keys(&self, prefix: &str) -> Result<Vec<String>> {
        if !self.root.exists() {
            return Ok(Vec::new());
        }
        let mut keys = Vec::new();
        for entry in fs::read_dir(&self.root).map_err(TrendzError::Io)? {
            let entry = entry.map_err(TrendzError::Io)?;
            let name = entry.file_name();
            let Some(name) = name.to_str() else { continue };
            let Some(stem) = name.strip_suffix(VALUE_EXT) else {
                continue;
            };
            if let Some(key) = Self::decode_key(stem) {
                if key.starts_with(prefix) {
                    keys.push(key);
                }
            }
        }
        Ok(keys)
    }

    fn remove(&self, key: &str) -> Result<()> {
        let path = self.key_path(key);
        if path.exists() {
            fs::remove_file(path).map_err(TrendzError::Io)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn backend() -> (tempfile::TempDir, FileBackend) {
        let dir = tempfile::tempdir().unwrap();
        let backend = FileBackend::new(dir.path().to_path_buf());
        (dir, backend)
    }

    #[test]
    fn get_set_roundtrip() {
        let (_dir, backend) = backend();
        assert_eq!(backend.get("trends:g1").unwrap(), None);

        backend.set("trends:g1", r#"{"foo":1.0}"#).unwrap();
        assert_eq!(
            backend.get("trends:g1").unwrap().as_deref(),
            Some(r#"{"foo":1.0}"#)
        );
    }

    #[test]
    fn overwrite_replaces_value() {
        let (_dir, backend) = backend();
        backend.set("k", "a").unwrap();
        backend.set("k", "b").unwrap();
        assert_eq!(backend.get("k").unwrap().as_deref(), Some("b"));
    }

    #[test]
    fn keys_filters_by_prefix() {
        let (_dir, backend) = backend();
        backend.set("trends:g1", "{}").unwrap();
        backend.set("trends:g2", "{}").unwrap();
        backend.set("other:g3", "{}").unwrap();

        let mut keys = backend.keys("trends:").unwrap();
        keys.sort();
        assert_eq!(keys, vec!["trends:g1", "trends:g2"]);
    }

    #[test]
    fn keys_decode_punctuated_group_ids() {
        let (_dir, backend) = backend();
        backend.set("trends:-100420", "{}").unwrap();

        let keys = backend.keys("trends:").unwrap();
        assert_eq!(keys, vec!["trends:-100420"]);
    }

    #[test]
    fn remove_is_idempotent() {
        let (_dir, backend) = backend();
        backend.set("k", "v").unwrap();
        backend.remove("k").unwrap();
        backend.remove("k").unwrap();
        assert_eq!(backend.get("k").unwrap(), None);
    }

    #[test]
    fn no_tmp_files_left_behind() {
        let (dir, backend) = backend();
        backend.set("trends:g1", "{}").unwrap();
        backend.set("trends:g1", "{}").unwrap();

        let leftovers: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().ends_with(".tmp"))
            .collect();
        assert!(leftovers.is_empty());
    }
}
