//! Persisted client state (the last used upload folder).

use std::collections::HashMap;

use crate::error::UiResult;

pub const LAST_FOLDER_KEY: &str = "wolkenlift.last_folder";

/// String key/value persistence: `localStorage` in the browser, a JSON file natively.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> UiResult<Option<String>>;
    fn set(&mut self, key: &str, value: &str) -> UiResult<()>;
    fn remove(&mut self, key: &str) -> UiResult<()>;
}

#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    values: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> UiResult<Option<String>> {
        Ok(self.values.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> UiResult<()> {
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> UiResult<()> {
        self.values.remove(key);
        Ok(())
    }
}

#[cfg(feature = "native")]
pub use file_store::JsonFileStore;

#[cfg(feature = "native")]
mod file_store {
    use std::collections::BTreeMap;
    use std::path::{Path, PathBuf};

    use tracing::warn;

    use super::KeyValueStore;
    use crate::error::UiResult;

    /// Flat JSON object on disk, rewritten on every change.
    #[derive(Debug)]
    pub struct JsonFileStore {
        path: PathBuf,
        values: BTreeMap<String, String>,
    }

    impl JsonFileStore {
        /// Open the store; a missing file starts empty, a corrupt one is ignored with a warning.
        pub fn open(path: impl AsRef<Path>) -> UiResult<Self> {
            let path = path.as_ref().to_path_buf();
            let values = match std::fs::read_to_string(&path) {
                Ok(text) => match serde_json::from_str(&text) {
                    Ok(v) => v,
                    Err(e) => {
                        warn!(path = %path.display(), error = %e, "state file unreadable, starting empty");
                        BTreeMap::new()
                    }
                },
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
                Err(e) => return Err(e.into()),
            };
            Ok(Self { path, values })
        }

        fn persist(&self) -> UiResult<()> {
            if let Some(parent) = self.path.parent() {
                if !parent.as_os_str().is_empty() {
                    std::fs::create_dir_all(parent)?;
                }
            }
            let text = serde_json::to_string_pretty(&self.values)?;
            std::fs::write(&self.path, text)?;
            Ok(())
        }

        pub fn path(&self) -> &Path {
            &self.path
        }
    }

    impl KeyValueStore for JsonFileStore {
        fn get(&self, key: &str) -> UiResult<Option<String>> {
            Ok(self.values.get(key).cloned())
        }

        fn set(&mut self, key: &str, value: &str) -> UiResult<()> {
            self.values.insert(key.to_string(), value.to_string());
            self.persist()
        }

        fn remove(&mut self, key: &str) -> UiResult<()> {
            if self.values.remove(key).is_some() {
                self.persist()?;
            }
            Ok(())
        }
    }
}
