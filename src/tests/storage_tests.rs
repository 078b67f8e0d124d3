#[cfg(test)]
mod tests {
    use crate::storage::{KeyValueStore, MemoryStore, LAST_FOLDER_KEY};

    #[test]
    fn test_memory_store() {
        let mut s = MemoryStore::new();
        assert_eq!(s.get(LAST_FOLDER_KEY).unwrap(), None);
        s.set(LAST_FOLDER_KEY, "/data").unwrap();
        assert_eq!(s.get(LAST_FOLDER_KEY).unwrap().as_deref(), Some("/data"));
        s.remove(LAST_FOLDER_KEY).unwrap();
        assert_eq!(s.get(LAST_FOLDER_KEY).unwrap(), None);
    }

    #[cfg(feature = "native")]
    #[test]
    fn test_json_file_store_persists() {
        use crate::storage::JsonFileStore;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("state.json");
        {
            let mut s = JsonFileStore::open(&path).unwrap();
            assert_eq!(s.get(LAST_FOLDER_KEY).unwrap(), None);
            s.set(LAST_FOLDER_KEY, "/mnt/robot").unwrap();
        }
        let s = JsonFileStore::open(&path).unwrap();
        assert_eq!(s.get(LAST_FOLDER_KEY).unwrap().as_deref(), Some("/mnt/robot"));
        assert_eq!(s.path(), path.as_path());
    }

    #[cfg(feature = "native")]
    #[test]
    fn test_json_file_store_ignores_corrupt_file() {
        use crate::storage::JsonFileStore;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        std::fs::write(&path, "{not json").unwrap();
        let mut s = JsonFileStore::open(&path).unwrap();
        assert_eq!(s.get(LAST_FOLDER_KEY).unwrap(), None);
        s.set("k", "v").unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("\"k\": \"v\""));
    }
}
