use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

use crate::document::{IniDocument, LoadMode};
use crate::storage::MemoryStorage;

/// Create a temporary directory for file-backed tests
pub fn create_test_dir() -> TempDir {
    tempfile::tempdir().unwrap()
}

/// Create an INI file with content
pub fn create_test_file(dir: &TempDir, filename: &str, content: &str) -> PathBuf {
    let file_path = dir.path().join(filename);
    fs::write(&file_path, content).unwrap();
    file_path
}

/// Load a document from text, returning a handle to observe its saves
pub fn memory_document(content: &str) -> (IniDocument<MemoryStorage>, MemoryStorage) {
    let storage = MemoryStorage::with_contents(content);
    let doc = IniDocument::load(storage.clone(), LoadMode::Strict).unwrap();
    (doc, storage)
}
