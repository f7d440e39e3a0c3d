//! Backing stores a document loads from and saves to.
//!
//! A store is opened and closed inside each call; nothing is held between a
//! load and the next save.
//!
//! Contents are text: [`FileStorage`] only reads UTF-8 (a leading byte order
//! mark is accepted and dropped by the parser). A Latin-1 or other non-UTF-8
//! file fails to load with a storage error instead of being decoded.

use std::cell::RefCell;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::rc::Rc;

pub trait Storage {
    /// Identifier used in log lines and error messages
    fn name(&self) -> &str;

    /// Full contents, or `None` when the location does not exist yet
    fn read(&self) -> io::Result<Option<String>>;

    /// Replace the full contents
    fn write(&mut self, contents: &str) -> io::Result<()>;
}

/// A file on disk
#[derive(Debug, Clone)]
pub struct FileStorage {
    path: PathBuf,
    name: String,
}

impl FileStorage {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref().to_path_buf();
        let name = path.display().to_string();
        Self { path, name }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Storage for FileStorage {
    fn name(&self) -> &str {
        &self.name
    }

    fn read(&self) -> io::Result<Option<String>> {
        match fs::read_to_string(&self.path) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }

    fn write(&mut self, contents: &str) -> io::Result<()> {
        // Create parent directories if they don't exist
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, contents)
    }
}

#[derive(Debug, Default)]
struct MemoryState {
    contents: Option<String>,
    saves: usize,
}

/// In-memory store. Clones share the same buffer, so a caller can keep a
/// handle to inspect what a document wrote and how many times it saved.
#[derive(Debug, Clone)]
pub struct MemoryStorage {
    name: String,
    state: Rc<RefCell<MemoryState>>,
}

impl MemoryStorage {
    /// A store whose location does not exist yet
    pub fn new() -> Self {
        Self {
            name: "memory".to_string(),
            state: Rc::default(),
        }
    }

    pub fn with_contents(contents: impl Into<String>) -> Self {
        let storage = Self::new();
        storage.state.borrow_mut().contents = Some(contents.into());
        storage
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn contents(&self) -> Option<String> {
        self.state.borrow().contents.clone()
    }

    /// Number of writes since creation
    pub fn save_count(&self) -> usize {
        self.state.borrow().saves
    }
}

impl Default for MemoryStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl Storage for MemoryStorage {
    fn name(&self) -> &str {
        &self.name
    }

    fn read(&self) -> io::Result<Option<String>> {
        Ok(self.contents())
    }

    fn write(&mut self, contents: &str) -> io::Result<()> {
        let mut state = self.state.borrow_mut();
        state.contents = Some(contents.to_string());
        state.saves += 1;
        Ok(())
    }
}
