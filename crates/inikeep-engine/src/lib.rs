pub mod convert;
pub mod document;
pub mod error;
pub mod models;
pub mod parsing;
pub mod render;
pub mod storage;

#[cfg(test)]
pub mod tests;

// Re-export key types for easier usage
pub use convert::IniValue;
pub use document::{IniDocument, LoadMode, UpdateGuard};
pub use error::{ErrorKind, IniError, Result};
pub use models::{Entry, Section};
pub use storage::{FileStorage, MemoryStorage, Storage};
