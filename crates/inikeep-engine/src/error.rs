use thiserror::Error;

/// Coarse classification of [`IniError`], for callers that only care about
/// the category of failure rather than the exact variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed source text, or text that cannot be written back unambiguously
    Format,
    /// A required section or key is missing
    NotFound,
    /// The host called the API out of order
    Misuse,
    /// The backing storage could not be read or written
    Storage,
}

#[derive(Debug, Error)]
pub enum IniError {
    #[error("Invalid section header on line {line_number}: `{line}` in {source_name}")]
    InvalidSectionHeader {
        line_number: usize,
        line: String,
        source_name: String,
    },

    #[error("Invalid key without '=' on line {line_number}: `{line}` in {source_name}")]
    MissingSeparator {
        line_number: usize,
        line: String,
        source_name: String,
    },

    #[error("Cannot store {text:?} in {source_name}: {reason}")]
    Unrepresentable {
        text: String,
        reason: &'static str,
        source_name: String,
    },

    #[error("Section {section} not found in {source_name}")]
    SectionNotFound {
        section: String,
        source_name: String,
    },

    #[error("Key {key} not found in section {section} of {source_name}")]
    KeyNotFound {
        section: String,
        key: String,
        source_name: String,
    },

    #[error("end_update called without matching begin_update on {source_name}")]
    EndUpdateWithoutBegin { source_name: String },

    #[error("Storage not found: {source_name}")]
    StorageNotFound { source_name: String },

    #[error("Storage error on {source_name}: {source}")]
    Storage {
        source_name: String,
        source: std::io::Error,
    },
}

impl IniError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            IniError::InvalidSectionHeader { .. }
            | IniError::MissingSeparator { .. }
            | IniError::Unrepresentable { .. } => ErrorKind::Format,
            IniError::SectionNotFound { .. } | IniError::KeyNotFound { .. } => {
                ErrorKind::NotFound
            }
            IniError::EndUpdateWithoutBegin { .. } => ErrorKind::Misuse,
            IniError::StorageNotFound { .. } | IniError::Storage { .. } => ErrorKind::Storage,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.kind() == ErrorKind::NotFound
    }
}

pub type Result<T, E = IniError> = std::result::Result<T, E>;
