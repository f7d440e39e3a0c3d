/// One `key=value` line together with the comment lines directly above it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    key: String,
    value: String,
    comments: Vec<String>,
}

impl Entry {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self::with_comments(key, value, Vec::new())
    }

    pub fn with_comments(
        key: impl Into<String>,
        value: impl Into<String>,
        comments: Vec<String>,
    ) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
            comments,
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Raw stored text; typed reads convert from this
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Comment text without the leading `;`
    pub fn comments(&self) -> &[String] {
        &self.comments
    }

    /// Replace the value, returning whether it actually changed
    pub(crate) fn set_value(&mut self, value: &str) -> bool {
        if self.value == value {
            return false;
        }
        self.value = value.to_string();
        true
    }
}
