//! Core types for remote files and flash messages

use chrono::{DateTime, Utc};
use std::fmt;

/// One entry in remote storage, projected from the storage API.
///
/// Never persisted locally: every listing builds a fresh set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteFile {
    /// Base name of the resource
    pub name: String,
    /// Canonical path relative to the storage root (no `disk:/` marker)
    pub path: String,
    /// Size in bytes (0 for directories)
    pub size: u64,
    /// Whether the resource is a directory
    pub is_directory: bool,
    /// Last modification time, when the backend reports one
    pub modified: Option<DateTime<Utc>>,
}

impl RemoteFile {
    /// Type discriminator shown in the file list.
    pub fn kind(&self) -> &'static str {
        if self.is_directory {
            "directory"
        } else {
            "file"
        }
    }
}

/// Category of a flash message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlashCategory {
    Success,
    Error,
}

impl FlashCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            FlashCategory::Success => "success",
            FlashCategory::Error => "error",
        }
    }
}

impl fmt::Display for FlashCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A status message stored for exactly one subsequent render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlashMessage {
    pub category: FlashCategory,
    pub text: String,
}

impl FlashMessage {
    pub fn success(text: impl Into<String>) -> Self {
        Self {
            category: FlashCategory::Success,
            text: text.into(),
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            category: FlashCategory::Error,
            text: text.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_discriminates_directories() {
        let file = RemoteFile {
            name: "a.txt".into(),
            path: "a.txt".into(),
            size: 10,
            is_directory: false,
            modified: None,
        };
        let dir = RemoteFile {
            name: "sub".into(),
            path: "sub".into(),
            size: 0,
            is_directory: true,
            modified: None,
        };
        assert_eq!(file.kind(), "file");
        assert_eq!(dir.kind(), "directory");
    }

    #[test]
    fn test_flash_category_renders_as_css_class() {
        assert_eq!(FlashMessage::error("boom").category.to_string(), "error");
        assert_eq!(FlashCategory::Success.as_str(), "success");
    }
}
