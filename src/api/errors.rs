//! Errors raised by file-operation handlers
//!
//! None of these reach the client as an HTTP error: every mutating handler
//! turns them into an error flash message followed by a redirect.

use crate::storage::StorageError;
use thiserror::Error;

/// Failure of a user-initiated file operation
#[derive(Debug, Error)]
pub enum ActionError {
    #[error("File was not uploaded")]
    NotUploaded,

    #[error("File upload failed")]
    UploadFailed,

    #[error("No file path specified")]
    MissingPath,

    #[error("Current path or new name not specified")]
    MissingRenameFields,

    #[error("Filename contains invalid characters")]
    InvalidName,

    #[error("Cannot change file extension")]
    ExtensionChanged,

    #[error("File '{0}' does not exist")]
    NotFound(String),

    /// Copy succeeded but removing the original failed: both paths now exist.
    #[error("File was copied to '{to}' but '{from}' could not be removed ({source}); a duplicate remains")]
    PartialRename {
        from: String,
        to: String,
        source: StorageError,
    },

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("{context}: {source}")]
    Context {
        context: &'static str,
        source: Box<ActionError>,
    },
}

impl ActionError {
    /// Prefix the user-facing message with the operation that failed.
    pub fn during(self, context: &'static str) -> Self {
        ActionError::Context {
            context,
            source: Box::new(self),
        }
    }

    /// Innermost error, skipping any `Context` wrappers.
    pub fn root(&self) -> &ActionError {
        match self {
            ActionError::Context { source, .. } => source.root(),
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_context_message() {
        let err = ActionError::NotFound("a.txt".into()).during("Delete error");
        assert_eq!(err.to_string(), "Delete error: File 'a.txt' does not exist");
        assert!(matches!(err.root(), ActionError::NotFound(_)));
    }

    #[test]
    fn test_storage_message_is_transparent() {
        let err: ActionError = StorageError::Api {
            status: 507,
            message: "Insufficient storage".into(),
        }
        .into();
        assert_eq!(
            err.during("Upload error").to_string(),
            "Upload error: Insufficient storage"
        );
    }

    #[test]
    fn test_partial_rename_is_distinct() {
        let err = ActionError::PartialRename {
            from: "a.txt".into(),
            to: "b.txt".into(),
            source: StorageError::Other("locked".into()),
        };
        let msg = err.to_string();
        assert!(msg.contains("b.txt"));
        assert!(msg.contains("duplicate"));
    }
}
