//! Error taxonomy for schema export and import.

use thiserror::Error;

/// Errors raised while exporting or importing a field.
///
/// Every variant names the handle it failed on so a caller aggregating
/// errors across many fields can report which entries were rejected.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum SyncError {
    /// No handler is registered for the given field type discriminator.
    #[error("no handler registered for field type '{type_name}'")]
    UnknownType {
        /// The unresolvable type discriminator.
        type_name: String,
    },

    /// A declarative definition is structurally invalid.
    #[error("malformed definition for '{handle}': {reason}")]
    MalformedDefinition {
        /// Handle of the field or block type the definition describes.
        handle: String,
        /// What is missing or inconsistent.
        reason: String,
    },

    /// Declared settings were rejected by live-model validation.
    #[error("validation failed for '{handle}': {message}")]
    Validation {
        /// Handle of the entity that failed validation.
        handle: String,
        /// The rejection message, surfaced unchanged.
        message: String,
    },
}

impl SyncError {
    pub(crate) fn malformed(handle: &str, reason: impl Into<String>) -> Self {
        Self::MalformedDefinition {
            handle: handle.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn validation(handle: &str, message: impl Into<String>) -> Self {
        Self::Validation {
            handle: handle.to_string(),
            message: message.into(),
        }
    }
}

/// Result alias used throughout the engine.
pub type Result<T, E = SyncError> = std::result::Result<T, E>;
