//! Errors raised while capturing or restoring checkpoints.

use thiserror::Error;

/// Failure to snapshot or restore a suspended computation.
///
/// Deliberately disjoint from
/// [`SerializationError`](crate::SerializationError): checkpoint failures
/// never involve an allowlist.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum CheckpointSerializationError {
    /// The object graph holds a value that cannot be captured, such as a
    /// live resource handle.
    #[error("cannot checkpoint {type_name}: {reason}")]
    UnsupportedType {
        /// Canonical name of the root type being captured.
        type_name: String,
        /// Explanation from the failing value.
        reason: String,
    },

    /// The checkpoint bytes are corrupt, truncated or not a checkpoint.
    #[error("malformed checkpoint for {type_name}: {reason}")]
    Malformed {
        /// Canonical name of the requested type.
        type_name: String,
        /// What was wrong with the input.
        reason: String,
    },

    /// The checkpoint holds a different type from the one requested.
    #[error("checkpoint holds {found}, expected {expected}")]
    TypeMismatch {
        /// Type requested by the caller.
        expected: String,
        /// Type recorded in the checkpoint.
        found: String,
    },
}

/// Result type used by the checkpoint path.
pub type Result<T> = std::result::Result<T, CheckpointSerializationError>;
