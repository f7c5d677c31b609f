//! Error taxonomy for wire serialization.
//!
//! - [`SerializationError::Resolution`]: no scheme is registered for the
//!   context's use-case. This is a configuration fault.
//! - [`SerializationError::Encoding`]: a scheme could not produce bytes.
//! - [`SerializationError::Decoding`]: input bytes were malformed, truncated,
//!   oversized, produced by another scheme, or named a different type.
//! - [`SerializationError::WhitelistViolation`]: a decoded type, or a type
//!   nested inside it, is not admitted by the context's allowlist.
//!
//! Failures are deterministic for a given input and are never retried
//! internally.

use thiserror::Error;

use crate::use_case::UseCase;

/// Errors surfaced by [`SerializationFactory`](crate::SerializationFactory).
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum SerializationError {
    /// The factory has no scheme for the requested use-case.
    #[error("no serialization scheme registered for use case {use_case}")]
    Resolution {
        /// Use-case of the context passed to the call.
        use_case: UseCase,
    },

    /// The scheme failed to encode a value.
    #[error("failed to encode {type_name}: {reason}")]
    Encoding {
        /// Canonical name of the value's type.
        type_name: String,
        /// Scheme-provided explanation.
        reason: String,
    },

    /// The scheme failed to decode the supplied bytes.
    #[error("failed to decode {type_name}: {reason}")]
    Decoding {
        /// Canonical name of the requested target type.
        type_name: String,
        /// Scheme-provided explanation.
        reason: String,
    },

    /// The allowlist rejected a type.
    #[error("type {type_name} is not allowlisted for use case {use_case}")]
    WhitelistViolation {
        /// Canonical name of the rejected type.
        type_name: String,
        /// Use-case whose allowlist rejected it.
        use_case: UseCase,
    },
}

impl SerializationError {
    pub(crate) fn encoding(type_name: impl Into<String>, reason: impl ToString) -> Self {
        Self::Encoding {
            type_name: type_name.into(),
            reason: reason.to_string(),
        }
    }

    pub(crate) fn decoding(type_name: impl Into<String>, reason: impl ToString) -> Self {
        Self::Decoding {
            type_name: type_name.into(),
            reason: reason.to_string(),
        }
    }

    /// Stable category label for logs and metrics.
    #[must_use]
    pub fn error_type(&self) -> &'static str {
        match self {
            Self::Resolution { .. } => "resolution",
            Self::Encoding { .. } => "encoding",
            Self::Decoding { .. } => "decoding",
            Self::WhitelistViolation { .. } => "whitelist",
        }
    }

    /// Whether this error is a security-relevant rejection.
    #[must_use]
    pub fn is_security_rejection(&self) -> bool { matches!(self, Self::WhitelistViolation { .. }) }
}

/// Result type used throughout the wire serialization API.
pub type Result<T> = std::result::Result<T, SerializationError>;
