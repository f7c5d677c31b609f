//! Metric helpers for `ledgerwire`.
//!
//! This module defines metric names and simple helper functions
//! wrapping the [`metrics`](https://docs.rs/metrics) crate. With the
//! `metrics` feature disabled the helpers do nothing.

#[cfg(feature = "metrics")]
use metrics::counter;

use crate::use_case::UseCase;

/// Name of the counter tracking successful wire operations.
pub const OPERATIONS_TOTAL: &str = "ledgerwire_operations_total";
/// Name of the counter tracking wire serialization failures.
pub const ERRORS_TOTAL: &str = "ledgerwire_errors_total";
/// Name of the counter tracking checkpoint operations.
pub const CHECKPOINTS_TOTAL: &str = "ledgerwire_checkpoints_total";

/// Direction of a serialization call.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Operation {
    /// Value to bytes.
    Serialize,
    /// Bytes to value.
    Deserialize,
}

impl Operation {
    /// Label used for the `operation` dimension.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Operation::Serialize => "serialize",
            Operation::Deserialize => "deserialize",
        }
    }
}

/// Record a successful wire operation for `use_case`.
pub fn inc_operations(use_case: UseCase, operation: Operation) {
    #[cfg(feature = "metrics")]
    {
        counter!(
            OPERATIONS_TOTAL,
            "use_case" => use_case.as_str(),
            "operation" => operation.as_str()
        )
        .increment(1);
    }
    #[cfg(not(feature = "metrics"))]
    let _ = (use_case, operation);
}

/// Record a wire serialization failure of the given `kind`.
pub fn inc_errors(kind: &'static str) {
    #[cfg(feature = "metrics")]
    {
        counter!(ERRORS_TOTAL, "kind" => kind).increment(1);
    }
    #[cfg(not(feature = "metrics"))]
    let _ = kind;
}

/// Record a checkpoint operation.
pub fn inc_checkpoints(operation: Operation) {
    #[cfg(feature = "metrics")]
    {
        counter!(CHECKPOINTS_TOTAL, "operation" => operation.as_str()).increment(1);
    }
    #[cfg(not(feature = "metrics"))]
    let _ = operation;
}
