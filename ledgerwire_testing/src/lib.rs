//! Test utilities for the `ledgerwire` crate.
//!
//! Provides log capture, `rstest` fixtures for the canonical factories and
//! contexts, and [`AmbientRecorder`], a value that records the ambient
//! factory and context visible while it is being encoded.

pub mod fixtures;
pub mod logging;
pub mod recorder;

pub use fixtures::{
    assert_no_ambient_state,
    defaults,
    locked_down_context,
    on_fresh_thread,
    p2p_context,
    private_factory,
    storage_context,
    wire_factory,
};
pub use logging::{LoggerHandle, logger};
pub use recorder::{AmbientRecorder, AmbientSnapshot, NestedCall, ambient_is_clear, snapshot, snapshot_use_case};

/// Result type for fallible tests.
pub type TestResult<T = ()> = Result<T, Box<dyn std::error::Error + Send + Sync>>;
