//! `rstest` fixtures for the canonical factories and contexts.
#![allow(
    unused_braces,
    reason = "rustc false positive for single line rstest fixtures"
)]

use std::thread;

use ledgerwire::{
    SerializationContext,
    SerializationDefaults,
    SerializationFactory,
    TypeAllowlist,
    UseCase,
};
use rstest::fixture;

/// The process-wide defaults table.
#[fixture]
pub fn defaults() -> &'static SerializationDefaults { SerializationDefaults::instance() }

/// A clone of the canonical factory.
#[fixture]
pub fn wire_factory() -> SerializationFactory { SerializationFactory::default_factory() }

/// A factory distinct from the canonical one but serving the same use-cases.
#[fixture]
pub fn private_factory() -> SerializationFactory {
    SerializationFactory::builder(SerializationContext::for_use_case(UseCase::P2p))
        .with_standard_schemes()
        .build()
}

/// The canonical P2P context.
#[fixture]
pub fn p2p_context() -> SerializationContext { SerializationDefaults::instance().p2p_context().clone() }

/// The canonical storage context.
#[fixture]
pub fn storage_context() -> SerializationContext {
    SerializationDefaults::instance().storage_context().clone()
}

/// A P2P context whose allowlist is empty.
#[fixture]
pub fn locked_down_context() -> SerializationContext {
    SerializationContext::new(UseCase::P2p, TypeAllowlist::empty())
}

/// Run `f` on a fresh thread and return its result.
///
/// # Panics
///
/// Re-raises any panic from `f` on the calling thread.
pub fn on_fresh_thread<R, F>(f: F) -> R
where
    F: FnOnce() -> R + Send + 'static,
    R: Send + 'static,
{
    match thread::spawn(f).join() {
        Ok(value) => value,
        Err(payload) => std::panic::resume_unwind(payload),
    }
}

/// Assert that no wire call is in progress on this thread.
///
/// # Panics
///
/// Panics if either ambient query reports state.
#[track_caller]
pub fn assert_no_ambient_state() {
    assert!(
        SerializationFactory::current_factory().is_none(),
        "an ambient factory is still installed"
    );
    assert!(
        SerializationFactory::default_factory()
            .current_context()
            .is_none(),
        "the canonical factory still reports a context"
    );
}
