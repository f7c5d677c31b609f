//! Thread-local scope stacks backing the "current factory/context" queries.
//!
//! Each serialization path declares its own `thread_local!` stack and pushes
//! a frame through [`ScopeGuard::push`] for the dynamic extent of a call.
//! Dropping the guard truncates the stack back to the depth observed at
//! entry, so the state seen by a caller after any call returns, or unwinds,
//! is exactly the state it had before the call.

use std::{cell::RefCell, marker::PhantomData, thread::LocalKey};

/// Thread-local storage for one path's frames.
pub(crate) type ScopeStack<T> = RefCell<Vec<T>>;

/// Serialization path owning a call.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum CallPath {
    Wire,
    Checkpoint,
}

thread_local! {
    // Shared by both paths so either can tell whose call is innermost.
    static CALL_PATHS: ScopeStack<CallPath> = const { RefCell::new(Vec::new()) };
}

/// A pushed frame together with its path marker.
#[must_use = "the frame is popped as soon as the scope is dropped"]
pub(crate) struct CallScope<T: 'static> {
    _frame: ScopeGuard<T>,
    _path: ScopeGuard<CallPath>,
}

/// Push `frame` onto `stack` and mark `path` as owning the innermost call.
pub(crate) fn enter<T>(
    stack: &'static LocalKey<ScopeStack<T>>,
    frame: T,
    path: CallPath,
) -> CallScope<T> {
    CallScope {
        _frame: ScopeGuard::push(stack, frame),
        _path: ScopeGuard::push(&CALL_PATHS, path),
    }
}

/// Path of the innermost call in progress on this thread, if any.
pub(crate) fn innermost_path() -> Option<CallPath> {
    query(&CALL_PATHS, |paths| paths.last().copied())
}

/// Pops the frame it pushed, and anything pushed above it, on drop.
///
/// Guards are neither `Send` nor `Sync`: a frame belongs to the thread whose
/// stack it was pushed on.
#[must_use = "the frame is popped as soon as the guard is dropped"]
pub(crate) struct ScopeGuard<T: 'static> {
    stack: &'static LocalKey<ScopeStack<T>>,
    depth: usize,
    _not_send: PhantomData<*const ()>,
}

impl<T: 'static> ScopeGuard<T> {
    /// Push `frame` onto `stack`.
    pub(crate) fn push(stack: &'static LocalKey<ScopeStack<T>>, frame: T) -> Self {
        let depth = stack.with(|frames| {
            let mut frames = frames.borrow_mut();
            let depth = frames.len();
            frames.push(frame);
            depth
        });
        Self {
            stack,
            depth,
            _not_send: PhantomData,
        }
    }
}

impl<T: 'static> Drop for ScopeGuard<T> {
    fn drop(&mut self) {
        let depth = self.depth;
        // The stack may already be gone during thread teardown.
        let _ = self.stack.try_with(|frames| {
            let released = {
                let mut frames = frames.borrow_mut();
                if frames.len() > depth {
                    frames.split_off(depth)
                } else {
                    Vec::new()
                }
            };
            drop(released);
        });
    }
}

/// Run `query` against the frames currently on `stack`, innermost last.
///
/// Returns `None` when the stack is inaccessible or `query` finds nothing.
pub(crate) fn query<T, R>(
    stack: &'static LocalKey<ScopeStack<T>>,
    query: impl FnOnce(&[T]) -> Option<R>,
) -> Option<R> {
    stack
        .try_with(|frames| query(&frames.borrow()))
        .ok()
        .flatten()
}

/// Apply `update` to the innermost frame, if any.
pub(crate) fn update_innermost<T>(
    stack: &'static LocalKey<ScopeStack<T>>,
    update: impl FnOnce(&mut T),
) {
    let _ = stack.try_with(|frames| {
        if let Some(frame) = frames.borrow_mut().last_mut() {
            update(frame);
        }
    });
}

#[cfg(test)]
mod tests {
    use std::panic::{AssertUnwindSafe, catch_unwind};

    use super::*;

    thread_local! {
        static FRAMES: ScopeStack<u32> = const { RefCell::new(Vec::new()) };
    }

    fn innermost() -> Option<u32> { query(&FRAMES, |frames| frames.last().copied()) }

    #[test]
    fn nested_guards_unwind_in_order() {
        assert_eq!(innermost(), None);
        {
            let _outer = ScopeGuard::push(&FRAMES, 1);
            assert_eq!(innermost(), Some(1));
            {
                let _inner = ScopeGuard::push(&FRAMES, 2);
                assert_eq!(innermost(), Some(2));
            }
            assert_eq!(innermost(), Some(1));
        }
        assert_eq!(innermost(), None);
    }

    #[test]
    fn leaked_inner_guard_is_cleared_by_outer() {
        {
            let _outer = ScopeGuard::push(&FRAMES, 1);
            std::mem::forget(ScopeGuard::push(&FRAMES, 2));
            assert_eq!(innermost(), Some(2));
        }
        assert_eq!(innermost(), None);
    }

    #[test]
    fn unwinding_releases_frames() {
        let result = catch_unwind(AssertUnwindSafe(|| {
            let _guard = ScopeGuard::push(&FRAMES, 9);
            panic!("boom");
        }));
        assert!(result.is_err());
        assert_eq!(innermost(), None);
    }

    #[test]
    fn update_touches_only_the_innermost_frame() {
        let _outer = ScopeGuard::push(&FRAMES, 1);
        let _inner = ScopeGuard::push(&FRAMES, 2);
        update_innermost(&FRAMES, |frame| *frame += 40);
        assert_eq!(query(&FRAMES, |frames| Some(frames.to_vec())), Some(vec![1, 42]));
    }

    #[test]
    fn innermost_path_follows_nesting() {
        assert_eq!(innermost_path(), None);
        {
            let _wire = enter(&FRAMES, 1, CallPath::Wire);
            assert_eq!(innermost_path(), Some(CallPath::Wire));
            {
                let _checkpoint = enter(&FRAMES, 2, CallPath::Checkpoint);
                assert_eq!(innermost_path(), Some(CallPath::Checkpoint));
                assert_eq!(innermost(), Some(2));
            }
            assert_eq!(innermost_path(), Some(CallPath::Wire));
        }
        assert_eq!(innermost_path(), None);
        assert_eq!(innermost(), None);
    }

    #[test]
    fn stacks_are_per_thread() {
        let _guard = ScopeGuard::push(&FRAMES, 5);
        let seen = std::thread::spawn(innermost).join().expect("thread panicked");
        assert_eq!(seen, None);
        assert_eq!(innermost(), Some(5));
    }
}
