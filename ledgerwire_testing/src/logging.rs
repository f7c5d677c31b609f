use std::sync::{Mutex, MutexGuard, OnceLock, PoisonError};

use logtest::{Logger, Record};
use rstest::fixture;

/// Handle to the global logger with exclusive access.
///
/// This guard ensures tests do not interfere with each other's log capture by
/// serialising access to a [`logtest::Logger`].
pub struct LoggerHandle {
    guard: MutexGuard<'static, Logger>,
}

impl LoggerHandle {
    /// Acquire the global [`Logger`] instance.
    ///
    /// A logger poisoned by a failed test is still usable; its queue is
    /// drained before the handle is returned.
    pub fn new() -> Self {
        static LOGGER: OnceLock<Mutex<Logger>> = OnceLock::new();

        let logger = LOGGER.get_or_init(|| Mutex::new(Logger::start()));
        let guard = logger.lock().unwrap_or_else(PoisonError::into_inner);

        let mut handle = Self { guard };
        handle.clear();
        handle
    }

    /// Discard every captured record.
    pub fn clear(&mut self) { while self.guard.pop().is_some() {} }

    /// Drain captured records, keeping those at `level` whose message
    /// contains `needle`.
    pub fn drain_matching(&mut self, level: log::Level, needle: &str) -> Vec<Record> {
        let mut matching = Vec::new();
        while let Some(record) = self.guard.pop() {
            if record.level() == level && record.args().contains(needle) {
                matching.push(record);
            }
        }
        matching
    }
}

impl Default for LoggerHandle {
    fn default() -> Self { Self::new() }
}

impl std::ops::Deref for LoggerHandle {
    type Target = Logger;

    fn deref(&self) -> &Self::Target { &self.guard }
}

impl std::ops::DerefMut for LoggerHandle {
    fn deref_mut(&mut self) -> &mut Self::Target { &mut self.guard }
}

#[allow(
    unused_braces,
    reason = "rustc false positive for single line rstest fixtures"
)]
#[fixture]
pub fn logger() -> LoggerHandle { LoggerHandle::new() }
