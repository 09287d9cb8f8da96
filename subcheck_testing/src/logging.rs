//! Serialized capture of log records emitted during a verification run.

use std::sync::{Mutex, MutexGuard, OnceLock};

use logtest::Logger;
use rstest::fixture;

/// Handle to the global logger with exclusive access.
///
/// The matcher forwards its `tracing` events to the `log` facade, so tests
/// assert on transport-failure warnings through this capture. Access is
/// serialized behind a mutex so concurrent test binaries do not interleave
/// each other's records.
pub struct LoggerHandle {
    guard: MutexGuard<'static, Logger>,
}

impl LoggerHandle {
    /// Acquire the global [`Logger`] instance.
    #[must_use]
    pub fn new() -> Self {
        static LOGGER: OnceLock<Mutex<Logger>> = OnceLock::new();

        let logger = LOGGER.get_or_init(|| Mutex::new(Logger::start()));
        let guard = logger.lock().expect("logger poisoned");

        Self { guard }
    }

    /// Drain any records left over from earlier assertions.
    pub fn clear(&mut self) {
        while self.guard.pop().is_some() {}
    }
}

impl Default for LoggerHandle {
    fn default() -> Self {
        Self::new()
    }
}

impl std::ops::Deref for LoggerHandle {
    type Target = Logger;

    fn deref(&self) -> &Self::Target {
        &self.guard
    }
}

impl std::ops::DerefMut for LoggerHandle {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.guard
    }
}

#[fixture]
pub fn logger() -> LoggerHandle {
    let mut handle = LoggerHandle::new();
    handle.clear();
    handle
}
