//! Limits applied by the bundled wire schemes.

use std::num::NonZeroUsize;

/// Default upper bound on a serialized message, in bytes (10 MiB).
pub const DEFAULT_MAX_MESSAGE_SIZE: NonZeroUsize = match NonZeroUsize::new(10 * 1024 * 1024) {
    Some(size) => size,
    None => unreachable!(),
};

/// Ceiling on memory a single wire decode may claim for strings and
/// containers, in bytes.
///
/// Claims are checked against this before anything is allocated, so a
/// forged length prefix fails as a decoding error. Compact integers can
/// expand up to eightfold in memory, hence the multiplier.
pub const DECODE_ALLOCATION_LIMIT: usize = 8 * DEFAULT_MAX_MESSAGE_SIZE.get();

/// Settings shared by the wire schemes built into a factory.
///
/// ```
/// use std::num::NonZeroUsize;
///
/// use ledgerwire::SerializationConfig;
///
/// let limit = NonZeroUsize::new(4096).expect("non-zero");
/// let config = SerializationConfig::default().with_max_message_size(limit);
/// assert_eq!(config.max_message_size.get(), 4096);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SerializationConfig {
    /// Largest encoded message, header included, a scheme will emit or
    /// accept.
    pub max_message_size: NonZeroUsize,
}

impl SerializationConfig {
    /// Create a configuration with the given message bound.
    #[must_use]
    pub const fn new(max_message_size: NonZeroUsize) -> Self { Self { max_message_size } }

    /// Replace the message bound.
    #[must_use]
    pub const fn with_max_message_size(mut self, max_message_size: NonZeroUsize) -> Self {
        self.max_message_size = max_message_size;
        self
    }
}

impl Default for SerializationConfig {
    fn default() -> Self { Self::new(DEFAULT_MAX_MESSAGE_SIZE) }
}
