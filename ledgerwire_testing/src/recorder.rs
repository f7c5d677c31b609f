//! Values that report the ambient state visible while they are encoded.

use std::sync::{Arc, Mutex, PoisonError};

use ledgerwire::{SerializationContext, SerializationFactory, UseCase};
use serde::{Serialize, Serializer, ser::Error as _};

/// What an [`AmbientRecorder`] saw during one encode.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AmbientSnapshot {
    /// Result of [`SerializationFactory::current_factory`].
    pub factory: Option<SerializationFactory>,
    /// Result of `current_context` on the observed factory.
    pub context: Option<SerializationContext>,
}

/// Nested work an [`AmbientRecorder`] performs while being encoded.
#[derive(Clone, Debug)]
pub struct NestedCall {
    /// Factory used for the nested call.
    pub factory: SerializationFactory,
    /// Context used for the nested call.
    pub context: SerializationContext,
    /// Recorder encoded by the nested call.
    pub recorder: AmbientRecorder,
}

/// Serializable value recording ambient state each time it is encoded.
///
/// The recorder snapshots the ambient factory and context, optionally performs
/// a nested serialize call, then snapshots again. It encodes as the number
/// of bytes the nested call produced, so it round-trips as a `u64`.
#[derive(Clone, Debug, Default)]
pub struct AmbientRecorder {
    before: Arc<Mutex<Vec<AmbientSnapshot>>>,
    after: Arc<Mutex<Vec<AmbientSnapshot>>>,
    nested: Option<Box<NestedCall>>,
    fail_with: Option<&'static str>,
}

impl AmbientRecorder {
    /// Create a recorder that performs no nested work.
    #[must_use]
    pub fn new() -> Self { Self::default() }

    /// Serialize `recorder` through `factory` under `context` while encoding.
    #[must_use]
    pub fn nesting(
        mut self,
        factory: SerializationFactory,
        context: SerializationContext,
        recorder: AmbientRecorder,
    ) -> Self {
        self.nested = Some(Box::new(NestedCall {
            factory,
            context,
            recorder,
        }));
        self
    }

    /// Fail encoding with `message` after taking the first snapshot.
    #[must_use]
    pub fn failing(mut self, message: &'static str) -> Self {
        self.fail_with = Some(message);
        self
    }

    /// Snapshots taken on entry to each encode.
    #[must_use]
    pub fn seen_before(&self) -> Vec<AmbientSnapshot> { snapshots(&self.before) }

    /// Snapshots taken after any nested call returned.
    #[must_use]
    pub fn seen_after(&self) -> Vec<AmbientSnapshot> { snapshots(&self.after) }

    /// The nested recorder, if any.
    #[must_use]
    pub fn nested_recorder(&self) -> Option<&AmbientRecorder> {
        self.nested.as_ref().map(|nested| &nested.recorder)
    }
}

impl Serialize for AmbientRecorder {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        record(&self.before);
        if let Some(message) = self.fail_with {
            return Err(S::Error::custom(message));
        }
        let mut nested_len = 0_u64;
        if let Some(nested) = &self.nested {
            let bytes = nested
                .factory
                .serialize(&nested.recorder, &nested.context)
                .map_err(S::Error::custom)?;
            nested_len = u64::try_from(bytes.size()).map_err(S::Error::custom)?;
        }
        record(&self.after);
        serializer.serialize_u64(nested_len)
    }
}

/// Snapshot the ambient state of the calling thread.
#[must_use]
pub fn snapshot() -> AmbientSnapshot {
    let factory = SerializationFactory::current_factory();
    let context = factory.as_ref().and_then(SerializationFactory::current_context);
    AmbientSnapshot { factory, context }
}

/// Whether no wire call is in progress on the calling thread.
#[must_use]
pub fn ambient_is_clear() -> bool {
    SerializationFactory::current_factory().is_none()
        && SerializationFactory::default_factory()
            .current_context()
            .is_none()
}

/// Use-case of a snapshot's context, for compact assertions.
#[must_use]
pub fn snapshot_use_case(snapshot: &AmbientSnapshot) -> Option<UseCase> {
    snapshot.context.as_ref().map(SerializationContext::use_case)
}

fn record(target: &Mutex<Vec<AmbientSnapshot>>) {
    target
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .push(snapshot());
}

fn snapshots(source: &Mutex<Vec<AmbientSnapshot>>) -> Vec<AmbientSnapshot> {
    source
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .clone()
}
