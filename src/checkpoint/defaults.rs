//! Canonical checkpoint context and factory.

use std::sync::OnceLock;

use super::{
    context::CheckpointSerializationContext,
    factory::CheckpointSerializationFactory,
    serializer::CheckpointSerializer,
};

/// Process-wide checkpoint context and factory, independent of
/// [`SerializationDefaults`](crate::SerializationDefaults).
#[derive(Debug)]
pub struct CheckpointSerializationDefaults {
    checkpoint_context: CheckpointSerializationContext,
    checkpoint_serialization_factory: CheckpointSerializationFactory,
}

impl CheckpointSerializationDefaults {
    /// The process-wide table.
    #[must_use]
    pub fn instance() -> &'static CheckpointSerializationDefaults {
        static INSTANCE: OnceLock<CheckpointSerializationDefaults> = OnceLock::new();
        INSTANCE.get_or_init(|| Self {
            checkpoint_context: CheckpointSerializationContext::new(),
            checkpoint_serialization_factory: CheckpointSerializationFactory::new(
                CheckpointSerializer,
            ),
        })
    }

    /// Context used by [`checkpoint_serialize`](super::checkpoint_serialize).
    #[must_use]
    pub fn checkpoint_context(&self) -> &CheckpointSerializationContext { &self.checkpoint_context }

    /// Factory used by [`checkpoint_serialize`](super::checkpoint_serialize).
    #[must_use]
    pub fn checkpoint_serialization_factory(&self) -> &CheckpointSerializationFactory {
        &self.checkpoint_serialization_factory
    }
}
