//! Configuration for one checkpoint operation.

use std::{collections::BTreeMap, fmt, sync::Arc};

use crate::{context::PropertyValue, use_case::UseCase};

/// Immutable environment for checkpoint serialization.
///
/// Unlike wire contexts there is no allowlist: checkpoints are written and
/// read by the same node and may contain arbitrary application state.
/// Identity semantics match [`SerializationContext`](crate::SerializationContext).
#[derive(Clone)]
pub struct CheckpointSerializationContext {
    properties: Arc<BTreeMap<String, PropertyValue>>,
}

impl CheckpointSerializationContext {
    /// Create a context with no properties.
    #[must_use]
    pub fn new() -> Self {
        Self {
            properties: Arc::new(BTreeMap::new()),
        }
    }

    /// Always [`UseCase::Checkpoint`].
    #[must_use]
    pub fn use_case(&self) -> UseCase { UseCase::Checkpoint }

    /// Look up the property stored under `key`.
    #[must_use]
    pub fn property(&self, key: &str) -> Option<&PropertyValue> { self.properties.get(key) }

    /// All properties, ordered by key.
    #[must_use]
    pub fn properties(&self) -> &BTreeMap<String, PropertyValue> { &self.properties }

    /// Derive a context with `key` set to `value`.
    #[must_use]
    pub fn with_property(&self, key: impl Into<String>, value: impl Into<PropertyValue>) -> Self {
        let mut properties = (*self.properties).clone();
        properties.insert(key.into(), value.into());
        Self {
            properties: Arc::new(properties),
        }
    }
}

impl Default for CheckpointSerializationContext {
    fn default() -> Self { Self::new() }
}

impl PartialEq for CheckpointSerializationContext {
    fn eq(&self, other: &Self) -> bool { Arc::ptr_eq(&self.properties, &other.properties) }
}

impl Eq for CheckpointSerializationContext {}

impl fmt::Debug for CheckpointSerializationContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CheckpointSerializationContext")
            .field("properties", &self.properties)
            .finish()
    }
}
