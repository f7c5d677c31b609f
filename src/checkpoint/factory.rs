//! Factory and ambient state for the checkpoint path.
//!
//! This mirrors the wire [`SerializationFactory`](crate::SerializationFactory)
//! but shares none of its state: a separate thread-local stack, a separate
//! serializer and separate defaults.

use std::{cell::RefCell, fmt, sync::Arc};

use log::warn;
use serde::{Serialize, de::DeserializeOwned};

use super::{
    context::CheckpointSerializationContext,
    defaults::CheckpointSerializationDefaults,
    error::Result,
    serializer::CheckpointSerializer,
};
use crate::{
    ambient::{self, CallPath, CallScope, ScopeStack},
    metrics::{self, Operation},
    serialized_bytes::SerializedBytes,
};

struct CheckpointFrame {
    factory: CheckpointSerializationFactory,
    context: CheckpointSerializationContext,
}

thread_local! {
    static CHECKPOINT_SCOPE: ScopeStack<CheckpointFrame> = const { RefCell::new(Vec::new()) };
}

/// Mediates checkpoint serialization calls.
#[derive(Clone)]
pub struct CheckpointSerializationFactory {
    serializer: Arc<CheckpointSerializer>,
}

impl CheckpointSerializationFactory {
    /// Create a factory backed by `serializer`.
    #[must_use]
    pub fn new(serializer: CheckpointSerializer) -> Self {
        Self {
            serializer: Arc::new(serializer),
        }
    }

    /// Factory of the innermost checkpoint call on this thread, if any.
    #[must_use]
    pub fn current_factory() -> Option<CheckpointSerializationFactory> {
        ambient::query(&CHECKPOINT_SCOPE, |frames| {
            frames.last().map(|frame| frame.factory.clone())
        })
    }

    /// The process-wide checkpoint factory.
    #[must_use]
    pub fn default_factory() -> CheckpointSerializationFactory {
        CheckpointSerializationDefaults::instance()
            .checkpoint_serialization_factory()
            .clone()
    }

    /// Context of the innermost checkpoint call on this thread through this
    /// factory, if any.
    #[must_use]
    pub fn current_context(&self) -> Option<CheckpointSerializationContext> {
        ambient::query(&CHECKPOINT_SCOPE, |frames| {
            frames
                .iter()
                .rev()
                .find(|frame| frame.factory == *self)
                .map(|frame| frame.context.clone())
        })
    }

    /// Run `f` with this factory and `context` installed as ambient state.
    pub fn with_current_context<R>(
        &self,
        context: &CheckpointSerializationContext,
        f: impl FnOnce() -> R,
    ) -> R {
        let _scope = self.enter(context);
        f()
    }

    /// Capture `value`.
    ///
    /// # Errors
    ///
    /// See [`CheckpointSerializer::serialize`].
    pub fn serialize<T>(
        &self,
        value: &T,
        context: &CheckpointSerializationContext,
    ) -> Result<SerializedBytes<T>>
    where
        T: Serialize + ?Sized,
    {
        let result = {
            let _scope = self.enter(context);
            self.serializer.serialize(value, context)
        };
        match result {
            Ok(bytes) => {
                metrics::inc_checkpoints(Operation::Serialize);
                Ok(SerializedBytes::new(bytes))
            }
            Err(err) => {
                warn!("checkpoint capture failed: error={err}");
                Err(err)
            }
        }
    }

    /// Restore a `T`.
    ///
    /// # Errors
    ///
    /// See [`CheckpointSerializer::deserialize`].
    pub fn deserialize<T>(&self, bytes: &[u8], context: &CheckpointSerializationContext) -> Result<T>
    where
        T: DeserializeOwned,
    {
        let result = {
            let _scope = self.enter(context);
            self.serializer.deserialize(bytes, context)
        };
        match result {
            Ok(value) => {
                metrics::inc_checkpoints(Operation::Deserialize);
                Ok(value)
            }
            Err(err) => {
                warn!("checkpoint restore failed: error={err}");
                Err(err)
            }
        }
    }

    fn enter(&self, context: &CheckpointSerializationContext) -> CallScope<CheckpointFrame> {
        ambient::enter(
            &CHECKPOINT_SCOPE,
            CheckpointFrame {
                factory: self.clone(),
                context: context.clone(),
            },
            CallPath::Checkpoint,
        )
    }
}

impl PartialEq for CheckpointSerializationFactory {
    fn eq(&self, other: &Self) -> bool { Arc::ptr_eq(&self.serializer, &other.serializer) }
}

impl Eq for CheckpointSerializationFactory {}

impl fmt::Debug for CheckpointSerializationFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CheckpointSerializationFactory")
            .field("serializer", &self.serializer)
            .finish()
    }
}
