//! Serialization of suspended-computation checkpoints.
//!
//! Checkpoints are captured and restored by the node that owns them, so
//! they follow a different trust model from wire traffic: no allowlist and
//! no size bound. This path is kept entirely separate from
//! [`SerializationFactory`](crate::SerializationFactory). It never reads or
//! writes the wire ambient state, and the common case needs no explicit
//! context.
//!
//! ```
//! use ledgerwire::{
//!     SerializationFactory,
//!     checkpoint::{checkpoint_deserialize, checkpoint_serialize},
//! };
//!
//! let bytes = checkpoint_serialize("hello").expect("capture");
//! let restored: String = checkpoint_deserialize(bytes.bytes()).expect("restore");
//! assert_eq!(restored, "hello");
//! assert!(SerializationFactory::current_factory().is_none());
//! ```

mod context;
mod defaults;
mod error;
mod factory;
mod serializer;

use serde::{Serialize, Serializer, de::DeserializeOwned, ser::Error as _};

pub use context::CheckpointSerializationContext;
pub use defaults::CheckpointSerializationDefaults;
pub use error::{CheckpointSerializationError, Result};
pub use factory::CheckpointSerializationFactory;
pub use serializer::{CHECKPOINT_ALLOCATION_LIMIT, CHECKPOINT_MAGIC, CheckpointSerializer};

use crate::serialized_bytes::SerializedBytes;

/// Capture `value` with the default checkpoint context and factory.
///
/// # Errors
///
/// Returns [`CheckpointSerializationError::UnsupportedType`] if the value
/// graph holds something that cannot be captured.
pub fn checkpoint_serialize<T>(value: &T) -> Result<SerializedBytes<T>>
where
    T: Serialize + ?Sized,
{
    checkpoint_serialize_with(value, CheckpointSerializationDefaults::instance().checkpoint_context())
}

/// Capture `value` under `context` with the default checkpoint factory.
///
/// # Errors
///
/// See [`checkpoint_serialize`].
pub fn checkpoint_serialize_with<T>(
    value: &T,
    context: &CheckpointSerializationContext,
) -> Result<SerializedBytes<T>>
where
    T: Serialize + ?Sized,
{
    CheckpointSerializationDefaults::instance()
        .checkpoint_serialization_factory()
        .serialize(value, context)
}

/// Restore a `T` with the default checkpoint context and factory.
///
/// # Errors
///
/// Returns [`CheckpointSerializationError::TypeMismatch`] or
/// [`CheckpointSerializationError::Malformed`] for unusable input.
pub fn checkpoint_deserialize<T>(bytes: &[u8]) -> Result<T>
where
    T: DeserializeOwned,
{
    checkpoint_deserialize_with(bytes, CheckpointSerializationDefaults::instance().checkpoint_context())
}

/// Restore a `T` under `context` with the default checkpoint factory.
///
/// # Errors
///
/// See [`checkpoint_deserialize`].
pub fn checkpoint_deserialize_with<T>(bytes: &[u8], context: &CheckpointSerializationContext) -> Result<T>
where
    T: DeserializeOwned,
{
    CheckpointSerializationDefaults::instance()
        .checkpoint_serialization_factory()
        .deserialize(bytes, context)
}

/// `serialize_with` helper for fields that must never be captured.
///
/// Checkpointing a value containing such a field fails with
/// [`CheckpointSerializationError::UnsupportedType`] instead of silently
/// dropping the field.
///
/// ```
/// use ledgerwire::checkpoint::{CheckpointSerializationError, checkpoint_serialize};
///
/// struct Socket;
///
/// #[derive(serde::Serialize)]
/// struct Session {
///     peer: String,
///     #[serde(serialize_with = "ledgerwire::checkpoint::not_checkpointable")]
///     socket: Socket,
/// }
///
/// let session = Session {
///     peer: "bank-a".into(),
///     socket: Socket,
/// };
/// assert!(matches!(
///     checkpoint_serialize(&session),
///     Err(CheckpointSerializationError::UnsupportedType { .. })
/// ));
/// ```
///
/// # Errors
///
/// Always returns an error naming `T`.
pub fn not_checkpointable<T, S>(_value: &T, _serializer: S) -> std::result::Result<S::Ok, S::Error>
where
    T: ?Sized,
    S: Serializer,
{
    Err(S::Error::custom(format_args!(
        "{} holds a live resource and cannot be checkpointed",
        std::any::type_name::<T>()
    )))
}
