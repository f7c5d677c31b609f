//! Free-function entry points taking the factory and context explicitly.
//!
//! ```
//! use ledgerwire::{SerializationDefaults, deserialize, serialize};
//!
//! let defaults = SerializationDefaults::instance();
//! let factory = defaults.serialization_factory();
//! for context in [
//!     defaults.p2p_context(),
//!     defaults.rpc_server_context(),
//!     defaults.rpc_client_context(),
//!     defaults.storage_context(),
//! ] {
//!     let bytes = serialize(&42_u64, factory, context).expect("encode");
//!     let value: u64 = deserialize(bytes.bytes(), factory, context).expect("decode");
//!     assert_eq!(value, 42);
//! }
//! ```

use serde::{Serialize, de::DeserializeOwned};

use crate::{
    context::SerializationContext,
    error::Result,
    factory::SerializationFactory,
    serialized_bytes::SerializedBytes,
};

/// Serialize `value` through `factory` under `context`.
///
/// # Errors
///
/// See [`SerializationFactory::serialize`].
pub fn serialize<T>(
    value: &T,
    factory: &SerializationFactory,
    context: &SerializationContext,
) -> Result<SerializedBytes<T>>
where
    T: Serialize + ?Sized,
{
    factory.serialize(value, context)
}

/// Deserialize a `T` from `bytes` through `factory` under `context`.
///
/// # Errors
///
/// See [`SerializationFactory::deserialize`].
pub fn deserialize<T>(
    bytes: &[u8],
    factory: &SerializationFactory,
    context: &SerializationContext,
) -> Result<T>
where
    T: DeserializeOwned,
{
    factory.deserialize(bytes, context)
}
