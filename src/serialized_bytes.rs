//! Typed wrapper around encoded bytes.

use std::{fmt, marker::PhantomData};

use bytes::Bytes;
use serde::de::DeserializeOwned;

use crate::{context::SerializationContext, error::Result, factory::SerializationFactory};

/// Bytes produced by serializing a `T`.
///
/// The type parameter records what the bytes were produced from; it does not
/// constrain which factory or context may decode them. Cloning shares the
/// underlying buffer.
pub struct SerializedBytes<T: ?Sized> {
    bytes: Bytes,
    _type: PhantomData<fn(&T)>,
}

impl<T: ?Sized> SerializedBytes<T> {
    /// Wrap raw bytes previously produced from a `T`.
    #[must_use]
    pub fn new(bytes: impl Into<Bytes>) -> Self {
        Self {
            bytes: bytes.into(),
            _type: PhantomData,
        }
    }

    /// The encoded bytes.
    #[must_use]
    pub fn bytes(&self) -> &[u8] { &self.bytes }

    /// Encoded length in bytes.
    #[must_use]
    pub fn size(&self) -> usize { self.bytes.len() }

    /// Release the underlying buffer.
    #[must_use]
    pub fn into_bytes(self) -> Bytes { self.bytes }
}

impl<T: DeserializeOwned> SerializedBytes<T> {
    /// Decode the bytes back into a `T` through `factory` under `context`.
    ///
    /// # Errors
    ///
    /// Propagates any error from [`SerializationFactory::deserialize`].
    pub fn deserialize(
        &self,
        factory: &SerializationFactory,
        context: &SerializationContext,
    ) -> Result<T> {
        factory.deserialize(&self.bytes, context)
    }
}

impl<T: ?Sized> Clone for SerializedBytes<T> {
    fn clone(&self) -> Self { Self::new(self.bytes.clone()) }
}

impl<T: ?Sized> PartialEq for SerializedBytes<T> {
    fn eq(&self, other: &Self) -> bool { self.bytes == other.bytes }
}

impl<T: ?Sized> Eq for SerializedBytes<T> {}

impl<T: ?Sized> AsRef<[u8]> for SerializedBytes<T> {
    fn as_ref(&self) -> &[u8] { &self.bytes }
}

impl<T: ?Sized> fmt::Debug for SerializedBytes<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SerializedBytes")
            .field("type", &std::any::type_name::<T>())
            .field("size", &self.bytes.len())
            .finish()
    }
}
