//! The checkpoint encoding.

use bincode::{
    config,
    serde::{borrow_decode_from_slice, decode_from_slice, encode_to_vec},
};
use serde::{Serialize, de::DeserializeOwned};

use super::{
    context::CheckpointSerializationContext,
    error::{CheckpointSerializationError, Result},
};
use crate::allowlist::canonical_type_name;

/// Magic prefix of every checkpoint.
pub const CHECKPOINT_MAGIC: [u8; 4] = *b"LWk\x01";

/// Ceiling on memory a single restore may claim for strings and containers,
/// in bytes. Input size itself is not bounded.
pub const CHECKPOINT_ALLOCATION_LIMIT: usize = 1 << 30;

/// Encodes checkpoints as the magic, the canonical type name, then the value,
/// all with `bincode`'s standard configuration.
///
/// No size bound and no allowlist apply. Restores refuse to claim more than
/// [`CHECKPOINT_ALLOCATION_LIMIT`] bytes, so a corrupt length prefix is
/// reported as [`CheckpointSerializationError::Malformed`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CheckpointSerializer;

impl CheckpointSerializer {
    /// Capture `value`.
    ///
    /// # Errors
    ///
    /// Returns [`CheckpointSerializationError::UnsupportedType`] if any part of
    /// the value refuses to be encoded.
    pub fn serialize<T>(&self, value: &T, _context: &CheckpointSerializationContext) -> Result<Vec<u8>>
    where
        T: Serialize + ?Sized,
    {
        let type_name = canonical_type_name::<T>();
        let unsupported = |reason: bincode::error::EncodeError| {
            CheckpointSerializationError::UnsupportedType {
                type_name: type_name.clone().into_owned(),
                reason: reason.to_string(),
            }
        };
        let header = encode_to_vec(type_name.as_ref(), config::standard()).map_err(unsupported)?;
        let body = encode_to_vec(value, config::standard()).map_err(unsupported)?;

        let mut out = Vec::with_capacity(CHECKPOINT_MAGIC.len() + header.len() + body.len());
        out.extend_from_slice(&CHECKPOINT_MAGIC);
        out.extend_from_slice(&header);
        out.extend_from_slice(&body);
        Ok(out)
    }

    /// Restore a `T` from `bytes`.
    ///
    /// # Errors
    ///
    /// Returns [`CheckpointSerializationError::TypeMismatch`] if the
    /// checkpoint holds another type and
    /// [`CheckpointSerializationError::Malformed`] for corrupt input.
    pub fn deserialize<T>(&self, bytes: &[u8], _context: &CheckpointSerializationContext) -> Result<T>
    where
        T: DeserializeOwned,
    {
        let expected = canonical_type_name::<T>();
        let malformed = |reason: String| CheckpointSerializationError::Malformed {
            type_name: expected.clone().into_owned(),
            reason,
        };

        let rest = bytes
            .strip_prefix(&CHECKPOINT_MAGIC[..])
            .ok_or_else(|| malformed("missing checkpoint header".to_owned()))?;
        let config = config::standard().with_limit::<CHECKPOINT_ALLOCATION_LIMIT>();
        let (found, consumed) = borrow_decode_from_slice::<&str, _>(rest, config)
            .map_err(|e| malformed(e.to_string()))?;
        if found != expected {
            return Err(CheckpointSerializationError::TypeMismatch {
                expected: expected.into_owned(),
                found: found.to_owned(),
            });
        }

        let body = &rest[consumed..];
        let (value, used) = decode_from_slice::<T, _>(body, config)
            .map_err(|e| malformed(e.to_string()))?;
        if used != body.len() {
            return Err(malformed(format!("{} trailing bytes after value", body.len() - used)));
        }
        Ok(value)
    }
}
