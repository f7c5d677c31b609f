//! Concrete wire schemes.
//!
//! [`SerializationScheme`] is a closed set: the use-cases are fixed, so the
//! formats that serve them are known at compile time and dispatch is a
//! `match` rather than a trait object. This also keeps the generic
//! `serialize`/`deserialize` methods callable, which a `dyn` scheme could not
//! offer.
//!
//! Every message written by a bundled scheme starts with the scheme's 4-byte
//! magic, followed by the encoded canonical type name and then the encoded
//! value. The name lets the allowlist run before any payload is
//! materialised.

use bincode::{
    config::{self, Config},
    serde::{borrow_decode_from_slice, decode_from_slice, encode_to_vec},
};
use serde::{Serialize, de::DeserializeOwned};

use crate::{
    allowlist::canonical_type_name,
    config::{DECODE_ALLOCATION_LIMIT, SerializationConfig},
    context::SerializationContext,
    error::{Result, SerializationError},
};

/// Magic prefix of [`SerializationScheme::Compact`] output.
pub const COMPACT_MAGIC: [u8; 4] = *b"LWc\x01";
/// Magic prefix of [`SerializationScheme::FixedWidth`] output.
pub const FIXED_WIDTH_MAGIC: [u8; 4] = *b"LWf\x01";

/// Wire formats a [`SerializationFactory`](crate::SerializationFactory) can
/// dispatch to.
#[non_exhaustive]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SerializationScheme {
    /// `bincode` standard configuration with variable-length integers. Used
    /// for peer-to-peer and RPC traffic.
    Compact(SerializationConfig),
    /// `bincode` legacy configuration with fixed-width little-endian
    /// integers. Used for storage, where record sizes should not depend on
    /// values.
    FixedWidth(SerializationConfig),
}

impl SerializationScheme {
    /// Compact scheme with the default configuration.
    #[must_use]
    pub fn compact() -> Self { Self::Compact(SerializationConfig::default()) }

    /// Fixed-width scheme with the default configuration.
    #[must_use]
    pub fn fixed_width() -> Self { Self::FixedWidth(SerializationConfig::default()) }

    /// Stable scheme name.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Compact(_) => "compact",
            Self::FixedWidth(_) => "fixed_width",
        }
    }

    /// Magic bytes prefixed to every message this scheme writes.
    #[must_use]
    pub fn magic(&self) -> [u8; 4] {
        match self {
            Self::Compact(_) => COMPACT_MAGIC,
            Self::FixedWidth(_) => FIXED_WIDTH_MAGIC,
        }
    }

    /// Limits applied by this scheme.
    #[must_use]
    pub fn config(&self) -> SerializationConfig {
        match self {
            Self::Compact(config) | Self::FixedWidth(config) => *config,
        }
    }

    /// Encode `value`.
    ///
    /// # Errors
    ///
    /// Returns [`SerializationError::Encoding`] if the value cannot be
    /// encoded or the result exceeds the configured message size.
    pub fn serialize<T>(&self, value: &T, _context: &SerializationContext) -> Result<Vec<u8>>
    where
        T: Serialize + ?Sized,
    {
        match self {
            Self::Compact(limits) => encode_framed(COMPACT_MAGIC, value, *limits, config::standard()),
            Self::FixedWidth(limits) => {
                encode_framed(FIXED_WIDTH_MAGIC, value, *limits, config::legacy())
            }
        }
    }

    /// Decode a `T` from `bytes`, enforcing `context`'s allowlist.
    ///
    /// # Errors
    ///
    /// Returns [`SerializationError::WhitelistViolation`] if the encoded type
    /// is not admitted by `context`, and [`SerializationError::Decoding`] for
    /// oversized, foreign, truncated or mismatched input.
    pub fn deserialize<T>(&self, bytes: &[u8], context: &SerializationContext) -> Result<T>
    where
        T: DeserializeOwned,
    {
        match self {
            Self::Compact(limits) => decode_framed(
                COMPACT_MAGIC,
                bytes,
                context,
                *limits,
                config::standard().with_limit::<DECODE_ALLOCATION_LIMIT>(),
            ),
            Self::FixedWidth(limits) => decode_framed(
                FIXED_WIDTH_MAGIC,
                bytes,
                context,
                *limits,
                config::legacy().with_limit::<DECODE_ALLOCATION_LIMIT>(),
            ),
        }
    }
}

fn encode_framed<T, C>(
    magic: [u8; 4],
    value: &T,
    limits: SerializationConfig,
    config: C,
) -> Result<Vec<u8>>
where
    T: Serialize + ?Sized,
    C: Config,
{
    let type_name = canonical_type_name::<T>();
    let header =
        encode_to_vec(type_name.as_ref(), config).map_err(|e| SerializationError::encoding(&*type_name, e))?;
    let body = encode_to_vec(value, config).map_err(|e| SerializationError::encoding(&*type_name, e))?;

    let len = magic.len() + header.len() + body.len();
    let max = limits.max_message_size.get();
    if len > max {
        return Err(SerializationError::encoding(
            &*type_name,
            format!("message of {len} bytes exceeds limit of {max} bytes"),
        ));
    }

    let mut out = Vec::with_capacity(len);
    out.extend_from_slice(&magic);
    out.extend_from_slice(&header);
    out.extend_from_slice(&body);
    Ok(out)
}

fn decode_framed<T, C>(
    magic: [u8; 4],
    bytes: &[u8],
    context: &SerializationContext,
    limits: SerializationConfig,
    config: C,
) -> Result<T>
where
    T: DeserializeOwned,
    C: Config,
{
    let target = canonical_type_name::<T>();
    let max = limits.max_message_size.get();
    if bytes.len() > max {
        return Err(SerializationError::decoding(
            &*target,
            format!("message of {} bytes exceeds limit of {max} bytes", bytes.len()),
        ));
    }

    let rest = bytes
        .strip_prefix(&magic[..])
        .ok_or_else(|| SerializationError::decoding(&*target, "unrecognised scheme header"))?;
    let (encoded_name, consumed) = borrow_decode_from_slice::<&str, _>(rest, config)
        .map_err(|e| SerializationError::decoding(&*target, e))?;

    if !context.is_allowed(encoded_name) {
        return Err(SerializationError::WhitelistViolation {
            type_name: encoded_name.to_owned(),
            use_case: context.use_case(),
        });
    }
    if encoded_name != target {
        return Err(SerializationError::decoding(
            &*target,
            format!("type mismatch: message holds {encoded_name}"),
        ));
    }

    let body = &rest[consumed..];
    let (value, used) =
        decode_from_slice::<T, _>(body, config).map_err(|e| SerializationError::decoding(&*target, e))?;
    if used != body.len() {
        return Err(SerializationError::decoding(
            &*target,
            format!("{} trailing bytes after value", body.len() - used),
        ));
    }
    Ok(value)
}
