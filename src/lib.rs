#![doc(html_root_url = "https://docs.rs/ledgerwire/latest")]
//! Public API for the `ledgerwire` library.
//!
//! This crate turns in-memory values into bytes and back across the trust
//! boundaries of a distributed ledger node: peer-to-peer messages, RPC
//! server and client payloads, and durable storage. A separate
//! [`checkpoint`] path captures suspended computations.
//!
//! Every wire call names its [`SerializationFactory`] and
//! [`SerializationContext`] explicitly. For the duration of the call both are
//! visible to nested code as thread-local ambient state.

mod ambient;
pub mod allowlist;
pub mod api;
pub mod checkpoint;
pub mod config;
pub mod context;
pub mod defaults;
pub mod error;
pub mod factory;
pub mod metrics;
pub mod scheme;
pub mod serialized_bytes;
pub mod use_case;

pub use allowlist::{AllowAll, AllowlistPolicy, TypeAllowlist, canonical_type_name};
pub use api::{deserialize, serialize};
pub use config::SerializationConfig;
pub use context::{PropertyValue, SerializationContext};
pub use defaults::SerializationDefaults;
pub use error::{Result, SerializationError};
pub use factory::{SerializationFactory, SerializationFactoryBuilder, ensure_allowlisted};
pub use scheme::SerializationScheme;
pub use serialized_bytes::SerializedBytes;
pub use use_case::UseCase;
