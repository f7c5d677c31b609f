//! Scheme resolution and ambient-state management for wire serialization.
//!
//! Every serialize and deserialize call goes through a
//! [`SerializationFactory`]. For the extent of the call the factory installs
//! itself and the call's context as the thread's ambient state, so code that
//! runs transitively (hand-written `Serialize`/`Deserialize` impls, nested
//! serialization) can discover them through
//! [`SerializationFactory::current_factory`] and
//! [`SerializationFactory::current_context`] without extra parameters.
//!
//! Ambient state is a per-thread stack. Outside any call it is empty, nested
//! calls push on top of it, and each call restores what it found on entry
//! when it returns, fails or unwinds.

use std::{cell::RefCell, collections::BTreeMap, fmt, sync::Arc};

use log::{debug, warn};
use serde::{Serialize, de::DeserializeOwned};

use crate::{
    allowlist::canonical_type_name,
    ambient::{self, CallPath, CallScope, ScopeStack},
    context::SerializationContext,
    defaults::SerializationDefaults,
    error::{Result, SerializationError},
    metrics::{self, Operation},
    scheme::SerializationScheme,
    serialized_bytes::SerializedBytes,
    use_case::UseCase,
};

struct CallFrame {
    factory: SerializationFactory,
    context: SerializationContext,
    rejected: Option<String>,
}

thread_local! {
    static WIRE_SCOPE: ScopeStack<CallFrame> = const { RefCell::new(Vec::new()) };
}

struct FactoryInner {
    schemes: BTreeMap<UseCase, SerializationScheme>,
    default_context: SerializationContext,
}

/// Resolves contexts to schemes and mediates every wire serialization call.
///
/// Factories are cheap handles; clones refer to the same factory and compare
/// equal. The scheme registry is fixed once [`SerializationFactoryBuilder::build`]
/// returns.
///
/// ```
/// use ledgerwire::{SerializationDefaults, SerializationFactory};
///
/// assert!(SerializationFactory::current_factory().is_none());
///
/// let defaults = SerializationDefaults::instance();
/// let factory = defaults.serialization_factory();
/// assert!(factory.current_context().is_none());
///
/// let bytes = factory
///     .serialize("hello", defaults.p2p_context())
///     .expect("strings are always encodable");
/// let text: String = factory
///     .deserialize(bytes.bytes(), defaults.p2p_context())
///     .expect("strings are allowlisted");
/// assert_eq!(text, "hello");
/// assert!(SerializationFactory::current_factory().is_none());
/// ```
#[derive(Clone)]
pub struct SerializationFactory {
    inner: Arc<FactoryInner>,
}

impl SerializationFactory {
    /// Start building a factory whose default context is `default_context`.
    #[must_use]
    pub fn builder(default_context: SerializationContext) -> SerializationFactoryBuilder {
        SerializationFactoryBuilder {
            schemes: BTreeMap::new(),
            default_context,
        }
    }

    /// Factory of the innermost call in progress on this thread, if any.
    #[must_use]
    pub fn current_factory() -> Option<SerializationFactory> {
        ambient::query(&WIRE_SCOPE, |frames| {
            frames.last().map(|frame| frame.factory.clone())
        })
    }

    /// The process-wide canonical factory.
    ///
    /// Obtaining it does not install any ambient state.
    #[must_use]
    pub fn default_factory() -> SerializationFactory {
        SerializationDefaults::instance().serialization_factory().clone()
    }

    /// Context of the innermost call in progress on this thread through this
    /// factory, if any.
    #[must_use]
    pub fn current_context(&self) -> Option<SerializationContext> {
        ambient::query(&WIRE_SCOPE, |frames| {
            frames
                .iter()
                .rev()
                .find(|frame| frame.factory == *self)
                .map(|frame| frame.context.clone())
        })
    }

    /// Context used when a caller has no more specific one.
    #[must_use]
    pub fn default_context(&self) -> &SerializationContext { &self.inner.default_context }

    /// Scheme registered for `use_case`.
    ///
    /// # Errors
    ///
    /// Returns [`SerializationError::Resolution`] if none is registered.
    pub fn resolve_scheme(&self, use_case: UseCase) -> Result<&SerializationScheme> {
        self.inner
            .schemes
            .get(&use_case)
            .ok_or(SerializationError::Resolution { use_case })
    }

    /// Use-cases this factory can serve, in declaration order.
    pub fn use_cases(&self) -> impl Iterator<Item = UseCase> + '_ {
        self.inner.schemes.keys().copied()
    }

    /// Run `f` with this factory and `context` installed as ambient state.
    ///
    /// Serialize and deserialize do this implicitly; use it directly when
    /// code that consults the ambient context runs outside such a call.
    pub fn with_current_context<R>(&self, context: &SerializationContext, f: impl FnOnce() -> R) -> R {
        let _scope = self.enter(context);
        f()
    }

    /// Encode `value` using the scheme registered for `context`'s use-case.
    ///
    /// # Errors
    ///
    /// Returns [`SerializationError::Resolution`] if no scheme serves the
    /// use-case, and [`SerializationError::Encoding`] if the scheme fails.
    pub fn serialize<T>(
        &self,
        value: &T,
        context: &SerializationContext,
    ) -> Result<SerializedBytes<T>>
    where
        T: Serialize + ?Sized,
    {
        let scheme = self.resolve_for(context)?;
        let result = {
            let _scope = self.enter(context);
            scheme.serialize(value, context)
        };
        match result {
            Ok(bytes) => {
                metrics::inc_operations(context.use_case(), Operation::Serialize);
                Ok(SerializedBytes::new(bytes))
            }
            Err(err) => Err(failed(err)),
        }
    }

    /// Decode a `T` from `bytes` using the scheme registered for `context`'s
    /// use-case.
    ///
    /// # Errors
    ///
    /// Returns [`SerializationError::Resolution`] if no scheme serves the
    /// use-case, [`SerializationError::WhitelistViolation`] if the allowlist
    /// rejects the decoded type or a type nested inside it, and
    /// [`SerializationError::Decoding`] for malformed input.
    pub fn deserialize<T>(&self, bytes: &[u8], context: &SerializationContext) -> Result<T>
    where
        T: DeserializeOwned,
    {
        let scheme = self.resolve_for(context)?;
        let result = {
            let _scope = self.enter(context);
            scheme
                .deserialize::<T>(bytes, context)
                .map_err(|err| nested_rejection(context).unwrap_or(err))
        };
        match result {
            Ok(value) => {
                metrics::inc_operations(context.use_case(), Operation::Deserialize);
                Ok(value)
            }
            Err(err) => Err(failed(err)),
        }
    }

    fn resolve_for(&self, context: &SerializationContext) -> Result<&SerializationScheme> {
        self.resolve_scheme(context.use_case()).map_err(failed)
    }

    fn enter(&self, context: &SerializationContext) -> CallScope<CallFrame> {
        ambient::enter(
            &WIRE_SCOPE,
            CallFrame {
                factory: self.clone(),
                context: context.clone(),
                rejected: None,
            },
            CallPath::Wire,
        )
    }
}

impl PartialEq for SerializationFactory {
    fn eq(&self, other: &Self) -> bool { Arc::ptr_eq(&self.inner, &other.inner) }
}

impl Eq for SerializationFactory {}

impl fmt::Debug for SerializationFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SerializationFactory")
            .field("schemes", &self.inner.schemes)
            .field("default_use_case", &self.inner.default_context.use_case())
            .finish()
    }
}

/// Builder for [`SerializationFactory`].
#[derive(Debug)]
pub struct SerializationFactoryBuilder {
    schemes: BTreeMap<UseCase, SerializationScheme>,
    default_context: SerializationContext,
}

impl SerializationFactoryBuilder {
    /// Serve `use_case` with `scheme`, replacing any earlier registration.
    #[must_use]
    pub fn register(mut self, use_case: UseCase, scheme: SerializationScheme) -> Self {
        self.schemes.insert(use_case, scheme);
        self
    }

    /// Register the standard layout: [`SerializationScheme::Compact`] for
    /// P2P and RPC, [`SerializationScheme::FixedWidth`] for storage.
    #[must_use]
    pub fn with_standard_schemes(self) -> Self {
        self.register(UseCase::P2p, SerializationScheme::compact())
            .register(UseCase::RpcServer, SerializationScheme::compact())
            .register(UseCase::RpcClient, SerializationScheme::compact())
            .register(UseCase::Storage, SerializationScheme::fixed_width())
    }

    /// Finish building.
    #[must_use]
    pub fn build(self) -> SerializationFactory {
        SerializationFactory {
            inner: Arc::new(FactoryInner {
                schemes: self.schemes,
                default_context: self.default_context,
            }),
        }
    }
}

/// Check `T` against the allowlist of the innermost active wire call.
///
/// Intended for hand-written `Deserialize` impls that materialise nested
/// types. A rejection is remembered by the active call, which then fails
/// with [`SerializationError::WhitelistViolation`] instead of a generic
/// decoding error. Outside any call there is no policy to apply and the
/// check passes. The same holds while a checkpoint call is innermost, even
/// if a wire call is active further out: checkpoints carry no allowlist.
///
/// # Errors
///
/// Returns `E::custom` describing the rejected type.
pub fn ensure_allowlisted<T, E>() -> std::result::Result<(), E>
where
    T: ?Sized,
    E: serde::de::Error,
{
    if ambient::innermost_path() != Some(CallPath::Wire) {
        return Ok(());
    }
    let type_name = canonical_type_name::<T>();
    let Some(allowed) = ambient::query(&WIRE_SCOPE, |frames| {
        frames.last().map(|frame| frame.context.is_allowed(&type_name))
    }) else {
        return Ok(());
    };
    if allowed {
        return Ok(());
    }
    ambient::update_innermost(&WIRE_SCOPE, |frame| {
        frame
            .rejected
            .get_or_insert_with(|| type_name.clone().into_owned());
    });
    Err(E::custom(format_args!("type {type_name} is not allowlisted")))
}

fn nested_rejection(context: &SerializationContext) -> Option<SerializationError> {
    let mut rejected = None;
    ambient::update_innermost(&WIRE_SCOPE, |frame| rejected = frame.rejected.take());
    rejected.map(|type_name| SerializationError::WhitelistViolation {
        type_name,
        use_case: context.use_case(),
    })
}

fn failed(err: SerializationError) -> SerializationError {
    match &err {
        SerializationError::WhitelistViolation {
            type_name,
            use_case,
        } => {
            tracing::warn!(%use_case, %type_name, "allowlist rejected type");
        }
        SerializationError::Resolution { use_case } => {
            warn!("no serialization scheme registered: use_case={use_case}");
        }
        other => debug!("serialization failed: kind={}, error={other}", other.error_type()),
    }
    metrics::inc_errors(err.error_type());
    err
}

#[cfg(test)]
mod tests;
