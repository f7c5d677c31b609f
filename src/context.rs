//! Immutable configuration for a single serialization invocation.
//!
//! A [`SerializationContext`] is a cheap handle to shared, never-mutated
//! data. Contexts compare by identity: two handles are equal only when they
//! point at the same underlying instance, which is how the canonical
//! contexts in [`SerializationDefaults`](crate::SerializationDefaults) are
//! recognised. Deriving a context through one of the `with_*` methods always
//! produces a new identity.

use std::{collections::BTreeMap, fmt, sync::Arc};

use crate::{
    allowlist::{AllowlistPolicy, TypeAllowlist, canonical_type_name},
    use_case::UseCase,
};

/// Value of an encoding option carried by a context.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PropertyValue {
    /// Boolean switch.
    Bool(bool),
    /// Signed integer option.
    Int(i64),
    /// Free-form text option.
    Text(String),
    /// Opaque binary option.
    Bytes(Vec<u8>),
}

impl From<bool> for PropertyValue {
    fn from(value: bool) -> Self { Self::Bool(value) }
}

impl From<i64> for PropertyValue {
    fn from(value: i64) -> Self { Self::Int(value) }
}

impl From<&str> for PropertyValue {
    fn from(value: &str) -> Self { Self::Text(value.to_owned()) }
}

impl From<String> for PropertyValue {
    fn from(value: String) -> Self { Self::Text(value) }
}

impl From<Vec<u8>> for PropertyValue {
    fn from(value: Vec<u8>) -> Self { Self::Bytes(value) }
}

struct ContextInner {
    use_case: UseCase,
    allowlist: Arc<dyn AllowlistPolicy>,
    properties: BTreeMap<String, PropertyValue>,
}

/// Environment describing one serialization use-case.
#[derive(Clone)]
pub struct SerializationContext {
    inner: Arc<ContextInner>,
}

impl SerializationContext {
    /// Create a context for `use_case` governed by `allowlist`.
    #[must_use]
    pub fn new(use_case: UseCase, allowlist: impl AllowlistPolicy) -> Self {
        Self::from_parts(use_case, Arc::new(allowlist), BTreeMap::new())
    }

    /// Create a context for `use_case` with the built-in allowlist and no
    /// properties.
    #[must_use]
    pub fn for_use_case(use_case: UseCase) -> Self {
        Self::new(use_case, TypeAllowlist::builtin())
    }

    fn from_parts(
        use_case: UseCase,
        allowlist: Arc<dyn AllowlistPolicy>,
        properties: BTreeMap<String, PropertyValue>,
    ) -> Self {
        Self {
            inner: Arc::new(ContextInner {
                use_case,
                allowlist,
                properties,
            }),
        }
    }

    /// Use-case this context serves.
    #[must_use]
    pub fn use_case(&self) -> UseCase { self.inner.use_case }

    /// Allowlist applied to deserialized types.
    #[must_use]
    pub fn allowlist(&self) -> &dyn AllowlistPolicy { self.inner.allowlist.as_ref() }

    /// Whether the allowlist admits the type named `type_name`.
    #[must_use]
    pub fn is_allowed(&self, type_name: &str) -> bool { self.inner.allowlist.is_allowed(type_name) }

    /// Look up the property stored under `key`.
    #[must_use]
    pub fn property(&self, key: &str) -> Option<&PropertyValue> { self.inner.properties.get(key) }

    /// All properties, ordered by key.
    #[must_use]
    pub fn properties(&self) -> &BTreeMap<String, PropertyValue> { &self.inner.properties }

    /// Derive a context with `key` set to `value`.
    #[must_use]
    pub fn with_property(&self, key: impl Into<String>, value: impl Into<PropertyValue>) -> Self {
        let mut properties = self.inner.properties.clone();
        properties.insert(key.into(), value.into());
        Self::from_parts(self.inner.use_case, Arc::clone(&self.inner.allowlist), properties)
    }

    /// Derive a context governed by `allowlist` instead.
    #[must_use]
    pub fn with_allowlist(&self, allowlist: impl AllowlistPolicy) -> Self {
        Self::from_parts(
            self.inner.use_case,
            Arc::new(allowlist),
            self.inner.properties.clone(),
        )
    }

    /// Derive a context that additionally admits `T`.
    ///
    /// The existing policy is consulted first, so widening never narrows
    /// what was previously accepted.
    #[must_use]
    pub fn with_allowed<T: ?Sized>(&self) -> Self {
        let extra = TypeAllowlist::empty().with::<T>();
        self.with_allowlist(Widened {
            base: Arc::clone(&self.inner.allowlist),
            extra,
        })
    }

    /// Derive a context for a different use-case with the same policy and
    /// properties.
    #[must_use]
    pub fn with_use_case(&self, use_case: UseCase) -> Self {
        Self::from_parts(
            use_case,
            Arc::clone(&self.inner.allowlist),
            self.inner.properties.clone(),
        )
    }

    /// Whether `T` may be produced under this context.
    #[must_use]
    pub fn allows<T: ?Sized>(&self) -> bool { self.is_allowed(&canonical_type_name::<T>()) }
}

impl PartialEq for SerializationContext {
    fn eq(&self, other: &Self) -> bool { Arc::ptr_eq(&self.inner, &other.inner) }
}

impl Eq for SerializationContext {}

impl fmt::Debug for SerializationContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SerializationContext")
            .field("use_case", &self.inner.use_case)
            .field("allowlist", &self.inner.allowlist)
            .field("properties", &self.inner.properties)
            .finish()
    }
}

#[derive(Debug)]
struct Widened {
    base: Arc<dyn AllowlistPolicy>,
    extra: TypeAllowlist,
}

impl AllowlistPolicy for Widened {
    fn is_allowed(&self, type_name: &str) -> bool {
        self.base.is_allowed(type_name) || self.extra.is_allowed(type_name)
    }
}
