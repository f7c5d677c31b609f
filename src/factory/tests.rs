//! Unit tests for factory resolution and ambient scoping.

use serde::{Deserialize, Deserializer, Serialize};

use super::{SerializationFactory, ensure_allowlisted};
use crate::{
    SerializationContext,
    SerializationError,
    SerializationScheme,
    UseCase,
    allowlist::canonical_type_name,
};

fn p2p_only() -> SerializationFactory {
    SerializationFactory::builder(SerializationContext::for_use_case(UseCase::P2p))
        .register(UseCase::P2p, SerializationScheme::compact())
        .build()
}

#[derive(Debug, PartialEq, Serialize)]
struct Secret(u32);

impl<'de> Deserialize<'de> for Secret {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        ensure_allowlisted::<Secret, D::Error>()?;
        u32::deserialize(deserializer).map(Secret)
    }
}

#[derive(Debug, PartialEq, Serialize, Deserialize)]
struct Vault {
    label: String,
    secret: Secret,
}

fn vault() -> Vault {
    Vault {
        label: "cold".into(),
        secret: Secret(9),
    }
}

#[test]
fn missing_scheme_is_a_resolution_error() {
    let factory = p2p_only();
    let storage = SerializationContext::for_use_case(UseCase::Storage);

    let err = factory
        .serialize(&1_u8, &storage)
        .expect_err("storage has no scheme");
    assert_eq!(
        err,
        SerializationError::Resolution {
            use_case: UseCase::Storage
        }
    );
    assert!(SerializationFactory::current_factory().is_none());
}

#[test]
fn builder_registrations_are_listed() {
    let factory = SerializationFactory::builder(SerializationContext::for_use_case(UseCase::P2p))
        .with_standard_schemes()
        .build();
    let use_cases: Vec<_> = factory.use_cases().collect();
    assert_eq!(use_cases, UseCase::WIRE);
    assert_eq!(
        factory.resolve_scheme(UseCase::Storage),
        Ok(&SerializationScheme::fixed_width())
    );
    assert!(factory.resolve_scheme(UseCase::Checkpoint).is_err());
}

#[test]
fn clones_compare_equal_but_builds_do_not() {
    let factory = p2p_only();
    assert_eq!(factory.clone(), factory);
    assert_ne!(p2p_only(), factory);
}

#[test]
fn with_current_context_installs_and_restores() {
    let factory = p2p_only();
    let context = factory.default_context().clone();

    let seen = factory.with_current_context(&context, || {
        (
            SerializationFactory::current_factory(),
            factory.current_context(),
        )
    });

    assert_eq!(seen, (Some(factory.clone()), Some(context)));
    assert!(SerializationFactory::current_factory().is_none());
    assert!(factory.current_context().is_none());
}

#[test]
fn current_context_is_scoped_per_factory() {
    let outer = p2p_only();
    let inner = p2p_only();
    let outer_ctx = outer.default_context().clone();
    let inner_ctx = inner.default_context().clone();

    outer.with_current_context(&outer_ctx, || {
        inner.with_current_context(&inner_ctx, || {
            assert_eq!(SerializationFactory::current_factory(), Some(inner.clone()));
            assert_eq!(inner.current_context(), Some(inner_ctx.clone()));
            assert_eq!(outer.current_context(), Some(outer_ctx.clone()));
        });
        assert_eq!(SerializationFactory::current_factory(), Some(outer.clone()));
        assert!(inner.current_context().is_none());
    });
}

#[test]
fn nested_rejection_surfaces_as_whitelist_violation() {
    let factory = p2p_only();
    let permissive = factory
        .default_context()
        .with_allowed::<Vault>()
        .with_allowed::<Secret>();
    let strict = factory.default_context().with_allowed::<Vault>();

    let bytes = factory.serialize(&vault(), &permissive).expect("encode");
    let decoded: Vault = factory.deserialize(bytes.bytes(), &permissive).expect("decode");
    assert_eq!(decoded, vault());

    let err = factory
        .deserialize::<Vault>(bytes.bytes(), &strict)
        .expect_err("nested type is not allowlisted");
    assert_eq!(
        err,
        SerializationError::WhitelistViolation {
            type_name: canonical_type_name::<Secret>().into_owned(),
            use_case: UseCase::P2p,
        }
    );
}

#[test]
fn ensure_allowlisted_passes_outside_any_call() {
    let result = ensure_allowlisted::<Secret, serde::de::value::Error>();
    assert!(result.is_ok());
}

#[test]
fn ensure_allowlisted_consults_the_ambient_context() {
    let factory = p2p_only();
    let context = factory.default_context().clone();

    let result = factory.with_current_context(&context, || {
        ensure_allowlisted::<Secret, serde::de::value::Error>()
    });
    let err = result.expect_err("builtin allowlist rejects Secret");
    assert!(err.to_string().contains("not allowlisted"));
}
