//! End-to-end use of the public serialization API from application code.

use ledgerwire::{
    SerializationDefaults,
    SerializationFactory,
    UseCase,
    checkpoint::{checkpoint_deserialize, checkpoint_serialize},
    deserialize,
    serialize,
};
use ledgerwire_testing::{TestResult, assert_no_ambient_state};
use rstest::rstest;

#[test]
fn nothing_is_ambient_outside_a_call() {
    assert!(SerializationFactory::current_factory().is_none());
    assert!(SerializationFactory::default_factory().current_context().is_none());
}

#[test]
fn default_context_serializes_a_string() -> TestResult {
    let factory = SerializationFactory::default_factory();
    let bytes = factory.serialize("hello", factory.default_context())?;
    assert!(bytes.size() > 0);

    let text: String = factory.deserialize(bytes.bytes(), factory.default_context())?;
    assert_eq!(text, "hello");
    assert_no_ambient_state();
    Ok(())
}

#[rstest]
#[case(UseCase::P2p)]
#[case(UseCase::RpcServer)]
#[case(UseCase::RpcClient)]
#[case(UseCase::Storage)]
fn every_canonical_context_serializes_a_string(#[case] use_case: UseCase) -> TestResult {
    let defaults = SerializationDefaults::instance();
    let context = defaults
        .context_for(use_case)
        .ok_or("wire use-case has no canonical context")?;
    let factory = defaults.serialization_factory();

    let bytes = serialize("hello", factory, context)?;
    let text: String = deserialize(bytes.bytes(), factory, context)?;

    assert_eq!(text, "hello");
    assert_eq!(context.use_case(), use_case);
    assert_no_ambient_state();
    Ok(())
}

#[test]
fn checkpoint_serializes_a_string() -> TestResult {
    let bytes = checkpoint_serialize("hello")?;
    let text: String = checkpoint_deserialize(bytes.bytes())?;
    assert_eq!(text, "hello");
    assert_no_ambient_state();
    Ok(())
}

#[test]
fn storage_bytes_differ_from_p2p_bytes() -> TestResult {
    let defaults = SerializationDefaults::instance();
    let factory = defaults.serialization_factory();

    let p2p = factory.serialize(&42_u64, defaults.p2p_context())?;
    let storage = factory.serialize(&42_u64, defaults.storage_context())?;

    assert_ne!(p2p, storage);
    assert_eq!(p2p.deserialize(factory, defaults.p2p_context())?, 42);
    assert_eq!(storage.deserialize(factory, defaults.storage_context())?, 42);
    assert!(factory.deserialize::<u64>(p2p.bytes(), defaults.storage_context()).is_err());
    Ok(())
}
