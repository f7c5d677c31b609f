//! Allowlist enforcement and its diagnostics.

use ledgerwire::{
    SerializationContext,
    SerializationError,
    SerializationFactory,
    TypeAllowlist,
    UseCase,
    ensure_allowlisted,
};
use ledgerwire_testing::{
    LoggerHandle,
    TestResult,
    assert_no_ambient_state,
    logger,
    p2p_context,
    wire_factory,
};
use rstest::rstest;
use serde::{Deserialize, Deserializer, Serialize};
use serial_test::serial;

#[derive(Debug, PartialEq, Serialize, Deserialize)]
struct Transfer {
    amount: u64,
    memo: String,
}

/// Key material that must only be decoded where explicitly admitted.
#[derive(Debug, PartialEq, Serialize)]
struct SigningKey(Vec<u8>);

impl<'de> Deserialize<'de> for SigningKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        ensure_allowlisted::<SigningKey, D::Error>()?;
        Vec::<u8>::deserialize(deserializer).map(SigningKey)
    }
}

#[derive(Debug, PartialEq, Serialize, Deserialize)]
struct Envelope {
    sender: String,
    key: SigningKey,
}

fn envelope() -> Envelope {
    Envelope {
        sender: "bank-a".into(),
        key: SigningKey(vec![1, 2, 3]),
    }
}

#[rstest]
fn unlisted_root_type_is_rejected(
    wire_factory: SerializationFactory,
    p2p_context: SerializationContext,
) -> TestResult {
    let transfer = Transfer {
        amount: 10,
        memo: "rent".into(),
    };
    let bytes = wire_factory.serialize(&transfer, &p2p_context)?;

    let err = wire_factory
        .deserialize::<Transfer>(bytes.bytes(), &p2p_context)
        .expect_err("Transfer is not allowlisted");

    match err {
        SerializationError::WhitelistViolation {
            type_name,
            use_case,
        } => {
            assert!(type_name.ends_with("Transfer"));
            assert_eq!(use_case, UseCase::P2p);
        }
        other => panic!("unexpected error: {other:?}"),
    }
    Ok(())
}

#[rstest]
fn widened_context_admits_the_root_type(
    wire_factory: SerializationFactory,
    p2p_context: SerializationContext,
) -> TestResult {
    let transfer = Transfer {
        amount: 10,
        memo: "rent".into(),
    };
    let widened = p2p_context.with_allowed::<Transfer>();
    let bytes = wire_factory.serialize(&transfer, &widened)?;

    let restored: Transfer = wire_factory.deserialize(bytes.bytes(), &widened)?;
    assert_eq!(restored, transfer);
    Ok(())
}

#[rstest]
fn nested_unlisted_type_is_rejected(
    wire_factory: SerializationFactory,
    p2p_context: SerializationContext,
) -> TestResult {
    let context = p2p_context.with_allowed::<Envelope>();
    let bytes = wire_factory.serialize(&envelope(), &context)?;

    let err = wire_factory
        .deserialize::<Envelope>(bytes.bytes(), &context)
        .expect_err("SigningKey is not allowlisted");

    assert!(err.is_security_rejection());
    assert!(err.to_string().contains("SigningKey"));
    assert_no_ambient_state();

    let trusted = context.with_allowed::<SigningKey>();
    let restored: Envelope = wire_factory.deserialize(bytes.bytes(), &trusted)?;
    assert_eq!(restored, envelope());
    Ok(())
}

#[rstest]
fn allowlists_are_per_context(wire_factory: SerializationFactory) -> TestResult {
    let storage = SerializationContext::new(
        UseCase::Storage,
        TypeAllowlist::builtin().with::<Transfer>(),
    );
    let p2p = SerializationContext::for_use_case(UseCase::P2p);
    let transfer = Transfer {
        amount: 1,
        memo: String::new(),
    };

    let stored = wire_factory.serialize(&transfer, &storage)?;
    assert!(wire_factory.deserialize::<Transfer>(stored.bytes(), &storage).is_ok());

    let sent = wire_factory.serialize(&transfer, &p2p)?;
    assert!(wire_factory.deserialize::<Transfer>(sent.bytes(), &p2p).is_err());
    Ok(())
}

#[rstest]
#[serial]
fn rejection_is_logged(
    mut logger: LoggerHandle,
    wire_factory: SerializationFactory,
    p2p_context: SerializationContext,
) -> TestResult {
    let bytes = wire_factory.serialize(&Transfer { amount: 3, memo: "x".into() }, &p2p_context)?;
    logger.clear();

    let _ = wire_factory.deserialize::<Transfer>(bytes.bytes(), &p2p_context);

    let warnings = logger.drain_matching(log::Level::Warn, "allowlist rejected type");
    assert!(!warnings.is_empty(), "rejection was not logged");
    assert!(warnings.iter().any(|record| record.args().contains("Transfer")));
    Ok(())
}

#[rstest]
#[serial]
fn missing_scheme_is_logged(mut logger: LoggerHandle) {
    let factory = SerializationFactory::builder(SerializationContext::for_use_case(UseCase::P2p))
        .build();
    let context = SerializationContext::for_use_case(UseCase::RpcClient);

    let err = factory.serialize(&1_u8, &context).expect_err("no schemes registered");

    assert_eq!(
        err,
        SerializationError::Resolution {
            use_case: UseCase::RpcClient
        }
    );
    let warnings = logger.drain_matching(log::Level::Warn, "no serialization scheme registered");
    assert!(warnings.iter().any(|record| record.args().contains("rpc_client")));
}
