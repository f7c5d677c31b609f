//! Tests for Display implementations on error types.

use ledgerwire::{SerializationError, UseCase, checkpoint::CheckpointSerializationError};

#[test]
fn serialization_error_messages() {
    let resolution = SerializationError::Resolution {
        use_case: UseCase::Storage,
    };
    assert_eq!(
        resolution.to_string(),
        "no serialization scheme registered for use case storage"
    );

    let rejected = SerializationError::WhitelistViolation {
        type_name: "bank::Transfer".into(),
        use_case: UseCase::RpcServer,
    };
    assert_eq!(
        rejected.to_string(),
        "type bank::Transfer is not allowlisted for use case rpc_server"
    );

    let decoding = SerializationError::Decoding {
        type_name: "u32".into(),
        reason: "unrecognised scheme header".into(),
    };
    assert_eq!(
        decoding.to_string(),
        "failed to decode u32: unrecognised scheme header"
    );
}

#[test]
fn error_kinds_are_stable() {
    let encoding = SerializationError::Encoding {
        type_name: "u8".into(),
        reason: "boom".into(),
    };
    assert_eq!(encoding.error_type(), "encoding");
    assert!(!encoding.is_security_rejection());

    let rejected = SerializationError::WhitelistViolation {
        type_name: "u8".into(),
        use_case: UseCase::P2p,
    };
    assert_eq!(rejected.error_type(), "whitelist");
    assert!(rejected.is_security_rejection());
}

#[test]
fn checkpoint_error_messages() {
    let mismatch = CheckpointSerializationError::TypeMismatch {
        expected: "u64".into(),
        found: "u16".into(),
    };
    assert_eq!(mismatch.to_string(), "checkpoint holds u16, expected u64");

    let unsupported = CheckpointSerializationError::UnsupportedType {
        type_name: "flow::Session".into(),
        reason: "socket".into(),
    };
    assert_eq!(unsupported.to_string(), "cannot checkpoint flow::Session: socket");
}
