#![cfg(feature = "metrics")]
//! Tests for `ledgerwire` metrics helpers.
//!
//! These tests verify that counters update as expected using
//! `metrics_util::debugging::DebuggingRecorder`.
use ledgerwire::{
    SerializationContext,
    SerializationDefaults,
    UseCase,
    checkpoint::checkpoint_serialize,
    metrics::{CHECKPOINTS_TOTAL, ERRORS_TOTAL, OPERATIONS_TOTAL},
};
use metrics_util::debugging::{DebugValue, DebuggingRecorder, Snapshotter};

/// Creates a debugging recorder and snapshotter for metrics testing.
fn debugging_recorder_setup() -> (Snapshotter, DebuggingRecorder) {
    let recorder = DebuggingRecorder::new();
    let snapshotter = recorder.snapshotter();
    (snapshotter, recorder)
}

fn counter_with(snapshotter: &Snapshotter, name: &str, label: (&str, &str)) -> u64 {
    snapshotter
        .snapshot()
        .into_vec()
        .into_iter()
        .filter(|(k, _, _, _)| {
            k.key().name() == name
                && k.key()
                    .labels()
                    .any(|l| l.key() == label.0 && l.value() == label.1)
        })
        .map(|(_, _, _, v)| match v {
            DebugValue::Counter(c) => c,
            _ => 0,
        })
        .sum()
}

#[test]
fn operations_are_counted_per_use_case() {
    let (snapshotter, recorder) = debugging_recorder_setup();
    let defaults = SerializationDefaults::instance();
    metrics::with_local_recorder(&recorder, || {
        let factory = defaults.serialization_factory();
        let bytes = factory
            .serialize(&1_u32, defaults.storage_context())
            .expect("encode");
        let _: u32 = factory
            .deserialize(bytes.bytes(), defaults.storage_context())
            .expect("decode");
    });

    assert_eq!(counter_with(&snapshotter, OPERATIONS_TOTAL, ("use_case", "storage")), 2);
    assert_eq!(
        counter_with(&snapshotter, OPERATIONS_TOTAL, ("operation", "deserialize")),
        1
    );
}

#[test]
fn rejections_are_counted_by_kind() {
    let (snapshotter, recorder) = debugging_recorder_setup();
    let defaults = SerializationDefaults::instance();
    metrics::with_local_recorder(&recorder, || {
        let factory = defaults.serialization_factory();
        let bytes = factory
            .serialize(&[1_u8, 2], defaults.p2p_context())
            .expect("encode");
        let locked = SerializationContext::new(UseCase::P2p, ledgerwire::TypeAllowlist::empty());
        assert!(factory.deserialize::<[u8; 2]>(bytes.bytes(), &locked).is_err());
    });

    assert_eq!(counter_with(&snapshotter, ERRORS_TOTAL, ("kind", "whitelist")), 1);
}

#[test]
fn checkpoints_are_counted() {
    let (snapshotter, recorder) = debugging_recorder_setup();
    metrics::with_local_recorder(&recorder, || {
        checkpoint_serialize("state").expect("capture");
    });

    assert_eq!(
        counter_with(&snapshotter, CHECKPOINTS_TOTAL, ("operation", "serialize")),
        1
    );
}

#[test]
fn helpers_record_directly() {
    let (snapshotter, recorder) = debugging_recorder_setup();
    metrics::with_local_recorder(&recorder, || {
        ledgerwire::metrics::inc_errors("decoding");
    });

    assert_eq!(counter_with(&snapshotter, ERRORS_TOTAL, ("kind", "decoding")), 1);
}
