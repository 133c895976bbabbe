//! Concurrent sessions must never pick up each other's capture, whatever
//! order their recordings finish in.

mod common;

use std::time::Duration;

use common::{document, orchestrator, Fault, FakeEngine};
use proptest::prelude::*;
use slidecast_capture_engine::CaptureOptions;

fn options(id: &str) -> CaptureOptions {
    CaptureOptions {
        session_id: Some(id.to_string()),
        ..CaptureOptions::default()
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    #[test]
    fn concurrent_sessions_resolve_their_own_artifacts(
        delay_a in 0u64..3_000,
        delay_b in 0u64..3_000,
        duration_a in 0.5f64..4.0,
        duration_b in 0.5f64..4.0,
    ) {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .start_paused(true)
            .build()
            .unwrap();

        let work = tempfile::tempdir().unwrap();
        let mut engine = FakeEngine::new(Fault::None);
        engine.artifact_delays.insert("alpha".into(), Duration::from_millis(delay_a));
        engine.artifact_delays.insert("beta".into(), Duration::from_millis(delay_b));
        let (orchestrator, counters) = orchestrator(engine, work.path());

        let doc_a = document(duration_a);
        let doc_b = document(duration_b);
        let (a, b) = runtime.block_on(async {
            tokio::join!(
                orchestrator.capture(&doc_a, duration_a, options("alpha")),
                orchestrator.capture(&doc_b, duration_b, options("beta")),
            )
        });

        let a = a.unwrap();
        let b = b.unwrap();
        prop_assert_ne!(&a.path, &b.path);
        prop_assert_eq!(std::fs::read_to_string(&a.path).unwrap(), "alpha");
        prop_assert_eq!(std::fs::read_to_string(&b.path).unwrap(), "beta");
        prop_assert_eq!(counters.acquired(), 2);
        prop_assert_eq!(counters.released(), 2);
    }
}
