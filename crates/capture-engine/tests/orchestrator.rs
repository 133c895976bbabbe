mod common;

use std::sync::Arc;
use std::time::Duration;

use common::{document, orchestrator, Fault, FakeEngine};
use slidecast_capture_engine::{CaptureOptions, CaptureOrchestrator, CaptureSettings};
use slidecast_common::error::ErrorKind;
use tokio_util::sync::CancellationToken;

fn with_id(id: &str) -> CaptureOptions {
    CaptureOptions {
        session_id: Some(id.to_string()),
        ..CaptureOptions::default()
    }
}

#[tokio::test(start_paused = true)]
async fn capture_resolves_artifact_and_releases_surface() {
    let work = tempfile::tempdir().unwrap();
    let (orchestrator, counters) = orchestrator(FakeEngine::new(Fault::None), work.path());

    let start = tokio::time::Instant::now();
    let handle = orchestrator
        .capture(&document(5.0), 5.0, with_id("happy"))
        .await
        .unwrap();

    assert!(start.elapsed() >= Duration::from_millis(5500));
    assert_eq!(handle.path, work.path().join("slide_1_happy.webm"));
    assert_eq!(handle.session_id, "happy");
    assert_eq!(handle.size_bytes, Some("happy".len() as u64));
    assert_eq!(std::fs::read_to_string(&handle.path).unwrap(), "happy");
    assert!(!work.path().join("happy").exists());

    assert_eq!(counters.acquired(), 1);
    assert_eq!(counters.released(), 1);
    assert_eq!(counters.views_closed(), 1);
    assert_eq!(counters.recordings_closed(), 1);
}

#[tokio::test(start_paused = true)]
async fn never_idle_document_times_out_and_releases_once() {
    let work = tempfile::tempdir().unwrap();
    let (orchestrator, counters) = orchestrator(FakeEngine::new(Fault::NeverIdle), work.path());

    let err = orchestrator
        .capture(&document(5.0), 5.0, CaptureOptions::default())
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::LoadTimeout);
    assert_eq!(counters.released(), 1);
    // The recording is still finalized so the engine does not leak it.
    assert_eq!(counters.recordings_closed(), 1);
}

#[tokio::test(start_paused = true)]
async fn every_injected_fault_releases_exactly_what_was_acquired() {
    for fault in Fault::ALL {
        let work = tempfile::tempdir().unwrap();
        let (orchestrator, counters) = orchestrator(FakeEngine::new(fault), work.path());

        let result = orchestrator
            .capture(&document(3.0), 3.0, CaptureOptions::default())
            .await;

        let expected_acquired = usize::from(fault != Fault::Launch);
        assert_eq!(counters.acquired(), expected_acquired, "{fault:?}");
        assert_eq!(counters.released(), expected_acquired, "{fault:?}");
        assert!(counters.recordings_closed() <= 1, "{fault:?}");
        assert!(counters.views_closed() <= 1, "{fault:?}");

        let expected = match fault {
            Fault::None | Fault::Release => None,
            Fault::NeverIdle => Some(ErrorKind::LoadTimeout),
            Fault::NoArtifact => Some(ErrorKind::ArtifactNotFound),
            _ => Some(ErrorKind::EngineUnavailable),
        };
        assert_eq!(result.err().map(|e| e.kind()), expected, "{fault:?}");
    }
}

#[tokio::test(start_paused = true)]
async fn missing_artifact_leaves_session_dir_for_diagnosis() {
    let work = tempfile::tempdir().unwrap();
    let (orchestrator, counters) = orchestrator(FakeEngine::new(Fault::NoArtifact), work.path());

    let err = orchestrator
        .capture(&document(2.0), 2.0, with_id("empty"))
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::ArtifactNotFound);
    assert!(work.path().join("empty").is_dir());
    assert_eq!(counters.released(), 1);
}

#[tokio::test(start_paused = true)]
async fn cancellation_during_wait_finalizes_and_reports_cancelled() {
    let work = tempfile::tempdir().unwrap();
    let (orchestrator, counters) = orchestrator(FakeEngine::new(Fault::None), work.path());

    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_secs(1)).await;
        trigger.cancel();
    });

    let start = tokio::time::Instant::now();
    let err = orchestrator
        .capture(
            &document(60.0),
            60.0,
            CaptureOptions {
                session_id: Some("cancelled".into()),
                cancel,
                ..CaptureOptions::default()
            },
        )
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Cancelled);
    assert!(start.elapsed() < Duration::from_secs(60));
    assert_eq!(counters.views_closed(), 1);
    assert_eq!(counters.recordings_closed(), 1);
    assert_eq!(counters.released(), 1);
    // Partial output stays with the caller.
    assert!(work.path().join("cancelled").is_dir());
}

#[tokio::test(start_paused = true)]
async fn cancellation_during_load_aborts() {
    let work = tempfile::tempdir().unwrap();
    let (orchestrator, counters) = orchestrator(FakeEngine::new(Fault::NeverIdle), work.path());

    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(200)).await;
        trigger.cancel();
    });

    let err = orchestrator
        .capture(
            &document(5.0),
            5.0,
            CaptureOptions {
                cancel,
                ..CaptureOptions::default()
            },
        )
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Cancelled);
    assert_eq!(counters.released(), 1);
}

#[tokio::test]
async fn precancelled_capture_never_touches_engine() {
    let work = tempfile::tempdir().unwrap();
    let (orchestrator, counters) = orchestrator(FakeEngine::new(Fault::None), work.path());
    let cancel = CancellationToken::new();
    cancel.cancel();

    let err = orchestrator
        .capture(
            &document(5.0),
            5.0,
            CaptureOptions {
                cancel,
                ..CaptureOptions::default()
            },
        )
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Cancelled);
    assert_eq!(counters.acquired(), 0);
}

#[tokio::test]
async fn invalid_duration_rejected_before_engine() {
    let work = tempfile::tempdir().unwrap();
    let (orchestrator, counters) = orchestrator(FakeEngine::new(Fault::None), work.path());

    for duration in [0.0, -5.0, f64::NAN] {
        let err = orchestrator
            .capture(&document(5.0), duration, CaptureOptions::default())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidSlideData);
    }
    assert_eq!(counters.acquired(), 0);
    assert_eq!(std::fs::read_dir(work.path()).unwrap().count(), 0);
}

#[tokio::test]
async fn reused_session_id_is_refused() {
    let work = tempfile::tempdir().unwrap();
    std::fs::create_dir(work.path().join("taken")).unwrap();
    let (orchestrator, counters) = orchestrator(FakeEngine::new(Fault::None), work.path());

    let err = orchestrator
        .capture(&document(5.0), 5.0, with_id("taken"))
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::IoFailure);
    assert_eq!(counters.acquired(), 0);
}

#[tokio::test(start_paused = true)]
async fn explicit_destination_and_reported_path() {
    let work = tempfile::tempdir().unwrap();
    let out = tempfile::tempdir().unwrap();
    let mut engine = FakeEngine::new(Fault::None);
    engine.report_path = true;
    let (orchestrator, _) = orchestrator(engine, work.path());

    let destination = out.path().join("clips").join("intro.webm");
    let handle = orchestrator
        .capture(
            &document(1.0),
            1.0,
            CaptureOptions {
                destination: Some(destination.clone()),
                ..CaptureOptions::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(handle.path, destination);
    assert!(destination.is_file());
}

#[tokio::test(start_paused = true)]
async fn abandoned_capture_still_releases_surface() {
    let work = tempfile::tempdir().unwrap();
    let engine = FakeEngine::new(Fault::None);
    let counters = engine.counters.clone();
    let orchestrator = Arc::new(CaptureOrchestrator::new(
        Arc::new(engine),
        CaptureSettings::with_work_dir(work.path()),
    ));

    let doc = document(30.0);
    let abandoned = tokio::time::timeout(
        Duration::from_secs(2),
        orchestrator.capture(&doc, 30.0, CaptureOptions::default()),
    )
    .await;
    assert!(abandoned.is_err());
    assert_eq!(counters.acquired(), 1);

    for _ in 0..20 {
        if counters.released() == 1 {
            break;
        }
        tokio::task::yield_now().await;
    }
    assert_eq!(counters.released(), 1);
}

#[tokio::test(start_paused = true)]
async fn sub_second_slide_captures() {
    let work = tempfile::tempdir().unwrap();
    let (orchestrator, counters) = orchestrator(FakeEngine::new(Fault::None), work.path());

    let handle = orchestrator
        .capture(&document(0.5), 0.5, with_id("short"))
        .await
        .unwrap();

    assert_eq!(std::fs::read_to_string(&handle.path).unwrap(), "short");
    assert_eq!(counters.released(), 1);
}

#[tokio::test(start_paused = true)]
async fn existing_destination_is_not_overwritten() {
    let work = tempfile::tempdir().unwrap();
    let (orchestrator, counters) = orchestrator(FakeEngine::new(Fault::None), work.path());
    let destination = work.path().join("keep.webm");
    std::fs::write(&destination, "previous").unwrap();

    let err = orchestrator
        .capture(
            &document(1.0),
            1.0,
            CaptureOptions {
                session_id: Some("clash".into()),
                destination: Some(destination.clone()),
                ..CaptureOptions::default()
            },
        )
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::IoFailure);
    assert_eq!(std::fs::read_to_string(&destination).unwrap(), "previous");
    // The capture stays in the session directory.
    assert_eq!(std::fs::read_dir(work.path().join("clash")).unwrap().count(), 1);
    assert_eq!(counters.released(), 1);
}
