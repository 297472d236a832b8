//! End-to-end runs of the scan orchestrator against stub collaborators.

use std::collections::{HashSet, VecDeque};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;

use parking_lot::Mutex;

use argos_core::analysis::{AnalysisReport, AnalysisRequest, AnalysisService};
use argos_core::detection::{DetectionTransport, RemoteDetection, RemoteDetectionResponse};
use argos_core::severity::{GREEN, RED};
use argos_core::storage::MemoryStore;
use argos_core::{
    Collaborators, HistoryItem, Identity, ImageLoader, ImageRef, KeyValueStore, ScanError,
    ScanOrchestrator, ScanStatus, SeverityKey, StorageError,
};

/// Queued answers; green once the queue runs dry.
#[derive(Default)]
struct StubAnalysis {
    answers: Mutex<VecDeque<Result<AnalysisReport, ScanError>>>,
    requests: Mutex<Vec<AnalysisRequest>>,
    panic_on: Mutex<Option<String>>,
}

impl StubAnalysis {
    fn answer(&self, answer: Result<AnalysisReport, ScanError>) {
        self.answers.lock().push_back(answer);
    }

    fn requests(&self) -> Vec<AnalysisRequest> {
        self.requests.lock().clone()
    }
}

impl AnalysisService for StubAnalysis {
    fn analyze(&self, request: &AnalysisRequest) -> Result<AnalysisReport, ScanError> {
        self.requests.lock().push(request.clone());
        if self.panic_on.lock().as_deref() == Some(request.id.as_str()) {
            panic!("analysis stub exploded");
        }
        self.answers
            .lock()
            .pop_front()
            .unwrap_or_else(|| Ok(AnalysisReport::with_status("green")))
    }
}

#[derive(Default)]
struct StubDetection {
    response: Mutex<Option<RemoteDetectionResponse>>,
    calls: AtomicUsize,
}

impl DetectionTransport for StubDetection {
    fn detect(&self, _jpeg: &[u8]) -> Result<RemoteDetectionResponse, ScanError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.response.lock().clone().unwrap_or_default())
    }
}

/// Every reference decodes except the ones listed as broken.
#[derive(Default)]
struct StubImages {
    broken: HashSet<String>,
}

impl ImageLoader for StubImages {
    fn load_jpeg(&self, image: &ImageRef) -> anyhow::Result<Vec<u8>> {
        if self.broken.contains(image.as_str()) {
            anyhow::bail!("corrupt image data");
        }
        Ok(vec![0xFF, 0xD8, 0xFF, 0xD9])
    }
}

/// Memory store whose reads fail while `failing` is set.
#[derive(Default)]
struct UnreadableStore {
    inner: MemoryStore,
    failing: AtomicBool,
}

impl KeyValueStore for UnreadableStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(StorageError::Io {
                key: key.to_string(),
                source: std::io::Error::new(std::io::ErrorKind::Other, "EIO"),
            });
        }
        self.inner.get(key)
    }

    fn put(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.inner.put(key, value)
    }
}

struct Harness {
    orchestrator: ScanOrchestrator,
    analysis: Arc<StubAnalysis>,
    detection: Arc<StubDetection>,
    storage: Arc<MemoryStore>,
}

fn harness_with(storage: Arc<MemoryStore>, images: StubImages) -> Harness {
    let analysis = Arc::new(StubAnalysis::default());
    let detection = Arc::new(StubDetection::default());
    let orchestrator = ScanOrchestrator::new(Collaborators {
        detection: detection.clone(),
        analysis: analysis.clone(),
        images: Arc::new(images),
        storage: storage.clone(),
    })
    .unwrap();

    Harness {
        orchestrator,
        analysis,
        detection,
        storage,
    }
}

fn harness() -> Harness {
    harness_with(Arc::new(MemoryStore::new()), StubImages::default())
}

fn ids(items: &[HistoryItem]) -> Vec<String> {
    items.iter().map(|i| i.uld_id.clone()).collect()
}

fn messages(statuses: &[ScanStatus]) -> Vec<String> {
    statuses
        .iter()
        .map(|s| match s {
            ScanStatus::Idle => "idle".to_string(),
            ScanStatus::Processing { message } => format!("processing: {}", message),
            ScanStatus::Success { result } => format!("success: {}", result.id),
            ScanStatus::Error { message } => format!("error: {}", message),
        })
        .collect()
}

fn breach_response(confidence: f32) -> RemoteDetectionResponse {
    RemoteDetectionResponse {
        detections: Some(vec![Some(RemoteDetection {
            box_norm: Some(vec![0.1, 0.1, 0.6, 0.7]),
            confidence,
            class_id: 2,
            label: None,
        })]),
        filename: Some("capture.jpg".to_string()),
    }
}

#[test]
fn test_simulated_red_run_succeeds_and_is_recorded() {
    let h = harness();
    h.analysis.answer(Ok(AnalysisReport::with_status("red")));
    let statuses = h.orchestrator.subscribe_status();

    h.orchestrator
        .run_from_simulated_findings("ULD-1", "severe puncture");
    h.orchestrator.flush();

    let result = match h.orchestrator.current_status() {
        ScanStatus::Success { result } => result,
        other => panic!("expected success, got {}", other),
    };
    assert_eq!(result.id, "ULD-1");
    assert_eq!(result.severity_key, SeverityKey::Red);
    assert_eq!(result.primary_damage_title, RED.default_damage_label);
    assert_eq!(result.primary_suggestion, RED.default_suggestion);
    assert_eq!(result.findings_summary, "severe puncture");
    assert_eq!(result.image, None);

    let history = h.orchestrator.history();
    assert_eq!(ids(&history), vec!["ULD-1"]);
    assert_eq!(history[0].severity_key, "red");
    assert_eq!(history[0].summary, RED.description);
    assert_eq!(h.orchestrator.latest_result(), Some(result));

    assert_eq!(
        messages(&statuses.drain()),
        vec![
            "idle",
            "processing: Simulating upload: 'severe puncture' ...",
            "success: ULD-1",
        ]
    );
    assert_eq!(
        h.analysis.requests(),
        vec![AnalysisRequest::new("ULD-1", "severe puncture")]
    );
}

#[test]
fn test_rejected_submission_leaves_history_unchanged() {
    let h = harness();
    h.orchestrator.run_from_simulated_findings("ULD-OK", "scratch");
    h.orchestrator.flush();
    let before = h.orchestrator.history();
    let stored_before = h.storage.get("history_guest").unwrap();

    h.analysis.answer(Err(ScanError::RemoteRejection {
        code: 500,
        message: "Internal Server Error".to_string(),
    }));
    h.orchestrator.run_from_simulated_findings("ULD-FAIL", "dent");
    h.orchestrator.flush();

    assert_eq!(
        h.orchestrator.current_status(),
        ScanStatus::error("API Error: 500 Internal Server Error")
    );
    assert_eq!(h.orchestrator.history(), before);
    assert_eq!(h.storage.get("history_guest").unwrap(), stored_before);
}

#[test]
fn test_transport_failure_does_not_stop_later_runs() {
    let h = harness();
    h.analysis
        .answer(Err(ScanError::Transport("connection refused".to_string())));

    h.orchestrator.run_from_simulated_findings("ULD-A", "dent");
    h.orchestrator.flush();
    assert_eq!(
        h.orchestrator.current_status(),
        ScanStatus::error("Simulation failed: transport failure: connection refused")
    );
    assert!(h.orchestrator.history().is_empty());

    h.orchestrator.run_from_simulated_findings("ULD-B", "dent");
    h.orchestrator.flush();
    assert!(matches!(h.orchestrator.current_status(), ScanStatus::Success { .. }));
    assert_eq!(ids(&h.orchestrator.history()), vec!["ULD-B"]);
}

#[test]
fn test_capture_without_detections_reports_no_damage() {
    let h = harness();
    let statuses = h.orchestrator.subscribe_status();

    h.orchestrator
        .run_from_capture(ImageRef::new("file:///captures/1.jpg"), true);
    h.orchestrator.flush();

    let requests = h.analysis.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].findings_text, "no damage");
    assert!(requests[0].id.starts_with("ULD-PHOTO-"));

    let seen = messages(&statuses.drain());
    assert_eq!(seen[1], "processing: Detecting damage...");
    assert_eq!(
        seen[2],
        "processing: No damage detected: Normal (100%), uploading findings..."
    );

    let result = h.orchestrator.latest_result().unwrap();
    assert_eq!(result.id, requests[0].id);
    assert_eq!(result.severity_key, SeverityKey::Green);
    assert_eq!(result.primary_damage_title, GREEN.default_damage_label);
    assert_eq!(result.image, Some(ImageRef::new("file:///captures/1.jpg")));
    assert_eq!(h.orchestrator.history()[0].image_uri, "file:///captures/1.jpg");
}

#[test]
fn test_capture_with_detections_summarizes_them() {
    let h = harness();
    *h.detection.response.lock() = Some(breach_response(0.87));
    let statuses = h.orchestrator.subscribe_status();

    h.orchestrator.run_from_capture(ImageRef::new("cap.jpg"), true);
    h.orchestrator.flush();

    assert_eq!(
        h.analysis.requests()[0].findings_text,
        "Found 1 potential issues: breach (confidence: 0.87); "
    );
    assert!(messages(&statuses.drain())
        .contains(&"processing: Detected Breach (87%), uploading findings...".to_string()));
}

#[test]
fn test_displayed_percent_is_clamped_but_summary_is_not() {
    let h = harness();
    *h.detection.response.lock() = Some(breach_response(1.5));
    let statuses = h.orchestrator.subscribe_status();

    h.orchestrator.run_from_capture(ImageRef::new("cap.jpg"), true);
    h.orchestrator.flush();

    assert_eq!(
        h.analysis.requests()[0].findings_text,
        "Found 1 potential issues: breach (confidence: 1.50); "
    );
    assert!(messages(&statuses.drain())
        .contains(&"processing: Detected Breach (100%), uploading findings...".to_string()));
}

#[test]
fn test_capture_without_detect_skips_detection() {
    let h = harness();
    *h.detection.response.lock() = Some(breach_response(0.9));

    h.orchestrator.run_from_capture(ImageRef::new("cap.jpg"), false);
    h.orchestrator.flush();

    assert_eq!(h.detection.calls.load(Ordering::SeqCst), 0);
    assert_eq!(h.analysis.requests()[0].findings_text, "no damage");
}

#[test]
fn test_decode_failure_ends_run_without_history() {
    let images = StubImages {
        broken: HashSet::from(["broken.jpg".to_string()]),
    };
    let h = harness_with(Arc::new(MemoryStore::new()), images);

    h.orchestrator.run_from_capture(ImageRef::new("broken.jpg"), true);
    h.orchestrator.flush();

    match h.orchestrator.current_status() {
        ScanStatus::Error { message } => {
            assert!(message.starts_with("Processing failed: failed to decode image broken.jpg"));
            assert!(message.contains("corrupt image data"));
        }
        other => panic!("expected error, got {}", other),
    }
    assert_eq!(h.detection.calls.load(Ordering::SeqCst), 0);
    assert!(h.analysis.requests().is_empty());
    assert!(h.orchestrator.history().is_empty());
}

#[test]
fn test_image_is_consumed_by_one_run() {
    let h = harness();
    let images = h.orchestrator.subscribe_last_captured_image();

    h.orchestrator.run_from_capture(ImageRef::new("cap.jpg"), false);
    h.orchestrator.run_from_simulated_findings("ULD-SIM", "scratch");
    h.orchestrator.flush();

    let history = h.orchestrator.history();
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].uld_id, "ULD-SIM");
    assert_eq!(history[0].image_uri, "");
    assert_eq!(history[1].image_uri, "cap.jpg");

    assert_eq!(
        images.drain(),
        vec![None, Some(ImageRef::new("cap.jpg")), None]
    );
}

#[test]
fn test_identity_detour_preserves_history() {
    let h = harness();
    h.orchestrator.switch_identity(Some("alice@example.com"));
    h.orchestrator.run_from_simulated_findings("A-1", "dent");
    h.orchestrator.run_from_simulated_findings("A-2", "dent");
    h.orchestrator.flush();
    let alice_before = h.orchestrator.history();
    assert_eq!(ids(&alice_before), vec!["A-2", "A-1"]);

    h.orchestrator.switch_identity(Some("Bob"));
    assert!(h.orchestrator.history().is_empty());
    h.orchestrator.run_from_simulated_findings("B-1", "dent");
    h.orchestrator.flush();
    assert_eq!(ids(&h.orchestrator.history()), vec!["B-1"]);

    h.orchestrator.switch_identity(Some("  ALICE@example.com "));
    assert_eq!(h.orchestrator.identity().key, "alice_example_com");
    assert_eq!(h.orchestrator.history(), alice_before);
}

#[test]
fn test_switch_publishes_display_name_and_history() {
    let h = harness();
    let names = h.orchestrator.subscribe_display_name();
    let histories = h.orchestrator.subscribe_history();

    h.orchestrator.switch_identity(Some("jane.doe@example.com"));
    h.orchestrator.switch_identity(Some("JANE.DOE@example.com"));
    h.orchestrator.switch_identity(None);

    assert_eq!(names.drain(), vec!["Guest", "Jane Doe", "Jane Doe", "Guest"]);
    // Same key twice: no reload
    assert_eq!(histories.drain().len(), 3);
    assert_eq!(h.orchestrator.identity().key, "guest");
}

#[test]
fn test_concurrent_switches_keep_name_and_key_together() {
    let h = harness();
    let names = h.orchestrator.subscribe_display_name();

    thread::scope(|scope| {
        for who in ["alice@example.com", "bob.smith"] {
            let orchestrator = &h.orchestrator;
            scope.spawn(move || {
                for _ in 0..200 {
                    orchestrator.switch_identity(Some(who));
                    orchestrator.switch_identity(None);
                    orchestrator.switch_identity(Some(who));
                }
            });
        }
    });

    let active = h.orchestrator.identity();
    let published = names.drain().pop().unwrap();
    assert_eq!(published, active.display_name);
    assert_eq!(
        published,
        Identity::from_identifier(active.raw_identifier.as_deref()).display_name
    );
}

#[test]
fn test_unreadable_history_fails_run_without_overwriting() {
    let storage = Arc::new(UnreadableStore::default());
    let analysis = Arc::new(StubAnalysis::default());
    let orchestrator = ScanOrchestrator::new(Collaborators {
        detection: Arc::new(StubDetection::default()),
        analysis,
        images: Arc::new(StubImages::default()),
        storage: storage.clone(),
    })
    .unwrap();

    orchestrator.run_from_simulated_findings("ULD-A", "dent");
    orchestrator.run_from_simulated_findings("ULD-B", "dent");
    orchestrator.flush();
    let before = orchestrator.history();
    assert_eq!(ids(&before), vec!["ULD-B", "ULD-A"]);

    storage.failing.store(true, Ordering::SeqCst);
    orchestrator.run_from_simulated_findings("ULD-C", "dent");
    orchestrator.flush();
    storage.failing.store(false, Ordering::SeqCst);

    match orchestrator.current_status() {
        ScanStatus::Error { message } => {
            assert!(message.starts_with("Simulation failed: storage I/O failed"))
        }
        other => panic!("expected error, got {}", other),
    }
    assert_eq!(orchestrator.history(), before);
    assert_eq!(orchestrator.latest_result().unwrap().id, "ULD-B");

    let stored: Vec<HistoryItem> =
        serde_json::from_str(&storage.get("history_guest").unwrap().unwrap()).unwrap();
    assert_eq!(stored, before);
}

#[test]
fn test_runs_are_serialized_in_submission_order() {
    let h = harness();
    for i in 0..5 {
        h.orchestrator
            .run_from_simulated_findings(&format!("ULD-{}", i), "dent");
    }
    h.orchestrator.flush();

    let submitted: Vec<String> = h.analysis.requests().into_iter().map(|r| r.id).collect();
    assert_eq!(submitted, vec!["ULD-0", "ULD-1", "ULD-2", "ULD-3", "ULD-4"]);
    assert_eq!(
        ids(&h.orchestrator.history()),
        vec!["ULD-4", "ULD-3", "ULD-2", "ULD-1", "ULD-0"]
    );
}

#[test]
fn test_panicking_collaborator_ends_only_that_run() {
    let h = harness();
    *h.analysis.panic_on.lock() = Some("ULD-BOOM".to_string());

    h.orchestrator.run_from_simulated_findings("ULD-BOOM", "dent");
    h.orchestrator.flush();
    assert_eq!(
        h.orchestrator.current_status(),
        ScanStatus::error("Simulation failed: analysis stub exploded")
    );

    h.orchestrator.run_from_simulated_findings("ULD-NEXT", "dent");
    h.orchestrator.flush();
    assert!(matches!(h.orchestrator.current_status(), ScanStatus::Success { .. }));
}

#[test]
fn test_reset_to_idle_after_success() {
    let h = harness();
    h.orchestrator.run_from_simulated_findings("ULD-1", "dent");
    h.orchestrator.flush();
    assert!(h.orchestrator.current_status().is_terminal());

    h.orchestrator.reset_to_idle();
    assert_eq!(h.orchestrator.current_status(), ScanStatus::Idle);
}

#[test]
fn test_existing_and_malformed_history_on_startup() {
    let storage = Arc::new(MemoryStore::new());
    storage
        .put(
            "history_guest",
            r#"[{"uldId":"OLD-1","severityKey":"yellow","timestamp":5},{"uldId":"OLD-0"}]"#,
        )
        .unwrap();
    storage.put("history_carol", "not json at all").unwrap();

    let h = harness_with(storage, StubImages::default());
    assert_eq!(ids(&h.orchestrator.history()), vec!["OLD-1", "OLD-0"]);
    assert_eq!(h.orchestrator.history()[1].severity_key, "unknown");

    h.orchestrator.run_from_simulated_findings("NEW", "dent");
    h.orchestrator.flush();
    assert_eq!(ids(&h.orchestrator.history()), vec!["NEW", "OLD-1", "OLD-0"]);

    h.orchestrator.switch_identity(Some("carol"));
    assert!(h.orchestrator.history().is_empty());
}

#[test]
fn test_dropping_orchestrator_drains_queue() {
    let storage = Arc::new(MemoryStore::new());
    {
        let h = harness_with(storage.clone(), StubImages::default());
        h.orchestrator.run_from_simulated_findings("ULD-1", "dent");
        h.orchestrator.run_from_simulated_findings("ULD-2", "dent");
    }

    let h = harness_with(storage, StubImages::default());
    assert_eq!(ids(&h.orchestrator.history()), vec!["ULD-2", "ULD-1"]);
}
