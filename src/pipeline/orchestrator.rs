//! Scan orchestrator.
//!
//! Coordinates one run end to end on a single background worker:
//! 1. Image loading (capture runs)
//! 2. Remote detection, empty results reported as no damage
//! 3. Findings summary
//! 4. Remote analysis submission
//! 5. Severity classification and result construction
//! 6. History append for the active identity
//! 7. `Success` / `Error` status
//!
//! Runs are queued and executed strictly one after another. Identity
//! switches happen on the caller's thread but share the session lock with
//! the history append, so a run always lands in exactly one identity's
//! history and the published history always matches the active identity.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use chrono::Utc;
use parking_lot::Mutex;

use crate::analysis::{AnalysisRequest, AnalysisService, HttpAnalysisService};
use crate::config::ClientConfig;
use crate::detection::{DetectionClient, DetectionTransport, HttpDetectionTransport};
use crate::error::ScanError;
use crate::identity::Identity;
use crate::logging::structured::LogContext;
use crate::storage::{FileStore, HistoryItem, HistoryStore, KeyValueStore};

use super::context::{RunContext, RunKind, RunSnapshot};
use super::image::{FileImageLoader, ImageLoader, ImageRef};
use super::observable::{Observable, Subscription};
use super::result::ScanResult;
use super::status::{ScanStatus, StatusChannel};
use super::summary::{
    detection_message, findings_summary, normal_detection, simulation_message, DETECTING_MESSAGE,
};

const WORKER_THREAD_NAME: &str = "argos-scan-worker";

/// External services and storage the orchestrator runs against.
#[derive(Clone)]
pub struct Collaborators {
    pub detection: Arc<dyn DetectionTransport>,
    pub analysis: Arc<dyn AnalysisService>,
    pub images: Arc<dyn ImageLoader>,
    pub storage: Arc<dyn KeyValueStore>,
}

impl Collaborators {
    /// HTTP services, file-backed history and filesystem images.
    pub fn from_config(config: &ClientConfig) -> Result<Self, ScanError> {
        Ok(Self {
            detection: Arc::new(HttpDetectionTransport::new(config)?),
            analysis: Arc::new(HttpAnalysisService::new(config)?),
            images: Arc::new(FileImageLoader),
            storage: Arc::new(FileStore::new(config.history_dir.clone())),
        })
    }
}

enum Job {
    Capture { image: ImageRef, detect: bool },
    Simulated { id: String, findings_text: String },
    Flush(Sender<()>),
}

/// State shared between the caller-facing handle and the worker.
struct Shared {
    detection: DetectionClient,
    analysis: Arc<dyn AnalysisService>,
    images: Arc<dyn ImageLoader>,
    history_store: HistoryStore,
    identity: Mutex<Identity>,
    status: StatusChannel,
    history: Observable<Vec<HistoryItem>>,
    latest_result: Observable<Option<ScanResult>>,
    display_name: Observable<String>,
    last_captured_image: Observable<Option<ImageRef>>,
}

/// Entry point for the presentation layer.
pub struct ScanOrchestrator {
    shared: Arc<Shared>,
    jobs: Option<Sender<Job>>,
    worker: Option<JoinHandle<()>>,
}

impl ScanOrchestrator {
    /// Start the worker with the guest identity and its stored history.
    pub fn new(collaborators: Collaborators) -> Result<Self, ScanError> {
        let identity = Identity::guest();
        let history_store = HistoryStore::new(collaborators.storage);
        let history = history_store.load(&identity.key);

        let shared = Arc::new(Shared {
            detection: DetectionClient::new(collaborators.detection),
            analysis: collaborators.analysis,
            images: collaborators.images,
            history_store,
            display_name: Observable::new(identity.display_name.clone()),
            identity: Mutex::new(identity),
            status: StatusChannel::new(),
            history: Observable::new(history),
            latest_result: Observable::new(None),
            last_captured_image: Observable::new(None),
        });

        let (tx, rx) = mpsc::channel();
        let worker_shared = Arc::clone(&shared);
        let worker = thread::Builder::new()
            .name(WORKER_THREAD_NAME.to_string())
            .spawn(move || worker_loop(worker_shared, rx))
            .map_err(ScanError::WorkerSpawn)?;

        log::info!("ORCHESTRATOR_STARTED worker={}", WORKER_THREAD_NAME);

        Ok(Self {
            shared,
            jobs: Some(tx),
            worker: Some(worker),
        })
    }

    /// Orchestrator wired to the configured HTTP services and history dir.
    pub fn from_config(config: &ClientConfig) -> Result<Self, ScanError> {
        Self::new(Collaborators::from_config(config)?)
    }

    /// Queue a run for a captured image.
    ///
    /// With `detect` false the detection call is skipped and the run takes
    /// the no-damage path.
    pub fn run_from_capture(&self, image: ImageRef, detect: bool) {
        self.shared.last_captured_image.set(Some(image.clone()));
        self.enqueue(Job::Capture { image, detect }, RunKind::Capture);
    }

    /// Queue a run for caller-supplied findings, bypassing detection.
    pub fn run_from_simulated_findings(&self, id: &str, findings_text: &str) {
        self.enqueue(
            Job::Simulated {
                id: id.to_string(),
                findings_text: findings_text.to_string(),
            },
            RunKind::Simulated,
        );
    }

    /// Force the status back to `Idle`. A run in flight keeps going.
    pub fn reset_to_idle(&self) {
        self.shared.status.reset();
    }

    /// Make `identifier` the active identity.
    ///
    /// The display name is always republished; history is reloaded only
    /// when the sanitized key changes.
    pub fn switch_identity(&self, identifier: Option<&str>) {
        let next = Identity::from_identifier(identifier);

        // Name, key and history change together under the session lock
        let mut identity = self.shared.identity.lock();
        self.shared.display_name.set(next.display_name.clone());
        if identity.key == next.key {
            *identity = next;
            return;
        }

        let history = self.shared.history_store.load(&next.key);
        log::info!(
            "IDENTITY_SWITCHED from={} to={} items={}",
            identity.key,
            next.key,
            history.len()
        );
        *identity = next;
        self.shared.history.set(history);
    }

    /// Block until every run queued before this call has finished.
    pub fn flush(&self) {
        let (tx, rx) = mpsc::channel();
        if self.send(Job::Flush(tx)).is_ok() {
            let _ = rx.recv();
        }
    }

    pub fn identity(&self) -> Identity {
        self.shared.identity.lock().clone()
    }

    pub fn current_status(&self) -> ScanStatus {
        self.shared.status.current()
    }

    pub fn subscribe_status(&self) -> Subscription<ScanStatus> {
        self.shared.status.subscribe()
    }

    pub fn history(&self) -> Vec<HistoryItem> {
        self.shared.history.get()
    }

    /// History of the active identity, newest first.
    pub fn subscribe_history(&self) -> Subscription<Vec<HistoryItem>> {
        self.shared.history.subscribe()
    }

    pub fn latest_result(&self) -> Option<ScanResult> {
        self.shared.latest_result.get()
    }

    pub fn subscribe_latest_result(&self) -> Subscription<Option<ScanResult>> {
        self.shared.latest_result.subscribe()
    }

    pub fn subscribe_display_name(&self) -> Subscription<String> {
        self.shared.display_name.subscribe()
    }

    pub fn subscribe_last_captured_image(&self) -> Subscription<Option<ImageRef>> {
        self.shared.last_captured_image.subscribe()
    }

    fn send(&self, job: Job) -> Result<(), ScanError> {
        self.jobs
            .as_ref()
            .ok_or(ScanError::WorkerUnavailable)?
            .send(job)
            .map_err(|_| ScanError::WorkerUnavailable)
    }

    fn enqueue(&self, job: Job, kind: RunKind) {
        if let Err(e) = self.send(job) {
            log::error!("RUN_REJECTED kind={} error={}", kind.as_str(), e);
            self.shared
                .status
                .emit(ScanStatus::error(e.status_message(kind.failure_prefix())));
        }
    }
}

impl Drop for ScanOrchestrator {
    fn drop(&mut self) {
        // Closing the queue lets the worker finish what is already queued
        drop(self.jobs.take());
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                log::error!("ORCHESTRATOR_WORKER_PANICKED");
            }
        }
    }
}

fn worker_loop(shared: Arc<Shared>, jobs: Receiver<Job>) {
    for job in jobs {
        match job {
            Job::Capture { image, detect } => {
                let run = RunContext::capture(Utc::now());
                shared.execute(&run, |ctx| shared.run_capture(&run, image, detect, ctx));
            }
            Job::Simulated { id, findings_text } => {
                let run = RunContext::simulated(&id, Utc::now());
                shared.execute(&run, |ctx| shared.run_simulated(&run, findings_text, ctx));
            }
            Job::Flush(done) => {
                let _ = done.send(());
            }
        }
    }
    log::info!("ORCHESTRATOR_STOPPED");
}

impl Shared {
    /// Run one pipeline and publish its terminal status.
    ///
    /// Errors and panics end this run only.
    fn execute<F>(&self, run: &RunContext, pipeline: F)
    where
        F: FnOnce(&LogContext) -> Result<ScanResult, ScanError>,
    {
        let ctx = run.log_context(&self.identity.lock().key);
        log::info!("{} RUN_START kind={}", ctx, run.kind.as_str());

        let status = match panic::catch_unwind(AssertUnwindSafe(|| pipeline(&ctx))) {
            Ok(Ok(result)) => {
                log::info!(
                    "{} RUN_COMPLETE id={} severity={}",
                    ctx,
                    result.id,
                    result.severity_key
                );
                ScanStatus::Success { result }
            }
            Ok(Err(e)) => {
                log::error!("{} RUN_FAILED error={}", ctx, e);
                ScanStatus::error(e.status_message(run.kind.failure_prefix()))
            }
            Err(payload) => {
                let reason = panic_message(payload.as_ref());
                log::error!("{} RUN_PANICKED reason={}", ctx, reason);
                ScanStatus::error(format!("{}: {}", run.kind.failure_prefix(), reason))
            }
        };

        self.status.emit(status);
    }

    fn run_capture(
        &self,
        run: &RunContext,
        image: ImageRef,
        detect: bool,
        ctx: &LogContext,
    ) -> Result<ScanResult, ScanError> {
        let jpeg = self
            .images
            .load_jpeg(&image)
            .map_err(|e| ScanError::Decode {
                image: image.to_string(),
                reason: format!("{:#}", e),
            })?;

        let detections = if detect {
            self.status.emit(ScanStatus::processing(DETECTING_MESSAGE));
            self.detection.detect(&jpeg, ctx)
        } else {
            log::debug!("{} DETECTION_SKIPPED", ctx);
            Vec::new()
        };

        let message = match detections.first() {
            Some(top) => detection_message(top, false),
            None => detection_message(&normal_detection(), true),
        };
        self.status.emit(ScanStatus::processing(message));

        let snapshot = RunSnapshot {
            run_id: run.run_id.clone(),
            findings_text: findings_summary(&detections),
            image: Some(image),
        };
        self.submit_and_record(snapshot, ctx)
    }

    fn run_simulated(
        &self,
        run: &RunContext,
        findings_text: String,
        ctx: &LogContext,
    ) -> Result<ScanResult, ScanError> {
        self.last_captured_image.set(None);
        self.status
            .emit(ScanStatus::processing(simulation_message(&findings_text)));

        let snapshot = RunSnapshot {
            run_id: run.run_id.clone(),
            findings_text,
            image: None,
        };
        self.submit_and_record(snapshot, ctx)
    }

    fn submit_and_record(
        &self,
        snapshot: RunSnapshot,
        ctx: &LogContext,
    ) -> Result<ScanResult, ScanError> {
        let request = AnalysisRequest::new(&snapshot.run_id, &snapshot.findings_text);
        log::debug!(
            "{} ANALYSIS_SUBMIT findings_len={}",
            ctx,
            request.findings_text.len()
        );

        let report = self.analysis.analyze(&request)?;
        log::info!("{} ANALYSIS_COMPLETE status={:?}", ctx, report.status);

        let result = ScanResult::from_report(snapshot, report, Utc::now().timestamp_millis());
        self.record(&result, ctx)?;
        Ok(result)
    }

    /// Persist to the active identity and publish, atomically with respect
    /// to identity switches.
    fn record(&self, result: &ScanResult, ctx: &LogContext) -> Result<(), ScanError> {
        let identity = self.identity.lock();
        let updated = self
            .history_store
            .append(&identity.key, HistoryItem::from(result))?;
        log::debug!("{} HISTORY_PUBLISHED user={} items={}", ctx, identity.key, updated.len());

        self.history.set(updated);
        self.latest_result.set(Some(result.clone()));
        Ok(())
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unexpected panic".to_string()
    }
}
