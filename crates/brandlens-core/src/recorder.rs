//! Run state tracking.
//!
//! One [`RunRecorder`] exists per workflow run. It owns every step's
//! record slot, enforces forward-only status transitions, and mirrors
//! each terminal step transition onto the event channel when one is
//! attached. The recorder is the only shared mutable state in a run;
//! callers serialise access through a lock.

use chrono::Utc;
use serde_json::{json, Value};
use tokio::sync::mpsc;
use tracing::debug;

use crate::domain::{RunId, RunStatus, StepFailure, StepId, StepOutput, StepRecord, StepStatus};
use crate::events::WorkflowEvent;
use crate::pipeline::{self, PIPELINE};

/// Mutable state of an in-flight run.
#[derive(Debug)]
pub struct RunRecorder {
    run_id: RunId,
    records: Vec<StepRecord>,
    status: RunStatus,
    failure: Option<StepFailure>,
    events: Option<mpsc::Sender<WorkflowEvent>>,
}

impl RunRecorder {
    /// Create a recorder with one pending record per pipeline step.
    pub fn new(run_id: RunId, events: Option<mpsc::Sender<WorkflowEvent>>) -> Self {
        let records = PIPELINE
            .iter()
            .map(|spec| StepRecord::pending(spec.id))
            .collect();
        RunRecorder {
            run_id,
            records,
            status: RunStatus::Running,
            failure: None,
            events,
        }
    }

    pub fn run_id(&self) -> RunId {
        self.run_id
    }

    pub fn status(&self) -> RunStatus {
        self.status
    }

    pub fn failure(&self) -> Option<&StepFailure> {
        self.failure.as_ref()
    }

    pub fn record(&self, id: StepId) -> Option<&StepRecord> {
        self.records.iter().find(|r| r.id == id)
    }

    /// Clone of a step's normalised output, if it succeeded.
    pub fn cloned_output(&self, id: StepId) -> Option<StepOutput> {
        self.record(id).and_then(|r| r.output.clone())
    }

    /// True when every declared dependency of `id` is `success`.
    pub fn deps_met(&self, id: StepId) -> bool {
        pipeline::spec(id).is_some_and(|spec| {
            spec.depends_on.iter().all(|dep| {
                self.record(*dep)
                    .is_some_and(|r| r.status == StepStatus::Success)
            })
        })
    }

    /// Mark a step running and attach its request snapshot.
    ///
    /// Ignored unless the step is still pending.
    pub fn begin(&mut self, id: StepId, payload: Option<Value>) {
        let Some(record) = self.records.iter_mut().find(|r| r.id == id) else {
            return;
        };
        if record.status != StepStatus::Pending {
            debug!(step = %id, status = %record.status, "begin ignored; step already started");
            return;
        }
        record.status = StepStatus::Running;
        record.started_at = Some(Utc::now());
        record.payload = payload;
    }

    /// Mark a running step successful and emit its step event.
    ///
    /// The output's accumulated warnings are copied onto the record.
    pub async fn succeed(&mut self, id: StepId, output: StepOutput) {
        let Some(record) = self.records.iter_mut().find(|r| r.id == id) else {
            return;
        };
        if record.status != StepStatus::Running {
            debug!(step = %id, status = %record.status, "success ignored; step not running");
            return;
        }
        record.status = StepStatus::Success;
        record.ended_at = Some(Utc::now());
        record.warnings.extend(output.warnings().iter().cloned());
        record.output = Some(output);
        let event = WorkflowEvent::Step(record.clone());
        self.emit(event).await;
    }

    /// Mark a running step failed, record the run's first failure, and
    /// emit its step event. Later calls for an already-terminal step
    /// are ignored, so a step is never reported twice.
    pub async fn fail(&mut self, id: StepId, message: impl Into<String>) {
        let message = message.into();
        let Some(record) = self.records.iter_mut().find(|r| r.id == id) else {
            return;
        };
        if record.status.is_terminal() {
            debug!(step = %id, status = %record.status, "failure ignored; step already terminal");
            return;
        }
        record.status = StepStatus::Failed;
        record.ended_at = Some(Utc::now());
        record.metadata = Some(json!({ "error": message.clone() }));
        self.status = RunStatus::Failed;
        if self.failure.is_none() {
            self.failure = Some(StepFailure { step: id, message });
        }
        let event = WorkflowEvent::Step(record.clone());
        self.emit(event).await;
    }

    /// Close out a run that saw no failures.
    pub fn finish(&mut self) {
        if self.status == RunStatus::Running {
            self.status = RunStatus::Success;
        }
    }

    /// Consume the recorder, returning the final state for assembly.
    pub fn into_parts(self) -> (RunStatus, Option<StepFailure>, Vec<StepRecord>) {
        (self.status, self.failure, self.records)
    }

    /// Clone of the final state, for callers still sharing the recorder.
    pub fn snapshot(&self) -> (RunStatus, Option<StepFailure>, Vec<StepRecord>) {
        (self.status, self.failure.clone(), self.records.clone())
    }

    async fn emit(&self, event: WorkflowEvent) {
        if let Some(tx) = &self.events {
            // Receiver may be gone (client hung up); the run carries on.
            let _ = tx.send(event).await;
        }
    }
}
