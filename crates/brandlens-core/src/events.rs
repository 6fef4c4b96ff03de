//! Incremental run events.
//!
//! One `step` event per completed step, in completion order, then exactly
//! one terminal `complete` or `error` event. The stream carries nothing
//! else; consumers can treat the terminal event as end-of-run.

use serde::{Deserialize, Serialize};

use crate::domain::run::{StepFailure, WorkflowRun};
use crate::domain::step::StepRecord;

/// One frame on the incremental event channel.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "lowercase")]
pub enum WorkflowEvent {
    /// A step reached a terminal state; carries its full record.
    Step(StepRecord),

    /// The run finished successfully; carries the assembled run.
    Complete(Box<WorkflowRun>),

    /// The run failed; carries the failing step and detail message.
    Error(StepFailure),
}

impl WorkflowEvent {
    /// Whether this event ends the stream.
    pub fn is_terminal(&self) -> bool {
        matches!(self, WorkflowEvent::Complete(_) | WorkflowEvent::Error(_))
    }
}
