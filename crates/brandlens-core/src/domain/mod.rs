//! Domain models for BrandLens.
//!
//! Canonical definitions for the core entities:
//! - `CritiqueRequest` / `BrandContext`: the immutable initial request
//! - `StepId` / `StepRecord`: pipeline step identity and per-run state
//! - `StepOutput`: the canonical output variants
//! - `WorkflowRun`: the assembled result of one run

pub mod context;
pub mod error;
pub mod output;
pub mod run;
pub mod step;

// Re-export main types and errors
pub use context::{strip_data_uri, BrandContext, CritiqueRequest, MIN_VIDEO_DATA_LEN};
pub use error::{
    CollaboratorError, FieldViolation, NormalizeError, Result, ValidationError, WorkflowError,
};
pub use output::{
    BoundingBox, ColorHarmony, Detection, Frame, FrameSet, LogoDetection, Palette, ReportOutput,
    StepOutput,
};
pub use run::{RunId, RunStatus, StepFailure, WorkflowRun};
pub use step::{StepId, StepRecord, StepStatus};
