//! BrandLens Core Library
//!
//! The critique workflow engine: the declared pipeline, the scheduler that
//! drives it, and the schema normalization layer for collaborator responses.

pub mod collaborator;
pub mod domain;
pub mod events;
pub mod merge;
pub mod normalize;
pub mod pipeline;
pub mod recorder;
pub mod result;
pub mod scheduler;
pub mod telemetry;

pub use collaborator::{CollabResult, Collaborators, CritiqueKind};

pub use domain::{
    strip_data_uri, BoundingBox, BrandContext, CollaboratorError, ColorHarmony, CritiqueRequest,
    Detection, FieldViolation, Frame, FrameSet, LogoDetection, NormalizeError, Palette,
    ReportOutput, Result, RunId, RunStatus, StepFailure, StepId, StepOutput, StepRecord,
    StepStatus, ValidationError, WorkflowError, WorkflowRun, MIN_VIDEO_DATA_LEN,
};

pub use events::WorkflowEvent;

pub use merge::{
    advisor_input, critique_input, detection_input, frame_sample_input, palette_input,
    synthesis_input, AdvisorInput, CritiqueInput, DetectionInput, DetectionSummary,
    FrameSampleInput, FrameSummary, PaletteInput, SynthesisInput,
};

pub use normalize::NormalizeMode;

pub use pipeline::{Phase, StepSpec, PIPELINE};

pub use recorder::RunRecorder;

pub use result::{assemble, blob_summary};

pub use scheduler::{run_workflow, WorkflowOptions, FALLBACK_VALIDATION_PROMPT};

pub use telemetry::init_tracing;

/// BrandLens version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
