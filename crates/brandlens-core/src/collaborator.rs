//! The collaborator seam.
//!
//! Every pipeline step delegates its actual analysis to a remote
//! collaborator service. The workflow engine only cares that each call
//! eventually yields a raw JSON document; shaping that document into a
//! typed output is the normaliser's job, not the transport's.

use async_trait::async_trait;
use serde_json::Value;

use crate::domain::{CollaboratorError, StepId};
use crate::merge::{
    AdvisorInput, CritiqueInput, DetectionInput, FrameSampleInput, PaletteInput, SynthesisInput,
};

/// Result alias for collaborator calls.
pub type CollabResult<T> = std::result::Result<T, CollaboratorError>;

/// The five critique perspectives that share one request shape.
///
/// Each variant maps to a distinct remote endpoint but carries the same
/// input: the video plus brand context (visual style additionally
/// receives the reference imagery).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CritiqueKind {
    Overall,
    VisualStyle,
    AudioAnalysis,
    SafetyEthics,
    MessageClarity,
}

impl CritiqueKind {
    /// Path slug of the remote endpoint serving this critique.
    pub const fn slug(&self) -> &'static str {
        match self {
            CritiqueKind::Overall => "overall-critic",
            CritiqueKind::VisualStyle => "visual-style",
            CritiqueKind::AudioAnalysis => "audio-analysis",
            CritiqueKind::SafetyEthics => "safety-ethics",
            CritiqueKind::MessageClarity => "message-clarity",
        }
    }

    /// The pipeline step this critique is recorded under.
    pub const fn step_id(&self) -> StepId {
        match self {
            CritiqueKind::Overall => StepId::OverallCritic,
            CritiqueKind::VisualStyle => StepId::VisualStyle,
            CritiqueKind::AudioAnalysis => StepId::AudioAnalysis,
            CritiqueKind::SafetyEthics => StepId::SafetyEthics,
            CritiqueKind::MessageClarity => StepId::MessageClarity,
        }
    }

    /// All critique kinds, in pipeline declaration order.
    pub const ALL: [CritiqueKind; 5] = [
        CritiqueKind::Overall,
        CritiqueKind::VisualStyle,
        CritiqueKind::AudioAnalysis,
        CritiqueKind::SafetyEthics,
        CritiqueKind::MessageClarity,
    ];
}

impl std::fmt::Display for CritiqueKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.slug())
    }
}

/// Remote analysis services the workflow fans out to.
///
/// Implementations return the collaborator's response body verbatim as
/// [`Value`]; the executor normalises it afterwards. Errors should carry
/// the most specific detail available (HTTP status and body detail for
/// remote failures, transport message otherwise).
#[async_trait]
pub trait Collaborators: Send + Sync {
    /// Run one of the five critique perspectives over the video.
    async fn critique(&self, kind: CritiqueKind, input: &CritiqueInput) -> CollabResult<Value>;

    /// Extract a sampled frame set from the video.
    async fn sample_frames(&self, input: &FrameSampleInput) -> CollabResult<Value>;

    /// Locate the brand logo within the extracted frames.
    async fn detect_logo(&self, input: &DetectionInput) -> CollabResult<Value>;

    /// Compare frame colours against the brand palette.
    async fn compare_colors(&self, input: &PaletteInput) -> CollabResult<Value>;

    /// Merge the upstream reports into a consolidated critique.
    async fn synthesize(&self, input: &SynthesisInput) -> CollabResult<Value>;

    /// Produce the final advisory report.
    async fn advise(&self, input: &AdvisorInput) -> CollabResult<Value>;
}
