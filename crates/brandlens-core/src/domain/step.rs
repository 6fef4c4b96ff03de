//! Pipeline step identity and per-step run state.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::output::StepOutput;

/// Identity of a pipeline step.
///
/// The set is fixed at build time; `Input` is the synthetic record that
/// represents the initial request in the final step list and never executes.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum StepId {
    Input,
    OverallCritic,
    VisualStyle,
    FrameExtraction,
    AudioAnalysis,
    SafetyEthics,
    MessageClarity,
    LogoDetection,
    ColorHarmony,
    Synthesizer,
    Advisor,
}

impl StepId {
    /// Get the step name as a string.
    pub const fn as_str(&self) -> &'static str {
        match self {
            StepId::Input => "input",
            StepId::OverallCritic => "overall-critic",
            StepId::VisualStyle => "visual-style",
            StepId::FrameExtraction => "frame-extraction",
            StepId::AudioAnalysis => "audio-analysis",
            StepId::SafetyEthics => "safety-ethics",
            StepId::MessageClarity => "message-clarity",
            StepId::LogoDetection => "logo-detection",
            StepId::ColorHarmony => "color-harmony",
            StepId::Synthesizer => "synthesizer",
            StepId::Advisor => "advisor",
        }
    }
}

impl std::fmt::Display for StepId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lifecycle state of a step within one run. Never transitions backward.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StepStatus {
    Pending,
    Running,
    Success,
    Failed,
}

impl StepStatus {
    /// Whether the step has reached a final state.
    pub fn is_terminal(&self) -> bool {
        matches!(self, StepStatus::Success | StepStatus::Failed)
    }

    pub const fn as_str(&self) -> &'static str {
        match self {
            StepStatus::Pending => "pending",
            StepStatus::Running => "running",
            StepStatus::Success => "success",
            StepStatus::Failed => "failed",
        }
    }
}

impl std::fmt::Display for StepStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Mutable record of one step within one run.
///
/// `payload` holds the resolved input snapshot the step was given (blob
/// fields summarized, see the result module); `output` is the canonical
/// normalized result once the step succeeds.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StepRecord {
    pub id: StepId,

    pub status: StepStatus,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub started_at: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ended_at: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<Value>,

    /// Canonical output, or null until the step succeeds.
    pub output: Option<StepOutput>,

    #[serde(default)]
    pub warnings: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Value>,
}

impl StepRecord {
    /// Create a pending record for a step.
    pub fn pending(id: StepId) -> Self {
        Self {
            id,
            status: StepStatus::Pending,
            started_at: None,
            ended_at: None,
            payload: None,
            output: None,
            warnings: Vec::new(),
            metadata: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_step_id_wire_names() {
        let json = serde_json::to_string(&StepId::OverallCritic).unwrap();
        assert_eq!(json, "\"overall-critic\"");

        let id: StepId = serde_json::from_str("\"logo-detection\"").unwrap();
        assert_eq!(id, StepId::LogoDetection);

        assert_eq!(StepId::FrameExtraction.as_str(), "frame-extraction");
        assert_eq!(StepId::Input.to_string(), "input");
    }

    #[test]
    fn test_status_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&StepStatus::Pending).unwrap(),
            "\"pending\""
        );
        assert_eq!(
            serde_json::to_string(&StepStatus::Failed).unwrap(),
            "\"failed\""
        );
    }

    #[test]
    fn test_terminal_states() {
        assert!(!StepStatus::Pending.is_terminal());
        assert!(!StepStatus::Running.is_terminal());
        assert!(StepStatus::Success.is_terminal());
        assert!(StepStatus::Failed.is_terminal());
    }

    #[test]
    fn test_pending_record_shape() {
        let record = StepRecord::pending(StepId::Synthesizer);
        assert_eq!(record.status, StepStatus::Pending);
        assert!(record.started_at.is_none());
        assert!(record.output.is_none());
        assert!(record.warnings.is_empty());

        let value = serde_json::to_value(&record).unwrap();
        // Pending records still carry an explicit null output on the wire.
        assert!(value.get("output").is_some());
        assert!(value.get("startedAt").is_none());
    }
}
