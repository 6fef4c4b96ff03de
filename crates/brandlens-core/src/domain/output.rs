//! Canonical step output shapes.
//!
//! Every collaborator response is normalized into one of these variants
//! before it enters the pipeline; nothing downstream ever sees a raw
//! response. Field names here are the wire names (camelCase).

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Output of every language-model-backed critique step.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ReportOutput {
    /// Structured report body. When the collaborator returned prose instead
    /// of JSON, this holds `{"rawText": ...}` and a warning is recorded.
    pub report: Value,
    pub prompt: String,
    pub warnings: Vec<String>,
}

/// One sampled video frame.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Frame {
    pub index: u32,
    pub timestamp_seconds: f64,
    /// Base64-encoded frame image.
    pub image_data: String,
}

/// Output of the frame-sampling step.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FrameSet {
    pub frames: Vec<Frame>,
    pub total_frames: u32,
    pub duration_seconds: f64,
    pub source_fps: f64,
    pub sampling_rate_fps: f64,
    pub warnings: Vec<String>,
}

/// Normalized logo bounding box, coordinates relative to frame size.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct BoundingBox {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// One logo sighting in one frame.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Detection {
    pub frame_index: u32,
    pub timestamp_seconds: f64,
    /// Detection method that produced this hit (e.g. "template", "clip").
    pub method: String,
    pub confidence: f64,
    pub bounding_box: Option<BoundingBox>,
    /// Base64 crop of the detected region, when the detector provides one.
    pub crop_image: Option<String>,
    pub notes: Option<String>,
}

/// Output of the logo-detection step.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LogoDetection {
    pub found: bool,
    pub detections: Vec<Detection>,
    pub primary_detection: Option<Detection>,
    pub method_used: Option<String>,
    pub notes: Option<String>,
    pub warnings: Vec<String>,
}

/// A small color palette, colors as hex strings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Palette {
    pub dominant_colors: Vec<String>,
    pub secondary_colors: Vec<String>,
    pub count: u32,
}

impl Palette {
    /// An empty palette, the declared default when a collaborator omits one.
    pub fn empty() -> Self {
        Self {
            dominant_colors: Vec::new(),
            secondary_colors: Vec::new(),
            count: 0,
        }
    }
}

/// Output of the palette-comparison step.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ColorHarmony {
    pub overall_score: f64,
    pub color_alignment_score: f64,
    pub frame_colors: Palette,
    pub brand_logo_colors: Palette,
    pub detected_logo_colors: Option<Palette>,
    pub analysis: String,
    pub recommendations: Vec<String>,
    pub warnings: Vec<String>,
}

/// Polymorphic step output over the capability set.
///
/// Serialized untagged: the wire shape is the variant's own shape, which is
/// what callers of the original service expect. Deserialization relies on
/// each variant's required fields being disjoint.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum StepOutput {
    Frames(FrameSet),
    Detection(LogoDetection),
    Colors(ColorHarmony),
    Report(ReportOutput),
}

impl StepOutput {
    pub fn as_report(&self) -> Option<&ReportOutput> {
        match self {
            StepOutput::Report(r) => Some(r),
            _ => None,
        }
    }

    pub fn as_frames(&self) -> Option<&FrameSet> {
        match self {
            StepOutput::Frames(f) => Some(f),
            _ => None,
        }
    }

    pub fn as_detection(&self) -> Option<&LogoDetection> {
        match self {
            StepOutput::Detection(d) => Some(d),
            _ => None,
        }
    }

    pub fn as_colors(&self) -> Option<&ColorHarmony> {
        match self {
            StepOutput::Colors(c) => Some(c),
            _ => None,
        }
    }

    /// Warnings carried by the underlying variant.
    pub fn warnings(&self) -> &[String] {
        match self {
            StepOutput::Frames(f) => &f.warnings,
            StepOutput::Detection(d) => &d.warnings,
            StepOutput::Colors(c) => &c.warnings,
            StepOutput::Report(r) => &r.warnings,
        }
    }
}
