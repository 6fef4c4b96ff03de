//! Typed inter-phase merges.
//!
//! Hand-offs between pipeline phases are named functions over typed
//! inputs, not ad hoc map munging. Each builder assembles exactly what
//! the downstream collaborator needs from the initial request plus the
//! upstream outputs; the merges themselves make no calls and record no
//! step.

use serde::Serialize;

use crate::collaborator::CritiqueKind;
use crate::domain::{
    BrandContext, ColorHarmony, CritiqueRequest, Detection, Frame, FrameSet, LogoDetection,
    ReportOutput,
};

/// Input for the five fan-out critique calls.
///
/// Only the visual-style critique receives the brand logo and product
/// image references; the other perspectives see the video and context
/// alone.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CritiqueInput {
    pub video_data: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub brand_logo_data: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product_image_data: Option<String>,
    pub brand_context: BrandContext,
}

/// Input for the frame-sampling call.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FrameSampleInput {
    pub video_data: String,
    pub sampling_rate_fps: f64,
}

/// Merged input for logo detection: frames plus the logo reference and
/// brand context from the initial request.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DetectionInput {
    pub frames: Vec<Frame>,
    pub brand_logo_data: String,
    pub brand_context: BrandContext,
}

impl DetectionInput {
    /// Fail-fast check run before the detection call is made.
    ///
    /// Returns the first problem found, in field order, as the message
    /// the detection step fails with.
    pub fn validate(&self) -> Result<(), String> {
        if self.frames.is_empty() {
            return Err("no frames available for logo detection".into());
        }
        if self.brand_logo_data.trim().is_empty() {
            return Err("brand logo reference is missing".into());
        }
        if self.brand_context.company_name.trim().is_empty() {
            return Err("brandContext.companyName is empty".into());
        }
        if self.brand_context.product_name.trim().is_empty() {
            return Err("brandContext.productName is empty".into());
        }
        Ok(())
    }
}

/// Merged input for the colour-harmony comparison.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PaletteInput {
    pub frames: Vec<Frame>,
    pub detections: Vec<Detection>,
    pub brand_logo_data: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product_image_data: Option<String>,
    pub brand_context: BrandContext,
}

/// Condensed view of a frame set, sent downstream in place of the
/// frames themselves.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FrameSummary {
    pub total_frames: u32,
    pub duration_seconds: f64,
    pub source_fps: f64,
    pub sampling_rate_fps: f64,
}

impl From<&FrameSet> for FrameSummary {
    fn from(frames: &FrameSet) -> Self {
        FrameSummary {
            total_frames: frames.total_frames,
            duration_seconds: frames.duration_seconds,
            source_fps: frames.source_fps,
            sampling_rate_fps: frames.sampling_rate_fps,
        }
    }
}

/// Condensed view of the logo-detection outcome.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DetectionSummary {
    pub found: bool,
    pub detection_count: u32,
    pub method_used: Option<String>,
    pub top_confidence: Option<f64>,
    pub notes: Option<String>,
}

impl From<&LogoDetection> for DetectionSummary {
    fn from(detection: &LogoDetection) -> Self {
        let top_confidence = detection
            .primary_detection
            .as_ref()
            .map(|d| d.confidence)
            .or_else(|| {
                detection
                    .detections
                    .iter()
                    .map(|d| d.confidence)
                    .fold(None, |best, c| Some(best.map_or(c, |b: f64| b.max(c))))
            });
        DetectionSummary {
            found: detection.found,
            detection_count: detection.detections.len() as u32,
            method_used: detection.method_used.clone(),
            top_confidence,
            notes: detection.notes.clone(),
        }
    }
}

/// Fan-in input for the synthesizer: the upstream reports and analysis
/// outputs, with bulky frame data reduced to a summary.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SynthesisInput {
    pub overall_report: serde_json::Value,
    pub visual_report: serde_json::Value,
    pub audio_report: serde_json::Value,
    pub frame_summary: FrameSummary,
    pub logo_detection: DetectionSummary,
    pub color_harmony: ColorHarmony,
    pub brand_context: BrandContext,
}

/// Input for the final advisory call.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AdvisorInput {
    pub synthesis_report: serde_json::Value,
    pub safety_ethics_report: serde_json::Value,
    pub message_clarity_report: serde_json::Value,
    pub brand_context: BrandContext,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original_prompt: Option<String>,
}

/// Build the input for one critique perspective.
pub fn critique_input(kind: CritiqueKind, request: &CritiqueRequest) -> CritiqueInput {
    let wants_imagery = kind == CritiqueKind::VisualStyle;
    CritiqueInput {
        video_data: request.video_data.clone(),
        brand_logo_data: wants_imagery.then(|| request.brand_logo_data.clone()),
        product_image_data: if wants_imagery {
            request.product_image_data.clone()
        } else {
            None
        },
        brand_context: request.brand_context.clone(),
    }
}

/// Build the frame-sampling input.
pub fn frame_sample_input(request: &CritiqueRequest, sampling_rate_fps: f64) -> FrameSampleInput {
    FrameSampleInput {
        video_data: request.video_data.clone(),
        sampling_rate_fps,
    }
}

/// Merge-1: frames plus logo reference, feeding logo detection.
pub fn detection_input(frames: &FrameSet, request: &CritiqueRequest) -> DetectionInput {
    DetectionInput {
        frames: frames.frames.clone(),
        brand_logo_data: request.brand_logo_data.clone(),
        brand_context: request.brand_context.clone(),
    }
}

/// Merge-2: frames plus detections, feeding the colour comparison.
pub fn palette_input(
    frames: &FrameSet,
    detection: &LogoDetection,
    request: &CritiqueRequest,
) -> PaletteInput {
    PaletteInput {
        frames: frames.frames.clone(),
        detections: detection.detections.clone(),
        brand_logo_data: request.brand_logo_data.clone(),
        product_image_data: request.product_image_data.clone(),
        brand_context: request.brand_context.clone(),
    }
}

/// Merge-3: everything the synthesizer fans in over.
#[allow(clippy::too_many_arguments)]
pub fn synthesis_input(
    overall: &ReportOutput,
    visual: &ReportOutput,
    audio: &ReportOutput,
    frames: &FrameSet,
    detection: &LogoDetection,
    colors: &ColorHarmony,
    request: &CritiqueRequest,
) -> SynthesisInput {
    SynthesisInput {
        overall_report: overall.report.clone(),
        visual_report: visual.report.clone(),
        audio_report: audio.report.clone(),
        frame_summary: FrameSummary::from(frames),
        logo_detection: DetectionSummary::from(detection),
        color_harmony: colors.clone(),
        brand_context: request.brand_context.clone(),
    }
}

/// Final merge: synthesizer plus the two content reviews.
pub fn advisor_input(
    synthesis: &ReportOutput,
    safety: &ReportOutput,
    clarity: &ReportOutput,
    request: &CritiqueRequest,
) -> AdvisorInput {
    AdvisorInput {
        synthesis_report: synthesis.report.clone(),
        safety_ethics_report: safety.report.clone(),
        message_clarity_report: clarity.report.clone(),
        brand_context: request.brand_context.clone(),
        original_prompt: request.original_prompt.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn request() -> CritiqueRequest {
        serde_json::from_value(json!({
            "videoData": "v".repeat(120),
            "brandLogoData": "logo-bytes",
            "productImageData": "product-bytes",
            "brandContext": {
                "companyName": "Acme",
                "productName": "Rocket Skates",
                "briefPrompt": "launch teaser"
            },
            "originalPrompt": "make it pop"
        }))
        .unwrap()
    }

    fn frame(index: u32) -> Frame {
        Frame {
            index,
            timestamp_seconds: index as f64 * 0.5,
            image_data: format!("frame-{index}"),
        }
    }

    #[test]
    fn test_only_visual_style_carries_imagery() {
        let req = request();
        let visual = critique_input(CritiqueKind::VisualStyle, &req);
        assert_eq!(visual.brand_logo_data.as_deref(), Some("logo-bytes"));
        assert_eq!(visual.product_image_data.as_deref(), Some("product-bytes"));

        let overall = critique_input(CritiqueKind::Overall, &req);
        assert!(overall.brand_logo_data.is_none());
        assert!(overall.product_image_data.is_none());

        let wire = serde_json::to_value(&overall).unwrap();
        assert!(wire.get("brandLogoData").is_none(), "absent, not null");
    }

    #[test]
    fn test_detection_input_validation_order() {
        let req = request();
        let mut input = DetectionInput {
            frames: Vec::new(),
            brand_logo_data: String::new(),
            brand_context: req.brand_context.clone(),
        };
        assert_eq!(
            input.validate().unwrap_err(),
            "no frames available for logo detection"
        );

        input.frames.push(frame(0));
        assert_eq!(
            input.validate().unwrap_err(),
            "brand logo reference is missing"
        );

        input.brand_logo_data = "logo-bytes".into();
        assert!(input.validate().is_ok());
    }

    #[test]
    fn test_detection_input_rejects_blank_context() {
        let mut req = request();
        req.brand_context.company_name = "   ".into();
        let frames = FrameSet {
            frames: vec![frame(0)],
            total_frames: 1,
            duration_seconds: 0.5,
            source_fps: 24.0,
            sampling_rate_fps: 2.0,
            warnings: Vec::new(),
        };
        let input = detection_input(&frames, &req);
        assert_eq!(
            input.validate().unwrap_err(),
            "brandContext.companyName is empty"
        );
    }

    #[test]
    fn test_detection_summary_prefers_primary_confidence() {
        let mk = |confidence: f64| Detection {
            frame_index: 0,
            timestamp_seconds: 0.0,
            method: "template".into(),
            confidence,
            bounding_box: None,
            crop_image: None,
            notes: None,
        };
        let detection = LogoDetection {
            found: true,
            detections: vec![mk(0.4), mk(0.9)],
            primary_detection: Some(mk(0.7)),
            method_used: Some("template".into()),
            notes: None,
            warnings: Vec::new(),
        };
        let summary = DetectionSummary::from(&detection);
        assert_eq!(summary.top_confidence, Some(0.7));
        assert_eq!(summary.detection_count, 2);

        let no_primary = LogoDetection {
            primary_detection: None,
            ..detection
        };
        assert_eq!(DetectionSummary::from(&no_primary).top_confidence, Some(0.9));
    }

    #[test]
    fn test_synthesis_input_serializes_camel_case() {
        let req = request();
        let frames = FrameSet {
            frames: vec![frame(0), frame(1)],
            total_frames: 2,
            duration_seconds: 1.0,
            source_fps: 24.0,
            sampling_rate_fps: 2.0,
            warnings: Vec::new(),
        };
        let detection = LogoDetection {
            found: false,
            detections: Vec::new(),
            primary_detection: None,
            method_used: None,
            notes: None,
            warnings: Vec::new(),
        };
        let colors = ColorHarmony {
            overall_score: 0.5,
            color_alignment_score: 0.5,
            frame_colors: crate::domain::Palette::empty(),
            brand_logo_colors: crate::domain::Palette::empty(),
            detected_logo_colors: None,
            analysis: String::new(),
            recommendations: Vec::new(),
            warnings: Vec::new(),
        };
        let report = ReportOutput {
            report: json!({"score": 7}),
            prompt: String::new(),
            warnings: Vec::new(),
        };
        let input = synthesis_input(&report, &report, &report, &frames, &detection, &colors, &req);
        let wire = serde_json::to_value(&input).unwrap();
        assert_eq!(wire["frameSummary"]["totalFrames"], 2);
        assert_eq!(wire["logoDetection"]["detectionCount"], 0);
        assert_eq!(wire["overallReport"]["score"], 7);
        assert_eq!(wire["brandContext"]["companyName"], "Acme");
    }
}
