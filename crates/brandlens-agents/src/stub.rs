//! Deterministic local collaborators.
//!
//! Stands in for the agents service when it is unreachable or during
//! demos. Responses are canned but plumbed from the inputs (brand name,
//! sampling rate) so full runs look realistic, and they use the remote
//! field spellings so the workflow's normalizer does its usual work.

use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::debug;

use brandlens_core::{
    AdvisorInput, CollabResult, Collaborators, CritiqueInput, CritiqueKind, DetectionInput,
    FrameSampleInput, PaletteInput, SynthesisInput,
};

/// A 1x1 transparent PNG, used wherever a real image would go.
const TINY_PNG: &str =
    "iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAYAAAAfFcSJAAAADUlEQVR42mP8z8BQDwAEhQGAhKmMIQAAAABJRU5ErkJggg==";

/// Canned collaborator set for offline operation.
#[derive(Debug, Default, Clone, Copy)]
pub struct StubAgents;

impl StubAgents {
    pub fn new() -> Self {
        StubAgents
    }
}

#[async_trait]
impl Collaborators for StubAgents {
    async fn critique(&self, kind: CritiqueKind, input: &CritiqueInput) -> CollabResult<Value> {
        debug!(agent = %kind, "serving stubbed critique");
        let company = &input.brand_context.company_name;
        let report = match kind {
            CritiqueKind::Overall => json!({
                "summary": format!("The ad presents {company} competently with room to tighten pacing."),
                "strengths": ["clear product focus", "consistent tone"],
                "weaknesses": ["slow opening two seconds"],
                "score": 7.5
            }),
            CritiqueKind::VisualStyle => json!({
                "style_consistency": 0.8,
                "logo_usage": "logo appears late but legibly",
                "palette_notes": "cool-leaning grade matches the brand",
                "score": 7.0
            }),
            CritiqueKind::AudioAnalysis => json!({
                "voiceover_clarity": 0.9,
                "music_fit": 0.7,
                "issues": [],
                "score": 8.0
            }),
            CritiqueKind::SafetyEthics => json!({
                "concerns": [],
                "claims_check": "no unverifiable claims detected",
                "score": 9.0
            }),
            CritiqueKind::MessageClarity => json!({
                "core_message": format!("{} makes {} feel effortless", company, input.brand_context.product_name),
                "clarity_score": 0.85,
                "score": 8.0
            }),
        };
        Ok(json!({
            "report": report,
            "prompt": format!("stubbed {kind} critique for {company}"),
            "warnings": []
        }))
    }

    async fn sample_frames(&self, input: &FrameSampleInput) -> CollabResult<Value> {
        debug!("serving stubbed frame extraction");
        let rate = if input.sampling_rate_fps > 0.0 {
            input.sampling_rate_fps
        } else {
            2.0
        };
        let frames: Vec<Value> = (0..3)
            .map(|i| {
                json!({
                    "frame_number": i,
                    "timestamp": i as f64 / rate,
                    "image_base64": TINY_PNG
                })
            })
            .collect();
        Ok(json!({
            "frames": frames,
            "total_frames_extracted": 3,
            "video_duration": 3.0 / rate,
            "video_fps": 24.0,
            "extraction_rate": rate,
            "warnings": []
        }))
    }

    async fn detect_logo(&self, input: &DetectionInput) -> CollabResult<Value> {
        debug!(frames = input.frames.len(), "serving stubbed logo detection");
        let mid = input.frames.len() / 2;
        let timestamp = input
            .frames
            .get(mid)
            .map(|f| f.timestamp_seconds)
            .unwrap_or(0.0);
        let hit = json!({
            "frame_number": mid,
            "timestamp": timestamp,
            "method": "template",
            "confidence": 0.82,
            "bounding_box": {"x": 0.62, "y": 0.08, "width": 0.3, "height": 0.12},
            "crop_image_base64": TINY_PNG
        });
        Ok(json!({
            "logo_found": true,
            "detections": [hit.clone()],
            "primary_detection": hit,
            "method_used": "template",
            "notes": "single stable placement in the upper right",
            "warnings": []
        }))
    }

    async fn compare_colors(&self, input: &PaletteInput) -> CollabResult<Value> {
        debug!(
            frames = input.frames.len(),
            detections = input.detections.len(),
            "serving stubbed color harmony"
        );
        Ok(json!({
            "overall_score": 0.74,
            "color_alignment_score": 0.68,
            "frame_colors": {
                "dominant_colors": ["#1b2a4a", "#e8e4da", "#c23b22"],
                "secondary_colors": ["#7a8ba6"],
                "count": 4
            },
            "brand_logo_colors": {
                "dominant_colors": ["#c23b22", "#ffffff"],
                "secondary_colors": [],
                "count": 2
            },
            "logo_colors": {
                "dominant_colors": ["#c03a24"],
                "secondary_colors": [],
                "count": 1
            },
            "analysis": "Frame palette trends cooler than the brand accent; the detected logo red sits within tolerance.",
            "recommendations": ["lift warm accents in mid-video product shots"],
            "warnings": []
        }))
    }

    async fn synthesize(&self, input: &SynthesisInput) -> CollabResult<Value> {
        debug!("serving stubbed synthesis");
        Ok(json!({
            "report": {
                "summary": format!(
                    "Across visual, audio, and brand checks, the {} spot lands mid-to-strong.",
                    input.brand_context.company_name
                ),
                "visual_alignment": 0.74,
                "logo_presence": input.logo_detection.found,
                "frame_count": input.frame_summary.total_frames,
                "key_findings": [
                    "voiceover is the strongest asset",
                    "brand palette alignment is acceptable but improvable"
                ]
            },
            "prompt": "stubbed synthesis over upstream reports",
            "warnings": []
        }))
    }

    async fn advise(&self, input: &AdvisorInput) -> CollabResult<Value> {
        debug!("serving stubbed advisory");
        let product = &input.brand_context.product_name;
        Ok(json!({
            "report": {
                "verdict": "approve with revisions",
                "priority_fixes": [
                    format!("hold the {product} hero shot 0.5s longer"),
                    "warm the mid-video grade toward the brand accent"
                ],
                "scores": {"overall": 7.6, "brand_fit": 7.2}
            },
            "prompt": format!(
                "Keep the voiceover pacing, move the logo reveal earlier, and keep {product} in frame during the closing beat."
            ),
            "warnings": []
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use brandlens_core::normalize::{adapters, NormalizeMode};
    use brandlens_core::{BrandContext, Frame};

    fn context() -> BrandContext {
        BrandContext {
            company_name: "Acme".to_string(),
            product_name: "Rocket Skates".to_string(),
            brief_prompt: None,
        }
    }

    #[tokio::test]
    async fn test_stub_frames_normalize_cleanly() {
        let stub = StubAgents::new();
        let raw = stub
            .sample_frames(&FrameSampleInput {
                video_data: "dmlkZW8=".to_string(),
                sampling_rate_fps: 2.0,
            })
            .await
            .unwrap();

        let frames = adapters::frame_set(&raw, NormalizeMode::Strict).expect("canonical frames");
        assert_eq!(frames.total_frames, 3);
        assert_eq!(frames.frames[2].timestamp_seconds, 1.0);
        assert!(frames.warnings.is_empty());
    }

    #[tokio::test]
    async fn test_stub_detection_normalizes_cleanly() {
        let stub = StubAgents::new();
        let input = DetectionInput {
            frames: vec![Frame {
                index: 0,
                timestamp_seconds: 0.0,
                image_data: TINY_PNG.to_string(),
            }],
            brand_logo_data: TINY_PNG.to_string(),
            brand_context: context(),
        };
        let raw = stub.detect_logo(&input).await.unwrap();

        let detection =
            adapters::logo_detection(&raw, NormalizeMode::Strict).expect("canonical detection");
        assert!(detection.found);
        assert_eq!(detection.detections.len(), 1);
        assert!(detection.primary_detection.is_some());
    }

    #[tokio::test]
    async fn test_stub_critique_mentions_the_brand() {
        let stub = StubAgents::new();
        let input = CritiqueInput {
            video_data: "dmlkZW8=".to_string(),
            brand_logo_data: None,
            product_image_data: None,
            brand_context: context(),
        };
        let raw = stub.critique(CritiqueKind::Overall, &input).await.unwrap();

        let report = adapters::report(&raw, NormalizeMode::Strict).expect("canonical report");
        let summary = report.report["summary"].as_str().unwrap();
        assert!(summary.contains("Acme"));
    }
}
