//! One normalization adapter per collaborator.
//!
//! Each adapter maps a raw response `Value` to the canonical StepOutput
//! variant. Raw shapes never leak past these functions. Warning order in the
//! canonical output: the collaborator's own reported warnings first, then
//! anything the normalizer had to default.

use serde_json::{json, Value};

use super::{Fields, NormalizeMode};
use crate::domain::error::NormalizeError;
use crate::domain::output::{
    BoundingBox, ColorHarmony, Detection, Frame, FrameSet, LogoDetection, Palette, ReportOutput,
};

type Outcome<T> = Result<T, NormalizeError>;

/// Normalize a critique response into a [`ReportOutput`].
///
/// The `report` field may arrive as a JSON object, or as a string holding
/// JSON (possibly wrapped in markdown fences or prose). Unparseable text is
/// preserved under `{"rawText": ...}` with a warning.
pub fn report(raw: &Value, mode: NormalizeMode) -> Outcome<ReportOutput> {
    let mut fields = Fields::over(raw, mode)?;
    let mut extra = Vec::new();

    let report = match fields.opt_value(&["report"]) {
        Some(Value::Object(map)) => Value::Object(map.clone()),
        Some(Value::String(text)) => match extract_json_object(text) {
            Some(parsed) => parsed,
            None => {
                extra.push("report did not contain JSON; returning raw text".to_string());
                json!({ "rawText": text.trim() })
            }
        },
        Some(_) => fields.unusable("report", "expected an object", || json!({}))?,
        None => fields.missing("report", || json!({}))?,
    };

    let prompt = fields.string(&["prompt"], "")?;
    let mut warnings = fields.string_list_or_empty(&["warnings"])?;
    warnings.extend(extra);
    warnings.extend(fields.into_warnings());

    Ok(ReportOutput {
        report,
        prompt,
        warnings,
    })
}

/// Normalize a frame-sampling response into a [`FrameSet`].
pub fn frame_set(raw: &Value, mode: NormalizeMode) -> Outcome<FrameSet> {
    let mut fields = Fields::over(raw, mode)?;
    let mut extra = Vec::new();

    let raw_frames = fields.list(&["frames"])?;
    let mut frames = Vec::with_capacity(raw_frames.len());
    for (i, item) in raw_frames.iter().enumerate() {
        let mut f = Fields::item(item, mode, format!("frames[{i}]"))?;
        let frame = Frame {
            index: f.integer(&["index", "frame_number", "frameNumber"], i as u32)?,
            timestamp_seconds: f.number(&["timestampSeconds", "timestamp"], 0.0)?,
            image_data: f.string(&["imageData", "image_base64", "imageBase64"], "")?,
        };
        extra.extend(f.into_warnings());
        frames.push(frame);
    }

    let total_default = frames.len() as u32;
    let total_frames = fields.integer(
        &["totalFrames", "total_frames_extracted", "totalFramesExtracted"],
        total_default,
    )?;
    let duration_seconds =
        fields.number(&["durationSeconds", "video_duration", "videoDuration"], 0.0)?;
    let source_fps = fields.number(&["sourceFps", "video_fps", "videoFps"], 0.0)?;
    let sampling_rate_fps =
        fields.number(&["samplingRateFps", "extraction_rate", "extractionRate"], 0.0)?;

    let mut warnings = fields.string_list_or_empty(&["warnings"])?;
    warnings.extend(extra);
    warnings.extend(fields.into_warnings());

    Ok(FrameSet {
        frames,
        total_frames,
        duration_seconds,
        source_fps,
        sampling_rate_fps,
        warnings,
    })
}

/// Normalize a detection response into a [`LogoDetection`].
pub fn logo_detection(raw: &Value, mode: NormalizeMode) -> Outcome<LogoDetection> {
    let mut fields = Fields::over(raw, mode)?;
    let mut extra = Vec::new();

    let found = fields.boolean(&["found", "logo_found", "logoFound"], false)?;

    let raw_detections = fields.list(&["detections"])?;
    let mut detections = Vec::with_capacity(raw_detections.len());
    for (i, item) in raw_detections.iter().enumerate() {
        let (det, w) = detection_item(item, mode, format!("detections[{i}]"))?;
        extra.extend(w);
        detections.push(det);
    }

    let primary_detection = match fields.opt_value(&["primaryDetection", "primary_detection"]) {
        Some(v) => {
            let (det, w) = detection_item(v, mode, "primaryDetection".to_string())?;
            extra.extend(w);
            Some(det)
        }
        None => None,
    };

    let method_used = fields.opt_string(&["methodUsed", "method_used"])?;
    let notes = fields.opt_string(&["notes"])?;

    let mut warnings = fields.string_list_or_empty(&["warnings"])?;
    warnings.extend(extra);
    warnings.extend(fields.into_warnings());

    Ok(LogoDetection {
        found,
        detections,
        primary_detection,
        method_used,
        notes,
        warnings,
    })
}

fn detection_item(value: &Value, mode: NormalizeMode, prefix: String) -> Outcome<(Detection, Vec<String>)> {
    let bbox_prefix = format!("{prefix}.boundingBox");
    let mut f = Fields::item(value, mode, prefix)?;
    let mut extra = Vec::new();

    let bounding_box = match f.opt_value(&["boundingBox", "bounding_box"]) {
        Some(v) => {
            let mut b = Fields::item(v, mode, bbox_prefix)?;
            let bbox = BoundingBox {
                x: b.unit_score(&["x"], 0.0)?,
                y: b.unit_score(&["y"], 0.0)?,
                width: b.unit_score(&["width"], 0.0)?,
                height: b.unit_score(&["height"], 0.0)?,
            };
            extra.extend(b.into_warnings());
            Some(bbox)
        }
        None => None,
    };

    let det = Detection {
        frame_index: f.integer(&["frameIndex", "frame_number", "frameNumber"], 0)?,
        timestamp_seconds: f.number(&["timestampSeconds", "timestamp"], 0.0)?,
        method: f.string(&["method"], "")?,
        confidence: f.unit_score(&["confidence"], 0.0)?,
        bounding_box,
        crop_image: f.opt_string(&["cropImage", "crop_image_base64", "cropImageBase64"])?,
        notes: f.opt_string(&["notes"])?,
    };
    extra.extend(f.into_warnings());
    Ok((det, extra))
}

/// Normalize a palette-comparison response into a [`ColorHarmony`].
pub fn color_harmony(raw: &Value, mode: NormalizeMode) -> Outcome<ColorHarmony> {
    let mut fields = Fields::over(raw, mode)?;
    let mut extra = Vec::new();

    let overall_score = fields.unit_score(&["overallScore", "overall_score"], 0.0)?;
    let color_alignment_score =
        fields.unit_score(&["colorAlignmentScore", "color_alignment_score"], 0.0)?;

    let frame_colors = match fields.opt_value(&["frameColors", "frame_colors"]) {
        Some(v) => {
            let (p, w) = palette(v, mode, "frameColors")?;
            extra.extend(w);
            p
        }
        None => fields.missing("frameColors", Palette::empty)?,
    };

    let brand_logo_colors = match fields.opt_value(&["brandLogoColors", "brand_logo_colors"]) {
        Some(v) => {
            let (p, w) = palette(v, mode, "brandLogoColors")?;
            extra.extend(w);
            p
        }
        None => fields.missing("brandLogoColors", Palette::empty)?,
    };

    let detected_logo_colors =
        match fields.opt_value(&["detectedLogoColors", "logo_colors", "logoColors"]) {
            Some(v) => {
                let (p, w) = palette(v, mode, "detectedLogoColors")?;
                extra.extend(w);
                Some(p)
            }
            None => None,
        };

    let analysis = fields.string(&["analysis"], "")?;
    let recommendations = fields.string_list_or_empty(&["recommendations"])?;

    let mut warnings = fields.string_list_or_empty(&["warnings"])?;
    warnings.extend(extra);
    warnings.extend(fields.into_warnings());

    Ok(ColorHarmony {
        overall_score,
        color_alignment_score,
        frame_colors,
        brand_logo_colors,
        detected_logo_colors,
        analysis,
        recommendations,
        warnings,
    })
}

fn palette(value: &Value, mode: NormalizeMode, prefix: &str) -> Outcome<(Palette, Vec<String>)> {
    let mut f = Fields::item(value, mode, prefix)?;
    let dominant_colors = f.string_list(&["dominantColors", "dominant_colors"])?;
    let secondary_colors = f.string_list_or_empty(&["secondaryColors", "secondary_colors"])?;
    let count_default = (dominant_colors.len() + secondary_colors.len()) as u32;
    let count = f.integer(&["count", "color_count", "colorCount"], count_default)?;
    let palette = Palette {
        dominant_colors,
        secondary_colors,
        count,
    };
    Ok((palette, f.into_warnings()))
}

/// Pull a JSON object out of model text: strip markdown fences, then parse
/// the outermost `{...}` span.
fn extract_json_object(text: &str) -> Option<Value> {
    let mut cleaned = text.trim();
    if let Some(rest) = cleaned.strip_prefix("```json") {
        cleaned = rest;
    } else if let Some(rest) = cleaned.strip_prefix("```") {
        cleaned = rest;
    }
    if let Some(rest) = cleaned.trim_end().strip_suffix("```") {
        cleaned = rest;
    }
    let cleaned = cleaned.trim();

    let start = cleaned.find('{')?;
    let end = cleaned.rfind('}')?;
    if end < start {
        return None;
    }
    serde_json::from_str(&cleaned[start..=end]).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_report_accepts_object_body() {
        let raw = json!({
            "report": {"brandAlignment": {"score": 0.8}},
            "prompt": "critique this ad",
            "warnings": []
        });
        let out = report(&raw, NormalizeMode::Strict).unwrap();
        assert_eq!(out.report["brandAlignment"]["score"], json!(0.8));
        assert_eq!(out.prompt, "critique this ad");
        assert!(out.warnings.is_empty());
    }

    #[test]
    fn test_report_parses_fenced_json_string() {
        let raw = json!({
            "report": "```json\n{\"overallImpression\": \"solid\"}\n```",
            "prompt": "p",
            "warnings": []
        });
        let out = report(&raw, NormalizeMode::Strict).unwrap();
        assert_eq!(out.report["overallImpression"], json!("solid"));
    }

    #[test]
    fn test_report_keeps_raw_text_when_not_json() {
        let raw = json!({
            "report": "The ad looks great overall.",
            "prompt": "p"
        });
        let out = report(&raw, NormalizeMode::Lenient).unwrap();
        assert_eq!(out.report["rawText"], json!("The ad looks great overall."));
        assert!(out
            .warnings
            .iter()
            .any(|w| w.contains("did not contain JSON")));
    }

    #[test]
    fn test_report_missing_report_field() {
        let raw = json!({"prompt": "p"});

        let lenient = report(&raw, NormalizeMode::Lenient).unwrap();
        assert_eq!(lenient.report, json!({}));
        assert!(lenient.warnings.iter().any(|w| w.contains("report")));

        assert!(report(&raw, NormalizeMode::Strict).is_err());
    }

    #[test]
    fn test_frame_set_from_snake_case_response() {
        // Shape as the remote analysis service actually sends it.
        let raw = json!({
            "frames": [
                {"frame_number": 0, "timestamp": 0.0, "image_base64": "AAAA"},
                {"frame_number": 1, "timestamp": 0.5, "image_base64": "BBBB"}
            ],
            "total_frames_extracted": 2,
            "video_duration": 4.2,
            "video_fps": 24.0,
            "extraction_rate": 2.0,
            "warnings": ["low resolution"]
        });
        let out = frame_set(&raw, NormalizeMode::Strict).unwrap();
        assert_eq!(out.frames.len(), 2);
        assert_eq!(out.frames[1].index, 1);
        assert_eq!(out.frames[1].timestamp_seconds, 0.5);
        assert_eq!(out.frames[1].image_data, "BBBB");
        assert_eq!(out.total_frames, 2);
        assert_eq!(out.duration_seconds, 4.2);
        assert_eq!(out.warnings, vec!["low resolution"]);
    }

    #[test]
    fn test_frame_set_total_defaults_to_frame_count() {
        let raw = json!({
            "frames": [{"index": 0, "timestampSeconds": 0.0, "imageData": "AAAA"}],
            "durationSeconds": 1.0,
            "sourceFps": 30.0,
            "samplingRateFps": 2.0
        });
        let out = frame_set(&raw, NormalizeMode::Lenient).unwrap();
        assert_eq!(out.total_frames, 1);
        assert!(out.warnings.iter().any(|w| w.contains("totalFrames")));
    }

    #[test]
    fn test_logo_detection_from_snake_case_response() {
        let raw = json!({
            "logo_found": true,
            "detections": [{
                "frame_number": 3,
                "timestamp": 1.5,
                "method": "template",
                "confidence": 0.82,
                "bounding_box": {"x": 0.1, "y": 0.2, "width": 0.3, "height": 0.25},
                "crop_image_base64": "Q0NDQw=="
            }],
            "primary_detection": {
                "frame_number": 3,
                "timestamp": 1.5,
                "method": "template",
                "confidence": 0.82
            },
            "method_used": "template",
            "warnings": []
        });
        let out = logo_detection(&raw, NormalizeMode::Strict).unwrap();
        assert!(out.found);
        assert_eq!(out.detections.len(), 1);
        assert_eq!(out.detections[0].frame_index, 3);
        assert_eq!(out.detections[0].confidence, 0.82);
        let bbox = out.detections[0].bounding_box.unwrap();
        assert_eq!(bbox.width, 0.3);
        assert_eq!(out.detections[0].crop_image.as_deref(), Some("Q0NDQw=="));
        assert_eq!(out.primary_detection.as_ref().unwrap().frame_index, 3);
        assert_eq!(out.method_used.as_deref(), Some("template"));
    }

    #[test]
    fn test_detection_missing_list_becomes_empty() {
        let raw = json!({"logo_found": false});
        let out = logo_detection(&raw, NormalizeMode::Lenient).unwrap();
        assert!(!out.found);
        assert!(out.detections.is_empty());
        assert!(out.warnings.iter().any(|w| w.contains("detections")));
    }

    #[test]
    fn test_color_harmony_from_snake_case_response() {
        let raw = json!({
            "overall_score": 0.71,
            "color_alignment_score": 0.66,
            "frame_colors": {"dominant_colors": ["#102030", "#405060"], "secondary_colors": ["#708090"], "color_count": 3},
            "brand_logo_colors": {"dominant_colors": ["#ff0000"], "secondary_colors": [], "color_count": 1},
            "logo_colors": {"dominant_colors": ["#fe0102"], "secondary_colors": [], "color_count": 1},
            "analysis": "palettes are close",
            "recommendations": ["warm the highlights"],
            "warnings": []
        });
        let out = color_harmony(&raw, NormalizeMode::Strict).unwrap();
        assert_eq!(out.overall_score, 0.71);
        assert_eq!(out.frame_colors.dominant_colors.len(), 2);
        assert_eq!(out.frame_colors.count, 3);
        assert_eq!(
            out.detected_logo_colors.as_ref().unwrap().dominant_colors[0],
            "#fe0102"
        );
        assert_eq!(out.recommendations, vec!["warm the highlights"]);
    }

    #[test]
    fn test_palette_count_defaults_to_color_total() {
        let raw = json!({
            "overallScore": 0.5,
            "colorAlignmentScore": 0.5,
            "frameColors": {"dominantColors": ["#111111", "#222222"], "secondaryColors": ["#333333"]},
            "brandLogoColors": {"dominantColors": ["#444444"]},
            "analysis": ""
        });
        let out = color_harmony(&raw, NormalizeMode::Lenient).unwrap();
        assert_eq!(out.frame_colors.count, 3);
        assert_eq!(out.brand_logo_colors.count, 1);
    }

    #[test]
    fn test_adapters_are_idempotent_on_canonical_shapes() {
        let canonical = json!({
            "found": true,
            "detections": [{
                "frameIndex": 1,
                "timestampSeconds": 0.5,
                "method": "clip",
                "confidence": 0.4,
                "boundingBox": null,
                "cropImage": null,
                "notes": null
            }],
            "primaryDetection": null,
            "methodUsed": "clip",
            "notes": null,
            "warnings": []
        });
        let first = logo_detection(&canonical, NormalizeMode::Lenient).unwrap();
        let second =
            logo_detection(&serde_json::to_value(&first).unwrap(), NormalizeMode::Lenient).unwrap();
        assert_eq!(first, second);
        assert!(second.warnings.is_empty());
    }

    #[test]
    fn test_frame_set_idempotent_on_canonical_shape() {
        let raw = json!({
            "frames": [{"frame_number": 0, "timestamp": 0.25, "image_base64": "AAAA"}],
            "total_frames_extracted": 1,
            "video_duration": 2.0,
            "video_fps": 24.0,
            "extraction_rate": 2.0
        });
        let first = frame_set(&raw, NormalizeMode::Lenient).unwrap();
        let second =
            frame_set(&serde_json::to_value(&first).unwrap(), NormalizeMode::Lenient).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_extract_json_object_variants() {
        assert_eq!(
            extract_json_object("```json\n{\"a\": 1}\n```").unwrap(),
            json!({"a": 1})
        );
        assert_eq!(
            extract_json_object("Here you go: {\"a\": 1} hope it helps").unwrap(),
            json!({"a": 1})
        );
        assert!(extract_json_object("no json here").is_none());
        assert!(extract_json_object("} backwards {").is_none());
    }

    #[test]
    fn test_strict_rejects_out_of_range_confidence() {
        let raw = json!({
            "found": true,
            "detections": [{"frameIndex": 0, "timestampSeconds": 0.0, "method": "template", "confidence": 1.7}],
            "warnings": []
        });
        let err = logo_detection(&raw, NormalizeMode::Strict).unwrap_err();
        assert!(err.to_string().contains("confidence"));

        let lenient = logo_detection(&raw, NormalizeMode::Lenient).unwrap();
        assert_eq!(lenient.detections[0].confidence, 1.0);
    }
}
