//! Response assembly and payload snapshots.
//!
//! Step records carry a snapshot of the input each step was given.
//! Binary assets (base64 video, logo, product imagery) never land in a
//! snapshot verbatim; they are replaced with a size + digest summary so
//! step lists stay readable and small. Frame lists are reduced to
//! counts for the same reason.

use chrono::{DateTime, Utc};
use serde_json::{json, Value};
use sha2::{Digest, Sha256};

use crate::domain::{
    CritiqueRequest, RunId, RunStatus, StepFailure, StepId, StepRecord, StepStatus, WorkflowRun,
};
use crate::merge::{
    AdvisorInput, CritiqueInput, DetectionInput, FrameSampleInput, PaletteInput, SynthesisInput,
};

/// Replace a binary asset with `{bytes, sha256}`.
pub fn blob_summary(data: &str) -> Value {
    let digest = Sha256::digest(data.as_bytes());
    json!({
        "bytes": data.len(),
        "sha256": hex::encode(digest),
    })
}

fn opt_blob_summary(data: Option<&String>) -> Value {
    match data {
        Some(data) => blob_summary(data),
        None => Value::Null,
    }
}

fn context_value(input: &impl serde::Serialize) -> Value {
    serde_json::to_value(input).unwrap_or(Value::Null)
}

/// Snapshot of a critique call's input.
pub fn critique_payload(input: &CritiqueInput) -> Value {
    json!({
        "videoData": blob_summary(&input.video_data),
        "brandLogoData": opt_blob_summary(input.brand_logo_data.as_ref()),
        "productImageData": opt_blob_summary(input.product_image_data.as_ref()),
        "brandContext": context_value(&input.brand_context),
    })
}

/// Snapshot of the frame-sampling call's input.
pub fn frame_sample_payload(input: &FrameSampleInput) -> Value {
    json!({
        "videoData": blob_summary(&input.video_data),
        "samplingRateFps": input.sampling_rate_fps,
    })
}

/// Snapshot of the logo-detection input.
pub fn detection_payload(input: &DetectionInput) -> Value {
    json!({
        "frameCount": input.frames.len(),
        "brandLogoData": blob_summary(&input.brand_logo_data),
        "brandContext": context_value(&input.brand_context),
    })
}

/// Snapshot of the colour-harmony input.
pub fn palette_payload(input: &PaletteInput) -> Value {
    json!({
        "frameCount": input.frames.len(),
        "detectionCount": input.detections.len(),
        "brandLogoData": blob_summary(&input.brand_logo_data),
        "productImageData": opt_blob_summary(input.product_image_data.as_ref()),
        "brandContext": context_value(&input.brand_context),
    })
}

/// Snapshot of the synthesizer input. Carries no binary assets, so the
/// typed input serialises as-is.
pub fn synthesis_payload(input: &SynthesisInput) -> Value {
    context_value(input)
}

/// Snapshot of the advisor input.
pub fn advisor_payload(input: &AdvisorInput) -> Value {
    context_value(input)
}

/// Snapshot of the initial request, attached to the synthetic `input`
/// step.
pub fn request_payload(request: &CritiqueRequest) -> Value {
    json!({
        "videoData": blob_summary(&request.video_data),
        "brandLogoData": blob_summary(&request.brand_logo_data),
        "productImageData": opt_blob_summary(request.product_image_data.as_ref()),
        "brandContext": context_value(&request.brand_context),
        "originalPrompt": request.original_prompt,
        "stream": request.stream,
    })
}

/// The always-successful synthetic record for request intake.
fn input_record(request: &CritiqueRequest, started_at: DateTime<Utc>) -> StepRecord {
    StepRecord {
        id: StepId::Input,
        status: StepStatus::Success,
        started_at: Some(started_at),
        ended_at: Some(started_at),
        payload: Some(request_payload(request)),
        output: None,
        warnings: Vec::new(),
        metadata: None,
    }
}

/// Build the caller-facing run from the recorder's final state.
///
/// Prepends the synthetic `input` step and lifts the advisor's report
/// out as the headline result on success.
pub fn assemble(
    run_id: RunId,
    status: RunStatus,
    failure: Option<StepFailure>,
    records: Vec<StepRecord>,
    request: &CritiqueRequest,
    started_at: DateTime<Utc>,
) -> WorkflowRun {
    let mut steps = Vec::with_capacity(records.len() + 1);
    steps.push(input_record(request, started_at));
    steps.extend(records);

    let result = if status == RunStatus::Success {
        steps
            .iter()
            .find(|r| r.id == StepId::Advisor)
            .and_then(|r| r.output.as_ref())
            .and_then(|o| o.as_report())
            .cloned()
    } else {
        None
    };

    WorkflowRun {
        run_id,
        status,
        result,
        steps,
        error: failure,
    }
}
