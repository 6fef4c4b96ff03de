//! Workflow orchestration.
//!
//! Drives one critique run through the declared pipeline: validate,
//! fan out the six independent steps as parallel tasks, then walk the
//! dependent phases one step at a time. All step state lives in the
//! shared [`RunRecorder`]; the collaborator calls are the only
//! suspension points held outside its lock.

use std::future::Future;
use std::sync::Arc;

use chrono::Utc;
use serde_json::Value;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;
use tracing::{debug, info, instrument, warn};

use crate::collaborator::{Collaborators, CritiqueKind};
use crate::domain::{
    CritiqueRequest, RunId, RunStatus, StepId, StepOutput, ValidationError, WorkflowError,
    WorkflowRun,
};
use crate::events::WorkflowEvent;
use crate::merge;
use crate::normalize::{adapters, NormalizeMode};
use crate::recorder::RunRecorder;
use crate::result;

/// Guidance text substituted when the advisor returns none.
pub const FALLBACK_VALIDATION_PROMPT: &str = "Please ensure the video adheres to brand \
     guidelines, maintains high visual quality, and accurately represents the product \
     and messaging.";

/// Per-run tuning knobs.
#[derive(Debug, Clone, Copy)]
pub struct WorkflowOptions {
    /// Policy for missing or malformed collaborator response fields.
    pub normalize_mode: NormalizeMode,
    /// Frame rate requested from the frame extractor.
    pub sampling_rate_fps: f64,
}

impl Default for WorkflowOptions {
    fn default() -> Self {
        WorkflowOptions {
            normalize_mode: NormalizeMode::default(),
            sampling_rate_fps: 2.0,
        }
    }
}

/// Run the full critique pipeline over one request.
///
/// A malformed request returns `Err` before any step is scheduled. Once
/// scheduling starts the run always resolves to a [`WorkflowRun`] whose
/// `status` reports the outcome. When `events` is supplied, one `step`
/// event is sent per completed step in completion order, then exactly
/// one terminal `complete` or `error` event.
#[instrument(skip_all, fields(stream = events.is_some()))]
pub async fn run_workflow(
    request: CritiqueRequest,
    collaborators: Arc<dyn Collaborators>,
    options: WorkflowOptions,
    events: Option<mpsc::Sender<WorkflowEvent>>,
) -> Result<WorkflowRun, ValidationError> {
    if let Err(err) = request.validate() {
        warn!(%err, "rejecting critique request");
        return Err(err);
    }

    let run_id = RunId::new();
    let started_at = Utc::now();
    let mode = options.normalize_mode;
    info!(run = %run_id, stream = events.is_some(), "starting critique run");

    let recorder = Arc::new(Mutex::new(RunRecorder::new(run_id, events.clone())));
    let request = Arc::new(request);

    // Fan-out: five critique perspectives plus frame extraction, all
    // against the initial request, awaited jointly. Completion order is
    // whatever the collaborators make of it.
    let mut tasks: Vec<(StepId, JoinHandle<bool>)> = Vec::new();
    for kind in CritiqueKind::ALL {
        let recorder = Arc::clone(&recorder);
        let collaborators = Arc::clone(&collaborators);
        let request = Arc::clone(&request);
        let handle = tokio::spawn(async move {
            let input = merge::critique_input(kind, &request);
            let payload = result::critique_payload(&input);
            execute_step(&recorder, kind.step_id(), payload, async {
                let raw = collaborators.critique(kind, &input).await.map_err(detail)?;
                adapters::report(&raw, mode)
                    .map(StepOutput::Report)
                    .map_err(detail)
            })
            .await
        });
        tasks.push((kind.step_id(), handle));
    }
    {
        let recorder = Arc::clone(&recorder);
        let collaborators = Arc::clone(&collaborators);
        let request = Arc::clone(&request);
        let sampling_rate_fps = options.sampling_rate_fps;
        let handle = tokio::spawn(async move {
            let input = merge::frame_sample_input(&request, sampling_rate_fps);
            let payload = result::frame_sample_payload(&input);
            execute_step(&recorder, StepId::FrameExtraction, payload, async {
                let raw = collaborators.sample_frames(&input).await.map_err(detail)?;
                adapters::frame_set(&raw, mode)
                    .map(StepOutput::Frames)
                    .map_err(detail)
            })
            .await
        });
        tasks.push((StepId::FrameExtraction, handle));
    }

    for (id, handle) in tasks {
        if let Err(err) = handle.await {
            warn!(step = %id, error = %err, "fan-out task aborted");
            recorder.lock().await.fail(id, "task aborted").await;
        }
    }

    // Logo detection, gated on the frame set. The merged input is
    // checked before the call so an empty frame set fails the step
    // without a round trip.
    if may_start(&recorder, StepId::LogoDetection).await {
        let frames = recorder.lock().await.cloned_output(StepId::FrameExtraction);
        if let Some(StepOutput::Frames(frames)) = frames {
            let input = merge::detection_input(&frames, &request);
            let payload = result::detection_payload(&input);
            execute_step(&recorder, StepId::LogoDetection, payload, async {
                input.validate()?;
                let raw = collaborators.detect_logo(&input).await.map_err(detail)?;
                adapters::logo_detection(&raw, mode)
                    .map(StepOutput::Detection)
                    .map_err(detail)
            })
            .await;
        }
    }

    // Colour harmony, strictly after detection.
    if may_start(&recorder, StepId::ColorHarmony).await {
        let upstream = {
            let rec = recorder.lock().await;
            (
                rec.cloned_output(StepId::FrameExtraction),
                rec.cloned_output(StepId::LogoDetection),
            )
        };
        if let (Some(StepOutput::Frames(frames)), Some(StepOutput::Detection(detection))) = upstream
        {
            let input = merge::palette_input(&frames, &detection, &request);
            let payload = result::palette_payload(&input);
            execute_step(&recorder, StepId::ColorHarmony, payload, async {
                let raw = collaborators.compare_colors(&input).await.map_err(detail)?;
                adapters::color_harmony(&raw, mode)
                    .map(StepOutput::Colors)
                    .map_err(detail)
            })
            .await;
        }
    }

    // Fan-in: the synthesizer reads everything upstream of it.
    if may_start(&recorder, StepId::Synthesizer).await {
        let upstream = {
            let rec = recorder.lock().await;
            (
                rec.cloned_output(StepId::OverallCritic),
                rec.cloned_output(StepId::VisualStyle),
                rec.cloned_output(StepId::AudioAnalysis),
                rec.cloned_output(StepId::FrameExtraction),
                rec.cloned_output(StepId::LogoDetection),
                rec.cloned_output(StepId::ColorHarmony),
            )
        };
        if let (
            Some(StepOutput::Report(overall)),
            Some(StepOutput::Report(visual)),
            Some(StepOutput::Report(audio)),
            Some(StepOutput::Frames(frames)),
            Some(StepOutput::Detection(detection)),
            Some(StepOutput::Colors(colors)),
        ) = upstream
        {
            let input = merge::synthesis_input(
                &overall, &visual, &audio, &frames, &detection, &colors, &request,
            );
            let payload = result::synthesis_payload(&input);
            execute_step(&recorder, StepId::Synthesizer, payload, async {
                let raw = collaborators.synthesize(&input).await.map_err(detail)?;
                adapters::report(&raw, mode)
                    .map(StepOutput::Report)
                    .map_err(detail)
            })
            .await;
        }
    }

    // Final aggregation. The advisor must always hand back a guidance
    // prompt; substitute the standard one when it does not.
    if may_start(&recorder, StepId::Advisor).await {
        let upstream = {
            let rec = recorder.lock().await;
            (
                rec.cloned_output(StepId::Synthesizer),
                rec.cloned_output(StepId::SafetyEthics),
                rec.cloned_output(StepId::MessageClarity),
            )
        };
        if let (
            Some(StepOutput::Report(synthesis)),
            Some(StepOutput::Report(safety)),
            Some(StepOutput::Report(clarity)),
        ) = upstream
        {
            let input = merge::advisor_input(&synthesis, &safety, &clarity, &request);
            let payload = result::advisor_payload(&input);
            execute_step(&recorder, StepId::Advisor, payload, async {
                let raw = collaborators.advise(&input).await.map_err(detail)?;
                let mut report = adapters::report(&raw, mode).map_err(detail)?;
                if report.prompt.trim().is_empty() {
                    report.prompt = FALLBACK_VALIDATION_PROMPT.to_string();
                    report
                        .warnings
                        .push("advisor returned no guidance prompt; substituted the standard one".to_string());
                }
                Ok(StepOutput::Report(report))
            })
            .await;
        }
    }

    let (status, failure, records) = {
        let mut rec = recorder.lock().await;
        rec.finish();
        rec.snapshot()
    };
    let run = result::assemble(run_id, status, failure, records, &request, started_at);
    info!(run = %run_id, status = %run.status, steps = run.steps.len(), "critique run finished");

    // Terminal event goes out after every step event, once the run is
    // fully assembled.
    if let Some(tx) = &events {
        let event = match &run.error {
            Some(failure) => WorkflowEvent::Error(failure.clone()),
            None => WorkflowEvent::Complete(Box::new(run.clone())),
        };
        let _ = tx.send(event).await;
    }

    Ok(run)
}

/// Begin a step, run its work, and record the outcome.
///
/// The recorder lock is held only around the state transitions, never
/// across the work future.
async fn execute_step<F>(recorder: &Mutex<RunRecorder>, id: StepId, payload: Value, work: F) -> bool
where
    F: Future<Output = Result<StepOutput, String>>,
{
    recorder.lock().await.begin(id, Some(payload));
    match work.await {
        Ok(output) => {
            recorder.lock().await.succeed(id, output).await;
            true
        }
        Err(message) => {
            warn!(step = %id, %message, "step failed");
            recorder.lock().await.fail(id, message).await;
            false
        }
    }
}

/// Gate for dependent phases: false once the run has failed or while a
/// declared dependency is not yet successful. Skipped steps stay
/// pending.
async fn may_start(recorder: &Mutex<RunRecorder>, id: StepId) -> bool {
    let rec = recorder.lock().await;
    if rec.status() == RunStatus::Failed {
        if let Some(failure) = rec.failure() {
            let unmet = WorkflowError::DependencyUnmet {
                step: id,
                upstream: failure.step,
            };
            debug!(run = %rec.run_id(), "{unmet}");
        }
        return false;
    }
    let met = rec.deps_met(id);
    if !met {
        debug!(step = %id, "dependencies not yet successful");
    }
    met
}

fn detail(err: impl std::fmt::Display) -> String {
    err.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_options() {
        let options = WorkflowOptions::default();
        assert_eq!(options.normalize_mode, NormalizeMode::Lenient);
        assert_eq!(options.sampling_rate_fps, 2.0);
    }

    #[test]
    fn test_fallback_prompt_is_single_line() {
        assert!(!FALLBACK_VALIDATION_PROMPT.contains('\n'));
        assert!(FALLBACK_VALIDATION_PROMPT.ends_with("messaging."));
    }
}
