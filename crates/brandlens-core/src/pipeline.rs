//! The fixed pipeline, declared as data.
//!
//! The step graph is known at build time and never changes at runtime. It is
//! kept as a const descriptor table so the dependency structure stays
//! inspectable and testable independent of execution; the scheduler consumes
//! this table rather than hand-chaining steps.

use crate::domain::step::StepId;

/// Execution phase of a step. Phase boundaries are synchronization points:
/// no step starts until every step it depends on has succeeded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    /// Six independent steps started concurrently against the initial request.
    FanOut,
    /// Logo detection, strictly after the fan-out outputs it reads.
    Detection,
    /// Palette comparison, strictly after detection.
    Palette,
    /// Fan-in consolidation of the analysis outputs.
    Synthesis,
    /// Final report and guidance derivation.
    Advisory,
}

/// Build-time description of one pipeline step.
#[derive(Debug, Clone, Copy)]
pub struct StepSpec {
    pub id: StepId,
    pub phase: Phase,
    /// Steps whose outputs this step reads. All must reach success before
    /// this step may start.
    pub depends_on: &'static [StepId],
}

/// The declared pipeline, in scheduling order. The synthetic `input` record
/// is not part of the executable pipeline and is added at assembly time.
pub const PIPELINE: &[StepSpec] = &[
    StepSpec {
        id: StepId::OverallCritic,
        phase: Phase::FanOut,
        depends_on: &[],
    },
    StepSpec {
        id: StepId::VisualStyle,
        phase: Phase::FanOut,
        depends_on: &[],
    },
    StepSpec {
        id: StepId::FrameExtraction,
        phase: Phase::FanOut,
        depends_on: &[],
    },
    StepSpec {
        id: StepId::AudioAnalysis,
        phase: Phase::FanOut,
        depends_on: &[],
    },
    StepSpec {
        id: StepId::SafetyEthics,
        phase: Phase::FanOut,
        depends_on: &[],
    },
    StepSpec {
        id: StepId::MessageClarity,
        phase: Phase::FanOut,
        depends_on: &[],
    },
    StepSpec {
        id: StepId::LogoDetection,
        phase: Phase::Detection,
        depends_on: &[StepId::FrameExtraction],
    },
    StepSpec {
        id: StepId::ColorHarmony,
        phase: Phase::Palette,
        depends_on: &[StepId::FrameExtraction, StepId::LogoDetection],
    },
    StepSpec {
        id: StepId::Synthesizer,
        phase: Phase::Synthesis,
        depends_on: &[
            StepId::OverallCritic,
            StepId::VisualStyle,
            StepId::FrameExtraction,
            StepId::AudioAnalysis,
            StepId::LogoDetection,
            StepId::ColorHarmony,
        ],
    },
    StepSpec {
        id: StepId::Advisor,
        phase: Phase::Advisory,
        depends_on: &[StepId::Synthesizer, StepId::SafetyEthics, StepId::MessageClarity],
    },
];

/// Look up the descriptor for a step.
pub fn spec(id: StepId) -> Option<&'static StepSpec> {
    PIPELINE.iter().find(|s| s.id == id)
}

/// Number of executable pipeline steps (the synthetic `input` record is not
/// counted).
pub fn step_count() -> usize {
    PIPELINE.len()
}

/// Ids of the concurrent fan-out steps, in declaration order.
pub fn fan_out_steps() -> impl Iterator<Item = StepId> {
    PIPELINE
        .iter()
        .filter(|s| s.phase == Phase::FanOut)
        .map(|s| s.id)
}
