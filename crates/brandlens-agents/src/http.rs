//! HTTP client for the remote agents service.
//!
//! One POST per collaborator call: `{base}/agents/{slug}` with a JSON
//! body. Responses come back as raw [`Value`]s; shaping them is the
//! workflow's normalizer's job. Non-success statuses become
//! [`CollaboratorError::Status`] carrying the service's reported detail
//! when the body has one.

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, instrument};

use brandlens_core::{
    AdvisorInput, CollabResult, CollaboratorError, Collaborators, CritiqueInput, CritiqueKind,
    DetectionInput, FrameSampleInput, PaletteInput, StepId, SynthesisInput,
};

use crate::config::AgentsConfig;

/// Collaborators backed by the BrandLens agents HTTP service.
pub struct HttpAgents {
    config: AgentsConfig,
    http: reqwest::Client,
}

impl HttpAgents {
    /// Create a client for the configured service.
    pub fn new(config: AgentsConfig) -> Self {
        let http = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(config.timeout)
            .build()
            .expect("Failed to create HTTP client");

        HttpAgents { config, http }
    }

    /// Create a client from environment variables.
    pub fn from_env() -> Self {
        Self::new(AgentsConfig::from_env())
    }

    #[instrument(skip(self, body))]
    async fn call(&self, slug: &str, body: &impl Serialize) -> CollabResult<Value> {
        let url = self.config.agent_url(slug);
        debug!(%url, "calling agent");

        let response = self
            .http
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|e| CollaboratorError::Transport(e.to_string()))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| CollaboratorError::Transport(e.to_string()))?;

        if !status.is_success() {
            return Err(CollaboratorError::Status {
                status: status.as_u16(),
                detail: error_detail(&text),
            });
        }

        let value = serde_json::from_str(&text)?;
        Ok(value)
    }
}

#[async_trait]
impl Collaborators for HttpAgents {
    async fn critique(&self, kind: CritiqueKind, input: &CritiqueInput) -> CollabResult<Value> {
        self.call(kind.slug(), input).await
    }

    async fn sample_frames(&self, input: &FrameSampleInput) -> CollabResult<Value> {
        self.call(StepId::FrameExtraction.as_str(), input).await
    }

    async fn detect_logo(&self, input: &DetectionInput) -> CollabResult<Value> {
        self.call(StepId::LogoDetection.as_str(), input).await
    }

    async fn compare_colors(&self, input: &PaletteInput) -> CollabResult<Value> {
        self.call(StepId::ColorHarmony.as_str(), input).await
    }

    async fn synthesize(&self, input: &SynthesisInput) -> CollabResult<Value> {
        self.call(StepId::Synthesizer.as_str(), input).await
    }

    async fn advise(&self, input: &AdvisorInput) -> CollabResult<Value> {
        self.call(StepId::Advisor.as_str(), input).await
    }
}

/// Best-available detail from an error body: the conventional `detail`
/// or `error` field when the body is JSON, else the (bounded) raw text.
fn error_detail(body: &str) -> String {
    if let Ok(value) = serde_json::from_str::<Value>(body) {
        for key in ["detail", "error", "message"] {
            if let Some(detail) = value.get(key).and_then(Value::as_str) {
                return detail.to_string();
            }
        }
    }
    let trimmed = body.trim();
    if trimmed.is_empty() {
        "no detail provided".to_string()
    } else {
        trimmed.chars().take(200).collect()
    }
}
