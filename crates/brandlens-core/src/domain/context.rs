//! Initial request shapes and pre-run validation.

use serde::{Deserialize, Serialize};

use super::error::{FieldViolation, ValidationError};

/// Shortest plausible base64 payload for real video data.
pub const MIN_VIDEO_DATA_LEN: usize = 100;

/// Immutable brand information supplied once at run start.
///
/// Accepts both field-naming conventions on input (`companyName` and
/// `company_name`); always serializes camelCase.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct BrandContext {
    #[serde(alias = "company_name")]
    pub company_name: String,

    #[serde(alias = "product_name")]
    pub product_name: String,

    #[serde(default, alias = "brief_prompt", skip_serializing_if = "Option::is_none")]
    pub brief_prompt: Option<String>,
}

/// The request that starts one critique run.
///
/// Binary assets arrive as base64 strings, with or without a
/// `data:<mime>;base64,` prefix.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CritiqueRequest {
    #[serde(alias = "video_data", alias = "videoBase64", alias = "video_base64")]
    pub video_data: String,

    #[serde(
        alias = "brand_logo_data",
        alias = "brandLogoBase64",
        alias = "brand_logo_base64"
    )]
    pub brand_logo_data: String,

    #[serde(
        default,
        alias = "product_image_data",
        alias = "productImageBase64",
        alias = "product_image_base64",
        skip_serializing_if = "Option::is_none"
    )]
    pub product_image_data: Option<String>,

    #[serde(alias = "brand_context")]
    pub brand_context: BrandContext,

    #[serde(default, alias = "original_prompt", skip_serializing_if = "Option::is_none")]
    pub original_prompt: Option<String>,

    /// When true the caller wants incremental per-step events.
    #[serde(default)]
    pub stream: bool,
}

impl CritiqueRequest {
    /// Validate the request before any step is scheduled.
    ///
    /// All violations are collected and reported together, each naming the
    /// wire field it concerns.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut violations = Vec::new();

        let video = strip_data_uri(&self.video_data).trim();
        if video.is_empty() {
            violations.push(FieldViolation {
                field: "videoData".to_string(),
                message: "must not be empty".to_string(),
            });
        } else if video.len() < MIN_VIDEO_DATA_LEN {
            violations.push(FieldViolation {
                field: "videoData".to_string(),
                message: "payload appears to be too small".to_string(),
            });
        }

        if strip_data_uri(&self.brand_logo_data).trim().is_empty() {
            violations.push(FieldViolation {
                field: "brandLogoData".to_string(),
                message: "must not be empty".to_string(),
            });
        }

        if self.brand_context.company_name.trim().is_empty() {
            violations.push(FieldViolation {
                field: "brandContext.companyName".to_string(),
                message: "must not be empty".to_string(),
            });
        }

        if self.brand_context.product_name.trim().is_empty() {
            violations.push(FieldViolation {
                field: "brandContext.productName".to_string(),
                message: "must not be empty".to_string(),
            });
        }

        if violations.is_empty() {
            Ok(())
        } else {
            Err(ValidationError::new(violations))
        }
    }
}

/// Strip a `data:<mime>;base64,` prefix when present.
pub fn strip_data_uri(value: &str) -> &str {
    if value.starts_with("data:") {
        if let Some(idx) = value.find(";base64,") {
            return &value[idx + ";base64,".len()..];
        }
    }
    value
}
