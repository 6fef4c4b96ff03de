//! Schema normalization for raw collaborator responses.
//!
//! Collaborators answer in either of two field-naming conventions
//! (`frame_number` vs `frameNumber`) and may omit optional fields. Every
//! declared output field is probed under all accepted spellings in order;
//! when none is present the field falls back to its declared default.
//! Numeric fields additionally accept string representations.
//!
//! Missing or malformed required fields are handled per policy:
//! [`NormalizeMode::Lenient`] substitutes the declared default and records a
//! warning, [`NormalizeMode::Strict`] fails the owning step instead.

pub mod adapters;

use serde_json::{Map, Value};

use crate::domain::error::NormalizeError;

/// Policy for missing or malformed required fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NormalizeMode {
    /// Substitute declared defaults and record a warning. Matches the
    /// observed behavior of the system this replaces.
    #[default]
    Lenient,
    /// Reject the response, failing the owning step.
    Strict,
}

type Outcome<T> = Result<T, NormalizeError>;

/// Field prober over one raw JSON object.
///
/// Accumulates the warnings produced by lenient defaulting; adapters drain
/// them into the canonical output's `warnings` list.
pub struct Fields<'a> {
    map: Option<&'a Map<String, Value>>,
    mode: NormalizeMode,
    prefix: String,
    warnings: Vec<String>,
}

impl<'a> Fields<'a> {
    /// Probe a top-level response value.
    pub fn over(value: &'a Value, mode: NormalizeMode) -> Outcome<Self> {
        Self::new(value, mode, String::new())
    }

    /// Probe a nested element; `prefix` names it in warnings and errors,
    /// e.g. `frames[2]`.
    pub fn item(value: &'a Value, mode: NormalizeMode, prefix: impl Into<String>) -> Outcome<Self> {
        Self::new(value, mode, prefix.into())
    }

    fn new(value: &'a Value, mode: NormalizeMode, prefix: String) -> Outcome<Self> {
        match value.as_object() {
            Some(map) => Ok(Self {
                map: Some(map),
                mode,
                prefix,
                warnings: Vec::new(),
            }),
            None => match mode {
                NormalizeMode::Strict if prefix.is_empty() => Err(NormalizeError::NotAnObject),
                NormalizeMode::Strict => Err(NormalizeError::UnusableField {
                    field: prefix,
                    reason: "not an object".to_string(),
                }),
                NormalizeMode::Lenient => {
                    let target = if prefix.is_empty() { "response" } else { prefix.as_str() };
                    let warnings = vec![format!("{target}: not an object; using defaults")];
                    Ok(Self {
                        map: None,
                        mode,
                        prefix,
                        warnings,
                    })
                }
            },
        }
    }

    /// First present, non-null value among the accepted spellings.
    fn first(&self, keys: &[&str]) -> Option<&'a Value> {
        let map = self.map?;
        keys.iter().find_map(|k| map.get(*k).filter(|v| !v.is_null()))
    }

    fn label(&self, key: &str) -> String {
        if self.prefix.is_empty() {
            key.to_string()
        } else {
            format!("{}.{key}", self.prefix)
        }
    }

    pub(crate) fn warn(&mut self, message: impl Into<String>) {
        self.warnings.push(message.into());
    }

    fn missing<T>(&mut self, key: &str, default: impl FnOnce() -> T) -> Outcome<T> {
        match self.mode {
            NormalizeMode::Strict => Err(NormalizeError::MissingField {
                field: self.label(key),
            }),
            NormalizeMode::Lenient => {
                self.warn(format!("{}: missing; using default", self.label(key)));
                Ok(default())
            }
        }
    }

    fn unusable<T>(&mut self, key: &str, reason: &str, default: impl FnOnce() -> T) -> Outcome<T> {
        match self.mode {
            NormalizeMode::Strict => Err(NormalizeError::UnusableField {
                field: self.label(key),
                reason: reason.to_string(),
            }),
            NormalizeMode::Lenient => {
                self.warn(format!("{}: {reason}; using default", self.label(key)));
                Ok(default())
            }
        }
    }

    /// Required string with a declared default.
    pub fn string(&mut self, keys: &[&str], default: &str) -> Outcome<String> {
        match self.first(keys) {
            Some(Value::String(s)) => Ok(s.clone()),
            Some(_) => self.unusable(keys[0], "expected a string", || default.to_string()),
            None => self.missing(keys[0], || default.to_string()),
        }
    }

    /// Optional string; absence is not warned about.
    pub fn opt_string(&mut self, keys: &[&str]) -> Outcome<Option<String>> {
        match self.first(keys) {
            Some(Value::String(s)) => Ok(Some(s.clone())),
            Some(_) => self.unusable(keys[0], "expected a string", || None),
            None => Ok(None),
        }
    }

    /// Required float; also accepts a string representation.
    pub fn number(&mut self, keys: &[&str], default: f64) -> Outcome<f64> {
        match self.first(keys) {
            Some(Value::Number(n)) => Ok(n.as_f64().unwrap_or(default)),
            Some(Value::String(s)) => match s.trim().parse::<f64>() {
                Ok(v) => Ok(v),
                Err(_) => self.unusable(keys[0], "unparseable number", || default),
            },
            Some(_) => self.unusable(keys[0], "expected a number", || default),
            None => self.missing(keys[0], || default),
        }
    }

    /// Required non-negative integer; accepts whole floats and strings.
    pub fn integer(&mut self, keys: &[&str], default: u32) -> Outcome<u32> {
        match self.first(keys) {
            Some(Value::Number(n)) => {
                if let Some(v) = n.as_u64() {
                    Ok(v.min(u32::MAX as u64) as u32)
                } else if let Some(f) = n.as_f64().filter(|f| *f >= 0.0 && f.fract() == 0.0) {
                    Ok(f as u32)
                } else {
                    self.unusable(keys[0], "expected a non-negative integer", || default)
                }
            }
            Some(Value::String(s)) => match s.trim().parse::<u32>() {
                Ok(v) => Ok(v),
                Err(_) => self.unusable(keys[0], "unparseable integer", || default),
            },
            Some(_) => self.unusable(keys[0], "expected a non-negative integer", || default),
            None => self.missing(keys[0], || default),
        }
    }

    /// Required score constrained to `[0, 1]`. Out-of-range values are
    /// clamped under the lenient policy.
    pub fn unit_score(&mut self, keys: &[&str], default: f64) -> Outcome<f64> {
        let v = self.number(keys, default)?;
        if (0.0..=1.0).contains(&v) {
            Ok(v)
        } else {
            self.unusable(keys[0], "outside [0, 1]", || v.clamp(0.0, 1.0))
        }
    }

    /// Required boolean with a declared default.
    pub fn boolean(&mut self, keys: &[&str], default: bool) -> Outcome<bool> {
        match self.first(keys) {
            Some(Value::Bool(b)) => Ok(*b),
            Some(_) => self.unusable(keys[0], "expected a boolean", || default),
            None => self.missing(keys[0], || default),
        }
    }

    /// Required list; missing or malformed lists become empty under the
    /// lenient policy.
    pub fn list(&mut self, keys: &[&str]) -> Outcome<Vec<Value>> {
        match self.first(keys) {
            Some(Value::Array(items)) => Ok(items.clone()),
            Some(_) => self.unusable(keys[0], "expected a list", Vec::new),
            None => self.missing(keys[0], Vec::new),
        }
    }

    /// Required list of strings; non-string entries are dropped with a
    /// warning under the lenient policy.
    pub fn string_list(&mut self, keys: &[&str]) -> Outcome<Vec<String>> {
        let items = self.list(keys)?;
        let mut out = Vec::with_capacity(items.len());
        let mut dropped = false;
        for item in items {
            match item {
                Value::String(s) => out.push(s),
                _ => dropped = true,
            }
        }
        if dropped {
            return match self.mode {
                NormalizeMode::Strict => Err(NormalizeError::UnusableField {
                    field: self.label(keys[0]),
                    reason: "contains non-string entries".to_string(),
                }),
                NormalizeMode::Lenient => {
                    self.warn(format!(
                        "{}: dropped non-string entries",
                        self.label(keys[0])
                    ));
                    Ok(out)
                }
            };
        }
        Ok(out)
    }

    /// List of strings that defaults to empty without a warning. For fields
    /// the contract declares with a default (`warnings`, `recommendations`)
    /// rather than as required.
    pub fn string_list_or_empty(&mut self, keys: &[&str]) -> Outcome<Vec<String>> {
        match self.first(keys) {
            None => Ok(Vec::new()),
            Some(_) => self.string_list(keys),
        }
    }

    /// Raw probe for a nested value (objects handed to sub-adapters).
    pub fn opt_value(&self, keys: &[&str]) -> Option<&'a Value> {
        self.first(keys)
    }

    /// Warnings accumulated by lenient defaulting.
    pub fn into_warnings(self) -> Vec<String> {
        self.warnings
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_probes_both_spellings_in_order() {
        let raw = json!({"frame_number": 7, "frameNumber": 9});
        let mut fields = Fields::over(&raw, NormalizeMode::Lenient).unwrap();
        // First listed spelling wins.
        let v = fields.integer(&["frame_number", "frameNumber"], 0).unwrap();
        assert_eq!(v, 7);
        assert!(fields.into_warnings().is_empty());
    }

    #[test]
    fn test_missing_field_defaults_with_warning_in_lenient() {
        let raw = json!({});
        let mut fields = Fields::over(&raw, NormalizeMode::Lenient).unwrap();
        let v = fields.number(&["timestampSeconds", "timestamp"], 0.0).unwrap();
        assert_eq!(v, 0.0);
        let warnings = fields.into_warnings();
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("timestampSeconds"));
    }

    #[test]
    fn test_missing_field_errors_in_strict() {
        let raw = json!({});
        let mut fields = Fields::over(&raw, NormalizeMode::Strict).unwrap();
        let err = fields.number(&["confidence"], 0.0).unwrap_err();
        assert_eq!(
            err,
            NormalizeError::MissingField {
                field: "confidence".to_string()
            }
        );
    }

    #[test]
    fn test_number_accepts_string_representation() {
        let raw = json!({"confidence": "0.75"});
        let mut fields = Fields::over(&raw, NormalizeMode::Strict).unwrap();
        assert_eq!(fields.number(&["confidence"], 0.0).unwrap(), 0.75);
    }

    #[test]
    fn test_unparseable_number_string_defaults_leniently() {
        let raw = json!({"confidence": "high"});
        let mut fields = Fields::over(&raw, NormalizeMode::Lenient).unwrap();
        assert_eq!(fields.number(&["confidence"], 0.25).unwrap(), 0.25);
        assert!(!fields.into_warnings().is_empty());

        let mut strict = Fields::over(&raw, NormalizeMode::Strict).unwrap();
        assert!(strict.number(&["confidence"], 0.25).is_err());
    }

    #[test]
    fn test_null_counts_as_absent() {
        let raw = json!({"notes": null});
        let mut fields = Fields::over(&raw, NormalizeMode::Strict).unwrap();
        assert_eq!(fields.opt_string(&["notes"]).unwrap(), None);
    }

    #[test]
    fn test_unit_score_clamps_leniently() {
        let raw = json!({"overallScore": 1.4});
        let mut fields = Fields::over(&raw, NormalizeMode::Lenient).unwrap();
        assert_eq!(fields.unit_score(&["overallScore"], 0.0).unwrap(), 1.0);
        assert!(fields.into_warnings()[0].contains("outside [0, 1]"));

        let mut strict = Fields::over(&raw, NormalizeMode::Strict).unwrap();
        assert!(strict.unit_score(&["overallScore"], 0.0).is_err());
    }

    #[test]
    fn test_malformed_list_becomes_empty_leniently() {
        let raw = json!({"detections": "none"});
        let mut fields = Fields::over(&raw, NormalizeMode::Lenient).unwrap();
        assert!(fields.list(&["detections"]).unwrap().is_empty());
    }

    #[test]
    fn test_string_list_drops_non_strings() {
        let raw = json!({"warnings": ["a", 3, "b"]});
        let mut fields = Fields::over(&raw, NormalizeMode::Lenient).unwrap();
        assert_eq!(fields.string_list(&["warnings"]).unwrap(), vec!["a", "b"]);
    }

    #[test]
    fn test_non_object_response() {
        let raw = json!("just text");
        assert!(Fields::over(&raw, NormalizeMode::Strict).is_err());

        let mut fields = Fields::over(&raw, NormalizeMode::Lenient).unwrap();
        assert_eq!(fields.boolean(&["found"], false).unwrap(), false);
    }

    #[test]
    fn test_integer_accepts_whole_floats() {
        let raw = json!({"totalFrames": 8.0});
        let mut fields = Fields::over(&raw, NormalizeMode::Strict).unwrap();
        assert_eq!(fields.integer(&["totalFrames"], 0).unwrap(), 8);
    }

    #[test]
    fn test_nested_prefix_in_warnings() {
        let raw = json!({});
        let mut fields = Fields::item(&raw, NormalizeMode::Lenient, "frames[2]").unwrap();
        let _ = fields.integer(&["index", "frame_number"], 0).unwrap();
        assert!(fields.into_warnings()[0].starts_with("frames[2].index"));
    }
}
