//! Step argument values and their humanized rendering

use crate::core::secret::Secret;
use serde::{Serialize, Serializer};

/// An opaque value attached to a step.
///
/// Arguments are recorded for reporting only; the core never interprets
/// them. Rendering rules match what a reporter expects to read: strings
/// are double-quoted, JSON values render as JSON, operation source text
/// renders verbatim, secrets render as the mask token.
#[derive(Debug, Clone)]
pub enum StepArg {
    /// No value (renders as an empty string)
    None,

    /// A plain string (renders double-quoted)
    Text(String),

    /// A structured value (renders as JSON)
    Json(serde_json::Value),

    /// The source text of a user-supplied operation (renders verbatim)
    Code(String),

    /// A sensitive value (renders masked)
    Secret(Secret),
}

impl StepArg {
    /// Render the argument for display.
    pub fn render(&self) -> String {
        match self {
            StepArg::None => String::new(),
            StepArg::Text(s) => format!("\"{}\"", s),
            StepArg::Json(value) => value.to_string(),
            StepArg::Code(source) => source.clone(),
            StepArg::Secret(secret) => secret.masked().to_string(),
        }
    }
}

impl Serialize for StepArg {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            StepArg::None => serializer.serialize_none(),
            StepArg::Text(s) => serializer.serialize_str(s),
            StepArg::Json(value) => value.serialize(serializer),
            StepArg::Code(source) => serializer.serialize_str(source),
            // The secret serializes its mask, never the inner value
            StepArg::Secret(secret) => secret.serialize(serializer),
        }
    }
}

impl From<&str> for StepArg {
    fn from(s: &str) -> Self {
        StepArg::Text(s.to_string())
    }
}

impl From<String> for StepArg {
    fn from(s: String) -> Self {
        StepArg::Text(s)
    }
}

impl From<serde_json::Value> for StepArg {
    fn from(value: serde_json::Value) -> Self {
        StepArg::Json(value)
    }
}

impl From<Secret> for StepArg {
    fn from(secret: Secret) -> Self {
        StepArg::Secret(secret)
    }
}
