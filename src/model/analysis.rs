//! Request and response bodies of the analysis endpoint

use serde::Serialize;
use serde_json::Value;
use utoipa::ToSchema;

/// Marker carried by every successful analysis response
pub const SUCCESS_MARKER: &str = "API is working!";

/// Why a request body could not be turned into an [`AnalysisRequest`]
#[derive(Debug, thiserror::Error)]
pub enum RequestError {
    #[error("Invalid JSON body: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Request body must be a JSON object")]
    NotAnObject,

    #[error("Field 'text' must be a string")]
    TextNotString,
}

/// Body of `POST /api/analyze`
///
/// Only `text` is recognized; anything else in the body is ignored.
#[derive(Debug, Clone, Default, ToSchema)]
pub struct AnalysisRequest {
    pub text: Option<String>,
}

impl AnalysisRequest {
    /// Parse a raw JSON body
    ///
    /// Empty-ish bodies (`null`, `false`, `0`, `""`, `[]`, `{}`) and a missing
    /// `text` field mean empty text. Any other non-object body, or a `text`
    /// that is not a string (including `null`), is an error.
    pub fn from_json(body: &[u8]) -> Result<Self, RequestError> {
        let value: Value = serde_json::from_slice(body)?;

        if is_empty_value(&value) {
            return Ok(Self::default());
        }

        let Value::Object(fields) = value else {
            return Err(RequestError::NotAnObject);
        };

        match fields.get("text") {
            None => Ok(Self::default()),
            Some(Value::String(text)) => Ok(Self {
                text: Some(text.clone()),
            }),
            Some(_) => Err(RequestError::TextNotString),
        }
    }

    pub fn text(&self) -> &str {
        self.text.as_deref().unwrap_or_default()
    }
}

/// Per-class scores keyed `class_0`..`class_2`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, ToSchema)]
pub struct ClassProbabilities {
    pub class_0: f64,
    pub class_1: f64,
    pub class_2: f64,
}

/// Verdict returned for an analyzed text
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct AnalysisResult {
    /// Label predicted by the classifier
    pub class: i64,
    pub confidence: f64,
    pub probabilities: ClassProbabilities,
    pub test: String,
}

/// Known labels of the hate speech model
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClassLabel {
    HateSpeech,
    OffensiveLanguage,
    Neither,
}

impl ClassLabel {
    pub fn from_index(label: i64) -> Option<Self> {
        match label {
            0 => Some(Self::HateSpeech),
            1 => Some(Self::OffensiveLanguage),
            2 => Some(Self::Neither),
            _ => None,
        }
    }
}

impl std::fmt::Display for ClassLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::HateSpeech => "hate speech",
            Self::OffensiveLanguage => "offensive language",
            Self::Neither => "neither",
        };
        f.write_str(name)
    }
}

fn is_empty_value(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(fields) => fields.is_empty(),
    }
}
