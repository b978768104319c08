//! Assessment result and section splitting
//!
//! The model is asked for `###` headed sections but nothing guarantees
//! it complies. Splitting is display-only: text without the delimiter
//! becomes one untitled section.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Token that opens a section heading
pub const SECTION_DELIMITER: &str = "###";

/// Shown when the assessor call fails
pub const FALLBACK_ERROR_MESSAGE: &str =
    "Error al procesar. Por favor, intente nuevamente o acuda a urgencias.";

/// Shown when the assessor answers with an empty text
pub const EMPTY_RESPONSE_MESSAGE: &str = "No se pudo generar una respuesta.";

/// One displayable block of the assessment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    pub heading: Option<String>,
    pub body: String,
}

/// Outcome of one submission
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssessmentResult {
    pub text: String,
    /// True when `text` is the fallback message
    pub failed: bool,
    pub received_at: DateTime<Utc>,
}

impl AssessmentResult {
    /// Wrap a successful response, substituting the empty-response message
    pub fn success(text: impl Into<String>) -> Self {
        let text = text.into();
        let text = if text.trim().is_empty() {
            EMPTY_RESPONSE_MESSAGE.to_string()
        } else {
            text
        };
        Self {
            text,
            failed: false,
            received_at: Utc::now(),
        }
    }

    /// The fixed fallback shown after a failed call
    pub fn failure() -> Self {
        Self {
            text: FALLBACK_ERROR_MESSAGE.to_string(),
            failed: true,
            received_at: Utc::now(),
        }
    }

    pub fn sections(&self) -> Vec<Section> {
        split_sections(&self.text)
    }
}

/// Split model output into sections.
///
/// Text before the first delimiter is an untitled section. Each later
/// segment uses its first line as heading and the rest as body. Blank
/// segments are dropped.
pub fn split_sections(text: &str) -> Vec<Section> {
    let mut segments = text.split(SECTION_DELIMITER);
    let mut sections = Vec::new();

    if let Some(preamble) = segments.next() {
        let body = preamble.trim();
        if !body.is_empty() {
            sections.push(Section {
                heading: None,
                body: body.to_string(),
            });
        }
    }

    for segment in segments {
        if segment.trim().is_empty() {
            continue;
        }
        let (first, rest) = segment.split_once('\n').unwrap_or((segment, ""));
        let heading = first.trim();
        sections.push(Section {
            heading: (!heading.is_empty()).then(|| heading.to_string()),
            body: rest.trim().to_string(),
        });
    }

    sections
}
