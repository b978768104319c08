//! Error types for TriageBuddy
//!
//! One error enum for the wizard core, the assessment backend and the
//! configuration layer. The binary wraps these in `anyhow` with context.

use thiserror::Error;

/// Main error type for the triage wizard and its collaborators
#[derive(Error, Debug)]
pub enum TriageError {
    /// Wizard transition not defined for the current step
    #[error("Invalid wizard transition from {from} via {to}: {reason}")]
    InvalidTransition {
        from: String,
        to: String,
        reason: String,
    },

    /// Required fields of the current step are missing
    #[error("Step {step} is incomplete: required fields are missing")]
    StepIncomplete { step: u8 },

    /// Form edits attempted on the result step
    #[error("The triage form is locked while the result is shown")]
    FormLocked,

    /// Input that only exists in the standard (non-kiosk) flow
    #[error("{0} is not available in kiosk mode")]
    NotAvailableInKiosk(String),

    /// Red-flag phrase not in the current category's checklist
    #[error("Red flag is not part of the current checklist: {0}")]
    UnknownRedFlag(String),

    /// Out-of-range vital sign
    #[error("Invalid vital sign {field}={value}: {reason}")]
    InvalidVital {
        field: String,
        value: String,
        reason: String,
    },

    /// Ollama API errors
    #[error("Ollama API error: {0}")]
    OllamaApiError(String),

    /// HTTP client errors
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    /// Serialization errors
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    /// I/O errors
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Generic errors with context
    #[error("Triage error: {0}")]
    Generic(String),
}

/// Result type alias for triage operations
pub type Result<T> = std::result::Result<T, TriageError>;

impl From<anyhow::Error> for TriageError {
    fn from(err: anyhow::Error) -> Self {
        TriageError::Generic(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_step_incomplete_display() {
        let err = TriageError::StepIncomplete { step: 2 };
        assert!(err.to_string().contains("Step 2"));
    }

    #[test]
    fn test_invalid_transition_error() {
        let err = TriageError::InvalidTransition {
            from: "Onset".to_string(),
            to: "Submit".to_string(),
            reason: "Submit is only available on the risk factor step".to_string(),
        };
        assert!(err.to_string().contains("Onset"));
        assert!(err.to_string().contains("Submit"));
    }

    #[test]
    fn test_invalid_vital_display() {
        let err = TriageError::InvalidVital {
            field: "SatO2".to_string(),
            value: "140".to_string(),
            reason: "must be between 0 and 100".to_string(),
        };
        assert!(err.to_string().contains("SatO2=140"));
    }

    #[test]
    fn test_from_anyhow() {
        let err: TriageError = anyhow::anyhow!("boom").into();
        assert!(matches!(err, TriageError::Generic(ref m) if m == "boom"));
    }
}
