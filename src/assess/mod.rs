//! Assessment backend
//!
//! The wizard only knows the `Assessor` trait. `OllamaAssessor` is the
//! production implementation talking to a local Ollama server.

pub mod client;

pub use client::{OllamaAssessor, DEFAULT_MODEL, DEFAULT_OLLAMA_URL};

use crate::errors::Result;
use crate::wizard::AssessmentPayload;
use async_trait::async_trait;

/// Text returned by the assessment backend
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssessmentResponse {
    pub text: String,
}

/// External capability that turns a compiled payload into a narrative
#[async_trait]
pub trait Assessor: Send + Sync {
    async fn assess(&self, payload: &AssessmentPayload) -> Result<AssessmentResponse>;
}
