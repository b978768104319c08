//! Ollama assessment client
//!
//! Sends the compiled triage prompt to `POST /api/generate` in
//! non-streaming mode and returns the `response` field.

use crate::assess::{AssessmentResponse, Assessor};
use crate::errors::{Result, TriageError};
use crate::wizard::payload::{AssessmentPayload, TRIAGE_SYSTEM_PROMPT};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

/// Default Ollama API endpoint
pub const DEFAULT_OLLAMA_URL: &str = "http://127.0.0.1:11434";

/// Default model
pub const DEFAULT_MODEL: &str = "qwen2.5:7b-instruct";

/// Request timeout when none is configured
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

/// Ollama-backed assessor
#[derive(Debug, Clone)]
pub struct OllamaAssessor {
    client: Client,
    base_url: String,
    model: String,
}

impl OllamaAssessor {
    /// Create assessor with default settings
    pub fn new() -> Result<Self> {
        Self::with_config(DEFAULT_OLLAMA_URL, DEFAULT_MODEL, DEFAULT_TIMEOUT)
    }

    /// Create assessor with custom configuration
    pub fn with_config(base_url: &str, model: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(TriageError::HttpError)?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
        })
    }

    fn generate_request(&self, payload: &AssessmentPayload) -> GenerateRequest {
        GenerateRequest {
            model: self.model.clone(),
            prompt: payload.to_prompt(),
            system: TRIAGE_SYSTEM_PROMPT.to_string(),
            stream: false,
        }
    }

    /// Check if Ollama is reachable
    pub async fn health_check(&self) -> Result<bool> {
        let url = format!("{}/api/version", self.base_url);

        match self.client.get(&url).send().await {
            Ok(response) => Ok(response.status().is_success()),
            Err(e) => {
                debug!(error = %e, "Ollama health check failed");
                Ok(false)
            }
        }
    }

    /// Check that the configured model is installed
    pub async fn model_available(&self) -> Result<bool> {
        let url = format!("{}/api/tags", self.base_url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| TriageError::OllamaApiError(format!("Failed to query models: {}", e)))?;

        if !response.status().is_success() {
            return Err(TriageError::OllamaApiError(format!(
                "API returned status: {}",
                response.status()
            )));
        }

        let tags: TagsResponse = response
            .json()
            .await
            .map_err(|e| TriageError::OllamaApiError(format!("Failed to parse models: {}", e)))?;

        Ok(tags.models.iter().any(|m| m.name == self.model))
    }

    /// Get current model name
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Get base URL
    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl Assessor for OllamaAssessor {
    async fn assess(&self, payload: &AssessmentPayload) -> Result<AssessmentResponse> {
        let url = format!("{}/api/generate", self.base_url);
        let request = self.generate_request(payload);

        debug!(model = %self.model, symptom = %payload.symptom, "Sending triage assessment");

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| TriageError::OllamaApiError(format!("Failed to send request: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            warn!(%status, "Assessment request rejected");
            return Err(TriageError::OllamaApiError(format!(
                "HTTP {}: {}",
                status, error_text
            )));
        }

        let raw = response
            .text()
            .await
            .map_err(|e| TriageError::OllamaApiError(format!("Failed to read response: {}", e)))?;
        let body = parse_generate_response(&raw)?;

        Ok(AssessmentResponse {
            text: body.response,
        })
    }
}

fn parse_generate_response(raw: &str) -> Result<GenerateResponse> {
    Ok(serde_json::from_str(raw)?)
}

/// Ollama generate request
#[derive(Debug, Clone, Serialize)]
struct GenerateRequest {
    model: String,
    prompt: String,
    system: String,
    stream: bool,
}

/// Ollama non-streaming generate response
#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    response: String,
}

/// Ollama models list response
#[derive(Debug, Deserialize)]
struct TagsResponse {
    models: Vec<ModelInfo>,
}

#[derive(Debug, Deserialize)]
struct ModelInfo {
    name: String,
}
