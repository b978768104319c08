//! Doctor command for system diagnostics
//!
//! Checks that the assessment backend can be reached and that the state
//! directory is usable before a triage session starts.

use crate::assess::OllamaAssessor;
use colored::*;
use std::path::PathBuf;

/// Health check result
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    Pass,
    Warn(String),
    Fail(String),
}

/// Individual health check
#[derive(Debug)]
pub struct HealthCheck {
    pub name: String,
    pub status: HealthStatus,
}

impl HealthCheck {
    fn new(name: &str, status: HealthStatus) -> Self {
        Self {
            name: name.to_string(),
            status,
        }
    }
}

/// Doctor diagnostics system
pub struct Doctor {
    assessor: OllamaAssessor,
    state_dir: PathBuf,
}

impl Doctor {
    pub fn new(assessor: OllamaAssessor, state_dir: PathBuf) -> Self {
        Self {
            assessor,
            state_dir,
        }
    }

    /// Run all health checks
    pub async fn run_diagnostics(&self) -> Vec<HealthCheck> {
        let api = self.check_ollama_api().await;
        let reachable = api.status == HealthStatus::Pass;

        let mut checks = vec![api];
        if reachable {
            checks.push(self.check_model_available().await);
        } else {
            checks.push(HealthCheck::new(
                "Modelo",
                HealthStatus::Fail("Ollama no disponible".to_string()),
            ));
        }
        checks.push(self.check_state_dir());
        checks
    }

    async fn check_ollama_api(&self) -> HealthCheck {
        match self.assessor.health_check().await {
            Ok(true) => HealthCheck::new("Ollama API", HealthStatus::Pass),
            Ok(false) => HealthCheck::new(
                "Ollama API",
                HealthStatus::Fail(format!(
                    "No responde en {} (inicie con: ollama serve)",
                    self.assessor.base_url()
                )),
            ),
            Err(e) => HealthCheck::new("Ollama API", HealthStatus::Fail(e.to_string())),
        }
    }

    async fn check_model_available(&self) -> HealthCheck {
        match self.assessor.model_available().await {
            Ok(true) => HealthCheck::new("Modelo", HealthStatus::Pass),
            Ok(false) => HealthCheck::new(
                "Modelo",
                HealthStatus::Fail(format!(
                    "{} no instalado (ollama pull {})",
                    self.assessor.model(),
                    self.assessor.model()
                )),
            ),
            Err(e) => HealthCheck::new("Modelo", HealthStatus::Warn(e.to_string())),
        }
    }

    /// State directory exists (or can be created) and is writable
    fn check_state_dir(&self) -> HealthCheck {
        if let Err(e) = std::fs::create_dir_all(&self.state_dir) {
            return HealthCheck::new(
                "Directorio de estado",
                HealthStatus::Fail(format!("No se puede crear {}: {}", self.state_dir.display(), e)),
            );
        }

        let marker = self.state_dir.join(".triagebuddy_test");
        match std::fs::write(&marker, "test") {
            Ok(_) => {
                let _ = std::fs::remove_file(&marker);
                HealthCheck::new("Directorio de estado", HealthStatus::Pass)
            }
            Err(_) => HealthCheck::new(
                "Directorio de estado",
                HealthStatus::Warn("Sin permiso de escritura, no se guardará historial".to_string()),
            ),
        }
    }

    /// Display diagnostics results
    pub fn display_results(checks: &[HealthCheck]) {
        println!("\n{}\n", "Diagnóstico de TriageBuddy".bold());
        println!("{:<24} Estado", "Comprobación");
        println!("{}", "=".repeat(60));

        for check in checks {
            let status = match &check.status {
                HealthStatus::Pass => "OK".green().bold(),
                HealthStatus::Warn(msg) => format!("AVISO: {}", msg).yellow(),
                HealthStatus::Fail(msg) => format!("FALLO: {}", msg).red(),
            };
            println!("{:<24} {}", check.name, status);
        }

        println!();
    }

    /// Get overall health status
    pub fn overall_status(checks: &[HealthCheck]) -> bool {
        !checks
            .iter()
            .any(|c| matches!(c.status, HealthStatus::Fail(_)))
    }
}
