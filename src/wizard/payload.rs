//! Assessment payload compilation
//!
//! Turns a finished `TriageForm` into the flat record sent to the
//! assessor, and renders that record into the model prompt.

use crate::wizard::form::TriageForm;
use serde::{Deserialize, Serialize};

/// Red-flag narrative when nothing was checked or described
pub const NO_RED_FLAGS: &str = "Ninguna bandera roja reportada.";

/// Risk factor summary when the list is empty
pub const NO_RISK_FACTORS: &str = "Ninguno seleccionado";

/// Vital signs line in the prompt when none were given
pub const NO_VITALS: &str = "No aportados";

/// System instruction sent alongside every assessment prompt
pub const TRIAGE_SYSTEM_PROMPT: &str = "Eres un asistente de triaje médico avanzado.
Tu objetivo es realizar una valoración inicial de los síntomas del paciente para determinar la urgencia.
NO PROPORCIONAS DIAGNÓSTICOS MÉDICOS DEFINITIVOS.
1. Identifica banderas rojas (Red Flags) inmediatamente.
2. Clasifica la urgencia (Rojo: Inmediata, Naranja: Muy Urgente, Amarillo: Urgente, Verde: Estándar, Azul: No Urgente).
3. Sé empático pero profesional y conciso.
4. Si hay duda de gravedad, dirige al paciente a Urgencias o llamar al 112.";

/// Record handed to the assessor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssessmentPayload {
    pub symptom: String,
    pub onset_time: String,
    pub onset_type: String,
    pub evolution: String,
    pub red_flags: String,
    /// Comma-joined populated vitals, empty when none were given
    pub vital_signs: String,
    pub risk_factors: Vec<String>,
}

impl AssessmentPayload {
    /// Compile the payload from a form
    pub fn compile(form: &TriageForm) -> Self {
        Self {
            symptom: form.symptom(),
            onset_time: form.onset_time.trim().to_string(),
            onset_type: form.onset_type.map(|t| t.label()).unwrap_or_default().to_string(),
            evolution: form.evolution.map(|e| e.label()).unwrap_or_default().to_string(),
            red_flags: compile_red_flags(form),
            vital_signs: compile_vitals(form),
            risk_factors: form.risk_factors.iter().map(|r| r.label().to_string()).collect(),
        }
    }

    /// Risk factors joined for display, or the "none selected" sentinel
    pub fn risk_factors_summary(&self) -> String {
        if self.risk_factors.is_empty() {
            NO_RISK_FACTORS.to_string()
        } else {
            self.risk_factors.join(", ")
        }
    }

    /// Full prompt for the generative model
    pub fn to_prompt(&self) -> String {
        let vitals = if self.vital_signs.is_empty() {
            NO_VITALS
        } else {
            self.vital_signs.as_str()
        };

        format!(
            "MODO GUIADO - VALORACIÓN ESTRUCTURADA (MANCHESTER SIMPLIFICADO)

DATOS DEL PACIENTE:
1. Síntoma Principal: {symptom}
2. Inicio: {onset_time} (Tipo: {onset_type})
3. Evolución: {evolution}
4. Banderas Rojas/Síntomas asociados: {red_flags}
5. Signos Vitales (Opcional): {vitals}
6. Factores de Riesgo / Antecedentes: {risks}

INSTRUCCIONES ADICIONALES:
- Interpreta los Factores de Riesgo en contexto (ej. Sintrom/Anticoagulación aumenta riesgo en traumas o sangrados).
- Si los Signos Vitales indican inestabilidad (ej. SatO2 < 92%, Fiebre > 39ºC, alteración consciencia), eleva la prioridad.
- Modo Quiosco/Admisión: Sé muy directo en la recomendación.

FORMATO DE RESPUESTA REQUERIDO (Usa Markdown):
### Resumen del caso
[Resumen breve]

### Banderas rojas detectadas
[SÍ/NO y cuáles]

### Nivel de prioridad sugerido
[Nivel 1 (Crítico) a 5 (No urgente) - Color asociado]

### Recomendación inmediata
[Acción clara: Sala de Espera / Box de Críticos / Consulta Médica]

### Justificación
[Breve explicación clínica integrando signos vitales y riesgos]

---
*Recordatorio: Esta valoración es orientativa y no sustituye la realizada por un profesional sanitario.*
",
            symptom = self.symptom,
            onset_time = self.onset_time,
            onset_type = self.onset_type,
            evolution = self.evolution,
            red_flags = self.red_flags,
            vitals = vitals,
            risks = self.risk_factors_summary(),
        )
    }
}

fn compile_red_flags(form: &TriageForm) -> String {
    let joined = form
        .selected_red_flags
        .iter()
        .map(|f| f.trim())
        .chain(std::iter::once(form.free_text_red_flags.trim()))
        .filter(|f| !f.is_empty())
        .collect::<Vec<_>>()
        .join(". ");

    if joined.is_empty() {
        NO_RED_FLAGS.to_string()
    } else {
        joined
    }
}

fn compile_vitals(form: &TriageForm) -> String {
    let v = &form.vitals;
    let mut parts = Vec::new();

    if let Some(sat) = v.oxygen_saturation {
        parts.push(format!("SatO2: {}%", sat));
    }
    if let Some(temp) = v.temperature {
        parts.push(format!("Temperatura: {}ºC", temp));
    }
    if let Some(breathing) = v.breathing {
        parts.push(format!("Respiración: {}", breathing.label()));
    }
    if let Some(consciousness) = v.consciousness {
        parts.push(format!("Consciencia: {}", consciousness.label()));
    }
    if let Some(bleeding) = v.bleeding {
        parts.push(format!("Sangrado: {}", bleeding.label()));
    }

    parts.join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wizard::form::{Bleeding, Consciousness, Evolution, OnsetType};
    use crate::wizard::protocols::{RiskFactor, SymptomCategory};

    #[test]
    fn test_empty_form_uses_sentinels() {
        let payload = AssessmentPayload::compile(&TriageForm::new());
        assert_eq!(payload.red_flags, NO_RED_FLAGS);
        assert_eq!(payload.vital_signs, "");
        assert!(payload.risk_factors.is_empty());
        assert_eq!(payload.risk_factors_summary(), NO_RISK_FACTORS);
    }

    #[test]
    fn test_red_flags_join_selected_and_notes() {
        let form = TriageForm::new()
            .toggle_red_flag("Náuseas o sudor frío profuso")
            .toggle_red_flag("Disnea (sensación de falta de aire)")
            .with_red_flag_notes("  mareo al levantarse ");
        let payload = AssessmentPayload::compile(&form);
        assert_eq!(
            payload.red_flags,
            "Náuseas o sudor frío profuso. Disnea (sensación de falta de aire). mareo al levantarse"
        );
    }

    #[test]
    fn test_vitals_omit_unset_fields() {
        let form = TriageForm::new()
            .with_temperature(Some(38.5))
            .unwrap()
            .with_bleeding(Some(Bleeding::Active));
        let payload = AssessmentPayload::compile(&form);
        assert_eq!(payload.vital_signs, "Temperatura: 38.5ºC, Sangrado: Sangrado activo");
        assert!(!payload.vital_signs.contains("SatO2"));
    }

    #[test]
    fn test_vitals_full_order() {
        let form = TriageForm::new()
            .with_consciousness(Some(Consciousness::Normal))
            .with_oxygen_saturation(Some(95))
            .unwrap()
            .with_temperature(Some(37.0))
            .unwrap();
        let payload = AssessmentPayload::compile(&form);
        assert_eq!(
            payload.vital_signs,
            "SatO2: 95%, Temperatura: 37ºC, Consciencia: Consciencia normal"
        );
    }

    #[test]
    fn test_labels_and_risks() {
        let form = TriageForm::new()
            .with_category(Some(SymptomCategory::Fever))
            .with_onset_time(" esta madrugada ")
            .with_onset_type(OnsetType::Gradual)
            .with_evolution(Evolution::Stable)
            .toggle_risk_factor(RiskFactor::Pregnancy)
            .toggle_risk_factor(RiskFactor::Diabetes);
        let payload = AssessmentPayload::compile(&form);
        assert_eq!(payload.symptom, "Fiebre / Escalofríos");
        assert_eq!(payload.onset_time, "esta madrugada");
        assert_eq!(payload.onset_type, "Progresivo (Poco a poco)");
        assert_eq!(payload.evolution, "Estable (Igual)");
        assert_eq!(payload.risk_factors, vec!["Diabetes", "Embarazo"]);
        assert_eq!(payload.risk_factors_summary(), "Diabetes, Embarazo");
    }

    #[test]
    fn test_prompt_contains_data_and_format() {
        let payload = AssessmentPayload::compile(&TriageForm::new().with_symptom_text("Cefalea"));
        let prompt = payload.to_prompt();
        assert!(prompt.contains("1. Síntoma Principal: Cefalea"));
        assert!(prompt.contains("5. Signos Vitales (Opcional): No aportados"));
        assert!(prompt.contains("Ninguno seleccionado"));
        assert!(prompt.contains("### Recomendación inmediata"));
    }

    #[test]
    fn test_serializes_camel_case() {
        let payload = AssessmentPayload::compile(&TriageForm::new());
        let json = serde_json::to_value(&payload).unwrap();
        assert!(json.get("onsetTime").is_some());
        assert!(json.get("redFlags").is_some());
        assert!(json.get("vitalSigns").is_some());
        assert!(json["riskFactors"].is_array());
    }
}
