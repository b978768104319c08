//! Integration tests for the guided triage wizard
//!
//! Exercises full sessions against in-process assessors, without Ollama.

use async_trait::async_trait;
use quickcheck_macros::quickcheck;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use triagebuddy::assess::{AssessmentResponse, Assessor};
use triagebuddy::wizard::{
    AssessmentPayload, Evolution, ExitReason, GuidedTriage, OnsetType, RiskFactor,
    SymptomCategory, TriageForm, VitalGroup, WizardStep, FALLBACK_ERROR_MESSAGE,
    GENERIC_RED_FLAG_PROMPT, NO_RED_FLAGS, NO_RISK_FACTORS,
};
use triagebuddy::telemetry::{TelemetryCollector, EVENT_BUFFER_CAPACITY};
use triagebuddy::{Result, TriageError};

/// Returns a fixed, well-formed assessment
struct CannedAssessor {
    calls: AtomicUsize,
    last_payload: Mutex<Option<AssessmentPayload>>,
}

impl CannedAssessor {
    fn new() -> Self {
        Self {
            calls: AtomicUsize::new(0),
            last_payload: Mutex::new(None),
        }
    }
}

#[async_trait]
impl Assessor for CannedAssessor {
    async fn assess(&self, payload: &AssessmentPayload) -> Result<AssessmentResponse> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_payload.lock().unwrap() = Some(payload.clone());
        Ok(AssessmentResponse {
            text: "### Resumen del caso\nDolor torácico opresivo.\n\n### Nivel de prioridad sugerido\nNivel 1 (Crítico) - Rojo\n\n### Recomendación inmediata\nBox de Críticos".to_string(),
        })
    }
}

/// Always fails
struct FailingAssessor;

#[async_trait]
impl Assessor for FailingAssessor {
    async fn assess(&self, _payload: &AssessmentPayload) -> Result<AssessmentResponse> {
        Err(TriageError::OllamaApiError("connection refused".to_string()))
    }
}

const OPPRESSIVE_PAIN: &str = "Dolor opresivo (como un peso) o irradiado a brazo/mandíbula";

fn chest_pain_session() -> GuidedTriage {
    let mut wizard = GuidedTriage::new(false);
    wizard.select_category(SymptomCategory::ChestPain).unwrap();
    wizard.next().unwrap();
    wizard.set_onset_time("Hace 20 minutos").unwrap();
    wizard.set_onset_type(OnsetType::Sudden).unwrap();
    wizard.next().unwrap();
    wizard.set_evolution(Evolution::Worsening).unwrap();
    wizard.next().unwrap();
    wizard.toggle_red_flag_at(0).unwrap();
    wizard.next().unwrap();
    wizard.set_oxygen_saturation(Some(90)).unwrap();
    wizard.next().unwrap();
    wizard
}

#[test]
fn test_chest_pain_payload() {
    let mut wizard = chest_pain_session();
    assert_eq!(wizard.step(), WizardStep::RiskFactors);

    let payload = wizard.begin_submission().unwrap();
    assert_eq!(payload.symptom, "Dolor Torácico");
    assert_eq!(payload.onset_time, "Hace 20 minutos");
    assert!(payload.red_flags.contains(OPPRESSIVE_PAIN));
    assert!(payload.vital_signs.contains("SatO2: 90%"));
    assert_eq!(payload.risk_factors_summary(), NO_RISK_FACTORS);

    assert_eq!(wizard.step(), WizardStep::Result);
    assert!(wizard.is_loading());
    assert!(wizard.result().is_none());
}

#[tokio::test]
async fn test_submit_success_renders_sections() {
    let mut wizard = chest_pain_session();
    let assessor = CannedAssessor::new();

    let result = wizard.submit(&assessor).await.unwrap();
    assert!(!result.failed);
    assert!(!wizard.is_loading());
    assert_eq!(assessor.calls.load(Ordering::SeqCst), 1);

    let sections = wizard.sections();
    assert_eq!(sections.len(), 3);
    assert_eq!(sections[1].heading.as_deref(), Some("Nivel de prioridad sugerido"));
    assert_eq!(sections[2].body, "Box de Críticos");

    let sent = assessor.last_payload.lock().unwrap().clone().unwrap();
    assert!(sent.to_prompt().contains("5. Signos Vitales (Opcional): SatO2: 90%"));
}

#[tokio::test]
async fn test_failed_assessment_shows_fallback_and_restart_works() {
    let mut wizard = chest_pain_session();

    let result = wizard.submit(&FailingAssessor).await.unwrap();
    assert!(result.failed);
    assert_eq!(result.text, FALLBACK_ERROR_MESSAGE);
    assert!(!wizard.is_loading());
    assert_eq!(wizard.step(), WizardStep::Result);

    let sections = wizard.sections();
    assert_eq!(sections.len(), 1);
    assert_eq!(sections[0].heading, None);
    assert_eq!(sections[0].body, FALLBACK_ERROR_MESSAGE);

    assert_eq!(wizard.restart().unwrap(), WizardStep::Symptom);
    assert_eq!(wizard.form(), &TriageForm::default());
    assert!(wizard.result().is_none());
}

#[tokio::test]
async fn test_restart_after_success_resets_everything() {
    let mut wizard = chest_pain_session();
    wizard.toggle_risk_factor(RiskFactor::Diabetes).unwrap();
    wizard.submit(&CannedAssessor::new()).await.unwrap();

    wizard.restart().unwrap();
    assert_eq!(wizard.step(), WizardStep::Symptom);
    assert_eq!(wizard.form(), &TriageForm::default());
    assert!(!wizard.can_advance());
}

#[test]
fn test_free_text_without_category() {
    let mut wizard = GuidedTriage::new(false);
    assert!(!wizard.can_advance());
    wizard.set_symptom_text("Picor intenso en la garganta").unwrap();
    assert!(wizard.can_advance());
    wizard.next().unwrap();

    wizard.set_onset_time("Esta mañana").unwrap();
    wizard.set_onset_type(OnsetType::Gradual).unwrap();
    wizard.next().unwrap();
    wizard.set_evolution(Evolution::Stable).unwrap();
    wizard.next().unwrap();

    assert_eq!(wizard.step(), WizardStep::RedFlags);
    assert!(wizard.red_flag_protocol().is_none());
    assert!(!GENERIC_RED_FLAG_PROMPT.is_empty());

    wizard.next().unwrap();
    assert_eq!(wizard.step(), WizardStep::Vitals);
    assert_eq!(wizard.vital_groups(), VitalGroup::ALL.to_vec());
}

#[test]
fn test_free_text_session_refuses_invented_red_flags() {
    let mut wizard = GuidedTriage::new(false);
    wizard.set_symptom_text("Picor intenso en la garganta").unwrap();
    wizard.next().unwrap();
    wizard.set_onset_time("Esta mañana").unwrap();
    wizard.set_onset_type(OnsetType::Gradual).unwrap();
    wizard.next().unwrap();
    wizard.set_evolution(Evolution::Stable).unwrap();
    wizard.next().unwrap();

    assert!(matches!(
        wizard.toggle_red_flag("frase inventada"),
        Err(TriageError::UnknownRedFlag(_))
    ));
    assert!(wizard.toggle_red_flag_at(0).is_err());
    assert!(wizard.form().selected_red_flags.is_empty());
    assert_eq!(AssessmentPayload::compile(wizard.form()).red_flags, NO_RED_FLAGS);
}

#[test]
fn test_other_category_shows_no_vital_groups() {
    let mut wizard = GuidedTriage::new(false);
    wizard.select_category(SymptomCategory::Other).unwrap();
    wizard.set_symptom_text("Dolor de muelas").unwrap();
    assert!(wizard.vital_groups().is_empty());
    assert!(wizard.red_flag_protocol().is_none());

    wizard.clear_category().unwrap();
    assert_eq!(wizard.vital_groups(), VitalGroup::ALL.to_vec());
}

#[test]
fn test_guarded_next_leaves_state_unchanged() {
    let mut wizard = GuidedTriage::new(false);
    let before = wizard.form().clone();
    assert!(matches!(wizard.next(), Err(TriageError::StepIncomplete { step: 1 })));
    assert_eq!(wizard.step(), WizardStep::Symptom);
    assert_eq!(wizard.form(), &before);

    wizard.select_category(SymptomCategory::Trauma).unwrap();
    wizard.next().unwrap();
    wizard.set_onset_time("Hace una hora").unwrap();
    assert!(wizard.next().is_err());
    assert_eq!(wizard.step(), WizardStep::Onset);

    wizard.set_onset_type(OnsetType::Sudden).unwrap();
    wizard.next().unwrap();
    assert!(wizard.next().is_err());
    assert_eq!(wizard.step(), WizardStep::Evolution);
}

#[test]
fn test_back_is_lossless() {
    let mut wizard = chest_pain_session();
    wizard.toggle_risk_factor(RiskFactor::Anticoagulation).unwrap();
    let filled = wizard.form().clone();

    for expected in [
        WizardStep::Vitals,
        WizardStep::RedFlags,
        WizardStep::Evolution,
        WizardStep::Onset,
        WizardStep::Symptom,
    ] {
        assert_eq!(wizard.back().unwrap(), expected);
        assert_eq!(wizard.form(), &filled);
    }
    assert!(wizard.back().is_err());
    assert_eq!(wizard.step(), WizardStep::Symptom);
}

#[test]
fn test_category_switch_changes_tables_but_keeps_fields() {
    let mut wizard = GuidedTriage::new(false);
    wizard.select_category(SymptomCategory::Fever).unwrap();
    wizard.set_temperature(Some(39.2)).unwrap();
    let fever_protocol = wizard.red_flag_protocol().unwrap();
    assert_eq!(wizard.vital_groups(), vec![VitalGroup::Fever]);

    wizard.select_category(SymptomCategory::Breathing).unwrap();
    assert_ne!(wizard.red_flag_protocol().unwrap(), fever_protocol);
    assert_eq!(wizard.vital_groups(), vec![VitalGroup::Respiratory]);
    assert_eq!(wizard.form().vitals.temperature, Some(39.2));

    wizard.select_category(SymptomCategory::AbdominalPain).unwrap();
    assert!(wizard.vital_groups().is_empty());
}

#[test]
fn test_empty_optional_fields_use_sentinels() {
    let form = TriageForm::new()
        .with_category(Some(SymptomCategory::Dizziness))
        .with_onset_time("Ayer")
        .with_onset_type(OnsetType::Gradual)
        .with_evolution(Evolution::Improving);
    let payload = AssessmentPayload::compile(&form);

    assert_eq!(payload.red_flags, NO_RED_FLAGS);
    assert_eq!(payload.risk_factors_summary(), NO_RISK_FACTORS);
    assert!(payload.vital_signs.is_empty());
    assert!(payload.to_prompt().contains("No aportados"));
}

#[test]
fn test_kiosk_flow_auto_advances_and_returns_home() {
    let reasons = Arc::new(Mutex::new(Vec::<ExitReason>::new()));
    let sink = Arc::clone(&reasons);
    let mut wizard = GuidedTriage::new(true).with_exit_handler(Box::new(move |reason: ExitReason| {
        sink.lock().unwrap().push(reason);
    }));

    wizard.select_category(SymptomCategory::Dizziness).unwrap();
    assert_eq!(wizard.step(), WizardStep::Onset);
    assert!(wizard.set_symptom_text("mareo").is_err());

    wizard.back().unwrap();
    wizard.cancel().unwrap();
    assert_eq!(*reasons.lock().unwrap(), vec![ExitReason::Cancelled]);
}

#[test]
fn test_kiosk_sessions_share_bounded_telemetry() {
    let telemetry = TelemetryCollector::new();
    for _ in 0..1000 {
        let mut wizard = GuidedTriage::new(true).with_telemetry(telemetry.clone());
        wizard.select_category(SymptomCategory::Fever).unwrap();
        wizard.back().unwrap();
        wizard.cancel().unwrap();
    }

    let stats = telemetry.get_stats();
    assert_eq!(stats.exits, 1000);
    assert_eq!(stats.step_changes, 2000);
    assert_eq!(telemetry.event_count(), EVENT_BUFFER_CAPACITY);
}

#[test]
fn test_async_submit_with_block_on() {
    let mut wizard = chest_pain_session();
    let assessor = CannedAssessor::new();
    let failed = tokio_test::block_on(async { wizard.submit(&assessor).await.map(|r| r.failed) });
    assert!(!failed.unwrap());
    assert!(wizard.exit().is_ok());
}

#[quickcheck]
fn prop_risk_factor_toggle_twice_is_identity(picks: Vec<u8>, x: u8) -> bool {
    let mut wizard = GuidedTriage::new(false);
    for p in picks {
        let factor = RiskFactor::ALL[p as usize % RiskFactor::ALL.len()];
        wizard.toggle_risk_factor(factor).unwrap();
    }
    let before = wizard.form().risk_factors.clone();

    let factor = RiskFactor::ALL[x as usize % RiskFactor::ALL.len()];
    wizard.toggle_risk_factor(factor).unwrap();
    wizard.toggle_risk_factor(factor).unwrap();
    wizard.form().risk_factors == before
}

#[quickcheck]
fn prop_red_flag_toggle_twice_is_identity(picks: Vec<u8>, x: u8) -> bool {
    let mut wizard = GuidedTriage::new(false);
    wizard.select_category(SymptomCategory::Trauma).unwrap();
    let len = wizard.red_flag_protocol().map(|p| p.checks.len()).unwrap_or(1);
    for p in picks {
        wizard.toggle_red_flag_at(p as usize % len).unwrap();
    }
    let before = wizard.form().selected_red_flags.clone();

    let index = x as usize % len;
    wizard.toggle_red_flag_at(index).unwrap();
    wizard.toggle_red_flag_at(index).unwrap();
    wizard.form().selected_red_flags == before
}

#[quickcheck]
fn prop_step_always_in_range(actions: Vec<u8>) -> bool {
    let mut wizard = GuidedTriage::new(false);
    wizard.select_category(SymptomCategory::Other).unwrap();
    wizard.set_symptom_text("dolor de muelas").unwrap();
    wizard.set_onset_time("hoy").unwrap();
    wizard.set_onset_type(OnsetType::Sudden).unwrap();
    wizard.set_evolution(Evolution::Stable).unwrap();

    for a in actions {
        let _ = match a % 4 {
            0 => wizard.next().map(|_| ()),
            1 => wizard.back().map(|_| ()),
            2 => wizard.begin_submission().map(|_| ()),
            _ if wizard.is_loading() => wizard
                .complete_submission(Ok(AssessmentResponse {
                    text: "ok".to_string(),
                }))
                .map(|_| ()),
            _ => wizard.restart().map(|_| ()),
        };
        let n = wizard.step().number();
        if !(1..=7).contains(&n) {
            return false;
        }
    }
    true
}
