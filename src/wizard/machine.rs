//! Guided triage wizard
//!
//! Owns one `TriageForm` and the current `WizardStep`. Field edits swap
//! the form wholesale; moves go through the `WizardStep` transition table
//! plus the per-step required-field predicates. Submission is split into
//! `begin_submission` and `complete_submission` so the loading flag is
//! observable while the assessor call is pending.

use crate::assess::{AssessmentResponse, Assessor};
use crate::errors::{Result, TriageError};
use crate::telemetry::{TelemetryCollector, TelemetryEvent};
use crate::wizard::form::{BreathingDifficulty, Bleeding, Consciousness, Evolution, OnsetType, TriageForm};
use crate::wizard::payload::AssessmentPayload;
use crate::wizard::protocols::{
    red_flag_protocol, vital_groups, RedFlagProtocol, RiskFactor, SymptomCategory, VitalGroup,
};
use crate::wizard::result::{AssessmentResult, Section};
use crate::wizard::state::{Transition, WizardAction, WizardStep};
use std::time::Instant;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Why the wizard handed control back to its host
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitReason {
    /// Cancelled on the first step
    Cancelled,
    /// "Volver al Inicio" from the result step
    ReturnHome,
}

/// Host callback invoked when the wizard is left
pub type ExitHandler = Box<dyn FnMut(ExitReason) + Send>;

/// Step-by-step triage questionnaire
pub struct GuidedTriage {
    session_id: Uuid,
    step: WizardStep,
    form: TriageForm,
    kiosk: bool,
    loading: bool,
    result: Option<AssessmentResult>,
    submitted_at: Option<Instant>,
    on_exit: Option<ExitHandler>,
    telemetry: TelemetryCollector,
}

impl GuidedTriage {
    /// Create a wizard on step 1 with an empty form
    pub fn new(kiosk: bool) -> Self {
        Self {
            session_id: Uuid::new_v4(),
            step: WizardStep::Symptom,
            form: TriageForm::new(),
            kiosk,
            loading: false,
            result: None,
            submitted_at: None,
            on_exit: None,
            telemetry: TelemetryCollector::new(),
        }
    }

    pub fn with_exit_handler(mut self, handler: ExitHandler) -> Self {
        self.on_exit = Some(handler);
        self
    }

    /// Share a collector with the host
    pub fn with_telemetry(mut self, telemetry: TelemetryCollector) -> Self {
        self.telemetry = telemetry;
        self
    }

    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    pub fn step(&self) -> WizardStep {
        self.step
    }

    pub fn form(&self) -> &TriageForm {
        &self.form
    }

    pub fn is_kiosk(&self) -> bool {
        self.kiosk
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn result(&self) -> Option<&AssessmentResult> {
        self.result.as_ref()
    }

    /// Sections of the stored result, empty while loading
    pub fn sections(&self) -> Vec<Section> {
        self.result.as_ref().map(|r| r.sections()).unwrap_or_default()
    }

    pub fn telemetry(&self) -> &TelemetryCollector {
        &self.telemetry
    }

    /// Free-text symptom and red-flag inputs exist only outside kiosk mode
    pub fn accepts_free_text(&self) -> bool {
        !self.kiosk
    }

    /// Checklist for the current category, `None` means the generic prompt
    pub fn red_flag_protocol(&self) -> Option<&'static RedFlagProtocol> {
        red_flag_protocol(self.form.symptom_category)
    }

    /// Vital groups shown on step 5 for the current category
    pub fn vital_groups(&self) -> Vec<VitalGroup> {
        vital_groups(self.form.symptom_category)
    }

    /// Whether `Next` would succeed from the current step
    pub fn can_advance(&self) -> bool {
        match self.step {
            WizardStep::Symptom => self.form.has_symptom(),
            WizardStep::Onset => self.form.has_onset(),
            WizardStep::Evolution => self.form.has_evolution(),
            WizardStep::RedFlags | WizardStep::Vitals => true,
            WizardStep::RiskFactors | WizardStep::Result => false,
        }
    }

    /// Pick a category. In kiosk mode this also advances to step 2.
    pub fn select_category(&mut self, category: SymptomCategory) -> Result<()> {
        self.apply("symptom_category", |f| Ok(f.with_category(Some(category))))?;

        if self.kiosk && self.step == WizardStep::Symptom && self.form.has_symptom() {
            debug!(session = %self.session_id, ?category, "Kiosk auto-advance");
            self.next()?;
        }
        Ok(())
    }

    pub fn clear_category(&mut self) -> Result<()> {
        self.apply("symptom_category", |f| Ok(f.with_category(None)))
    }

    pub fn set_symptom_text(&mut self, text: &str) -> Result<()> {
        self.require_free_text("Free-text symptom")?;
        self.apply("symptom_free_text", |f| Ok(f.with_symptom_text(text)))
    }

    pub fn set_onset_time(&mut self, onset_time: &str) -> Result<()> {
        self.apply("onset_time", |f| Ok(f.with_onset_time(onset_time)))
    }

    pub fn set_onset_type(&mut self, onset_type: OnsetType) -> Result<()> {
        self.apply("onset_type", |f| Ok(f.with_onset_type(onset_type)))
    }

    pub fn set_evolution(&mut self, evolution: Evolution) -> Result<()> {
        self.apply("evolution", |f| Ok(f.with_evolution(evolution)))
    }

    /// Toggle a phrase of the current category's checklist.
    ///
    /// Phrases outside that checklist are refused; with no checklist every
    /// phrase is.
    pub fn toggle_red_flag(&mut self, flag: &str) -> Result<()> {
        let listed = self
            .red_flag_protocol()
            .map(|p| p.checks.iter().any(|check| *check == flag))
            .unwrap_or(false);
        if !listed {
            return Err(TriageError::UnknownRedFlag(flag.to_string()));
        }
        self.apply("selected_red_flags", |f| Ok(f.toggle_red_flag(flag)))
    }

    /// Toggle the n-th (0-based) check of the current category's checklist
    pub fn toggle_red_flag_at(&mut self, index: usize) -> Result<()> {
        let flag = self
            .red_flag_protocol()
            .and_then(|p| p.checks.get(index))
            .ok_or_else(|| {
                TriageError::Generic(format!("No red-flag check number {}", index + 1))
            })?;
        self.toggle_red_flag(flag)
    }

    pub fn set_red_flag_notes(&mut self, notes: &str) -> Result<()> {
        self.require_free_text("Free-text red flags")?;
        self.apply("free_text_red_flags", |f| Ok(f.with_red_flag_notes(notes)))
    }

    pub fn set_oxygen_saturation(&mut self, value: Option<u8>) -> Result<()> {
        self.apply("oxygen_saturation", |f| f.with_oxygen_saturation(value))
    }

    pub fn set_temperature(&mut self, value: Option<f32>) -> Result<()> {
        self.apply("temperature", |f| f.with_temperature(value))
    }

    pub fn set_breathing(&mut self, value: Option<BreathingDifficulty>) -> Result<()> {
        self.apply("breathing", |f| Ok(f.with_breathing(value)))
    }

    pub fn set_consciousness(&mut self, value: Option<Consciousness>) -> Result<()> {
        self.apply("consciousness", |f| Ok(f.with_consciousness(value)))
    }

    pub fn set_bleeding(&mut self, value: Option<Bleeding>) -> Result<()> {
        self.apply("bleeding", |f| Ok(f.with_bleeding(value)))
    }

    pub fn toggle_risk_factor(&mut self, factor: RiskFactor) -> Result<()> {
        self.apply("risk_factors", |f| Ok(f.toggle_risk_factor(factor)))
    }

    /// Advance one step if the current step's required fields are filled
    pub fn next(&mut self) -> Result<WizardStep> {
        let target = self.target(WizardAction::Next)?;
        if !self.can_advance() {
            return Err(TriageError::StepIncomplete {
                step: self.step.number(),
            });
        }
        self.move_to(target);
        Ok(self.step)
    }

    /// Go back one step, keeping every field
    pub fn back(&mut self) -> Result<WizardStep> {
        let target = self.target(WizardAction::Back)?;
        self.move_to(target);
        Ok(self.step)
    }

    /// Jump to the result step, raise the loading flag and compile the payload
    pub fn begin_submission(&mut self) -> Result<AssessmentPayload> {
        let target = self.target(WizardAction::Submit)?;
        let payload = AssessmentPayload::compile(&self.form);

        self.move_to(target);
        self.loading = true;
        self.result = None;
        self.submitted_at = Some(Instant::now());
        self.telemetry.record(TelemetryEvent::AssessmentRequested {
            timestamp: Instant::now(),
        });
        info!(session = %self.session_id, symptom = %payload.symptom, "Triage submitted");

        Ok(payload)
    }

    /// Store the assessor outcome and clear the loading flag.
    ///
    /// A failed call stores the fixed fallback message.
    pub fn complete_submission(
        &mut self,
        outcome: Result<AssessmentResponse>,
    ) -> Result<&AssessmentResult> {
        if !self.loading {
            return Err(TriageError::InvalidTransition {
                from: format!("{:?}", self.step),
                to: "CompleteSubmission".to_string(),
                reason: "No assessment is pending".to_string(),
            });
        }

        let result = match outcome {
            Ok(response) => AssessmentResult::success(response.text),
            Err(e) => {
                warn!(session = %self.session_id, error = %e, "Assessment failed");
                AssessmentResult::failure()
            }
        };

        let duration_ms = self
            .submitted_at
            .take()
            .map(|t| t.elapsed().as_millis() as u64)
            .unwrap_or(0);
        self.telemetry.record(TelemetryEvent::AssessmentCompleted {
            duration_ms,
            success: !result.failed,
            timestamp: Instant::now(),
        });

        self.loading = false;
        let stored: &AssessmentResult = self.result.insert(result);
        Ok(stored)
    }

    /// Submit the form and wait for the assessor
    pub async fn submit<A>(&mut self, assessor: &A) -> Result<&AssessmentResult>
    where
        A: Assessor + ?Sized,
    {
        let payload = self.begin_submission()?;
        let outcome = assessor.assess(&payload).await;
        self.complete_submission(outcome)
    }

    /// New assessment: empty form, back to step 1
    pub fn restart(&mut self) -> Result<WizardStep> {
        self.ensure_idle(WizardAction::Restart)?;
        let target = self.target(WizardAction::Restart)?;

        self.form = TriageForm::new();
        self.result = None;
        self.move_to(target);
        self.telemetry.record(TelemetryEvent::Restarted {
            timestamp: Instant::now(),
        });
        Ok(self.step)
    }

    /// Leave the wizard from step 1. The form is left untouched.
    pub fn cancel(&mut self) -> Result<ExitReason> {
        self.target(WizardAction::Cancel)?;
        self.leave(ExitReason::Cancelled);
        Ok(ExitReason::Cancelled)
    }

    /// Leave the wizard from the result step
    pub fn exit(&mut self) -> Result<ExitReason> {
        self.ensure_idle(WizardAction::Exit)?;
        self.target(WizardAction::Exit)?;
        self.leave(ExitReason::ReturnHome);
        Ok(ExitReason::ReturnHome)
    }

    fn target(&self, action: WizardAction) -> Result<Option<WizardStep>> {
        Ok(match self.step.transition(action)? {
            Transition::Step(step) => Some(step),
            Transition::Leave => None,
        })
    }

    fn move_to(&mut self, target: Option<WizardStep>) {
        let Some(to) = target else { return };
        if to == self.step {
            return;
        }
        debug!(session = %self.session_id, from = self.step.number(), to = to.number(), "Wizard step changed");
        self.telemetry.record(TelemetryEvent::StepChanged {
            from: self.step.number(),
            to: to.number(),
            timestamp: Instant::now(),
        });
        self.step = to;
    }

    fn leave(&mut self, reason: ExitReason) {
        info!(session = %self.session_id, ?reason, "Leaving triage wizard");
        self.telemetry.record(TelemetryEvent::Exited {
            reason: format!("{:?}", reason),
            timestamp: Instant::now(),
        });
        if let Some(handler) = self.on_exit.as_mut() {
            handler(reason);
        }
    }

    fn ensure_idle(&self, action: WizardAction) -> Result<()> {
        if self.loading {
            return Err(TriageError::InvalidTransition {
                from: format!("{:?}", self.step),
                to: format!("{:?}", action),
                reason: "Assessment still in progress".to_string(),
            });
        }
        Ok(())
    }

    fn require_free_text(&self, what: &str) -> Result<()> {
        if self.kiosk {
            return Err(TriageError::NotAvailableInKiosk(what.to_string()));
        }
        Ok(())
    }

    fn apply<F>(&mut self, field: &'static str, edit: F) -> Result<()>
    where
        F: FnOnce(TriageForm) -> Result<TriageForm>,
    {
        if self.step.is_terminal() {
            return Err(TriageError::FormLocked);
        }
        self.form = edit(self.form.clone())?;
        self.telemetry.record(TelemetryEvent::FormEdited {
            field,
            timestamp: Instant::now(),
        });
        Ok(())
    }
}
