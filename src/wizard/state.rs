//! Wizard step state machine
//!
//! Pure transition table over the seven wizard steps. Field predicates
//! (what each step requires before `Next`) live in the wizard itself;
//! this table only says which edges exist.
//!
//! Valid transitions:
//! 1. Symptom..Vitals → next step      (on: Next)
//! 2. Onset..RiskFactors → prev step   (on: Back)
//! 3. RiskFactors → Result             (on: Submit)
//! 4. Result → Symptom                 (on: Restart)
//! 5. Symptom → (leave wizard)         (on: Cancel)
//! 6. Result → (leave wizard)          (on: Exit)

use crate::errors::{Result, TriageError};
use serde::{Deserialize, Serialize};

/// Number of data-collection steps before the result
pub const TOTAL_STEPS: u8 = 6;

/// Wizard steps, numbered 1 to 7
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum WizardStep {
    Symptom = 1,
    Onset = 2,
    Evolution = 3,
    RedFlags = 4,
    Vitals = 5,
    RiskFactors = 6,
    /// Terminal step: loading view, then the assessment
    Result = 7,
}

/// User actions that move the wizard
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WizardAction {
    Next,
    Back,
    Submit,
    Restart,
    Cancel,
    Exit,
}

/// Where a transition leads
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Stay inside the wizard on this step
    Step(WizardStep),
    /// Hand control back to the host
    Leave,
}

impl WizardStep {
    pub const ALL: [WizardStep; 7] = [
        WizardStep::Symptom,
        WizardStep::Onset,
        WizardStep::Evolution,
        WizardStep::RedFlags,
        WizardStep::Vitals,
        WizardStep::RiskFactors,
        WizardStep::Result,
    ];

    pub fn number(&self) -> u8 {
        *self as u8
    }

    pub fn from_number(n: u8) -> Option<Self> {
        Self::ALL.iter().copied().find(|s| s.number() == n)
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, WizardStep::Result)
    }

    /// Attempt a transition.
    ///
    /// Returns `InvalidTransition` for edges the table does not contain.
    pub fn transition(&self, action: WizardAction) -> Result<Transition> {
        use WizardAction::*;
        use WizardStep::*;

        let next = match (self, action) {
            (Symptom, Next) => Transition::Step(Onset),
            (Onset, Next) => Transition::Step(Evolution),
            (Evolution, Next) => Transition::Step(RedFlags),
            (RedFlags, Next) => Transition::Step(Vitals),
            (Vitals, Next) => Transition::Step(RiskFactors),

            (Onset, Back) => Transition::Step(Symptom),
            (Evolution, Back) => Transition::Step(Onset),
            (RedFlags, Back) => Transition::Step(Evolution),
            (Vitals, Back) => Transition::Step(RedFlags),
            (RiskFactors, Back) => Transition::Step(Vitals),

            (RiskFactors, Submit) => Transition::Step(Result),
            (Result, Restart) => Transition::Step(Symptom),

            (Symptom, Cancel) => Transition::Leave,
            (Result, Exit) => Transition::Leave,

            (from, action) => {
                return Err(TriageError::InvalidTransition {
                    from: format!("{:?}", from),
                    to: format!("{:?}", action),
                    reason: format!("No {:?} action on step {}", action, from.number()),
                });
            }
        };

        Ok(next)
    }

    /// Actions the table allows from this step
    pub fn valid_actions(&self) -> Vec<WizardAction> {
        use WizardAction::*;
        use WizardStep::*;

        match self {
            Symptom => vec![Next, Cancel],
            Onset | Evolution | RedFlags | Vitals => vec![Next, Back],
            RiskFactors => vec![Back, Submit],
            Result => vec![Restart, Exit],
        }
    }

    /// Step title shown in the header
    pub fn title(&self) -> &'static str {
        match self {
            WizardStep::Symptom => "Síntoma Principal",
            WizardStep::Onset => "Inicio",
            WizardStep::Evolution => "Evolución",
            WizardStep::RedFlags => "Banderas Rojas",
            WizardStep::Vitals => "Signos Vitales (Opcional)",
            WizardStep::RiskFactors => "Factores de Riesgo",
            WizardStep::Result => "Resultado de Valoración",
        }
    }
}
