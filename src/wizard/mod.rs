//! Guided triage wizard
//!
//! Six data-collection steps and a result step. The category chosen on
//! step 1 decides the red-flag checklist on step 4 and the vital-sign
//! groups on step 5.

pub mod form;
pub mod machine;
pub mod payload;
pub mod protocols;
pub mod result;
pub mod state;

pub use form::{BreathingDifficulty, Bleeding, Consciousness, Evolution, OnsetType, TriageForm, Vitals};
pub use machine::{ExitHandler, ExitReason, GuidedTriage};
pub use payload::{AssessmentPayload, NO_RED_FLAGS, NO_RISK_FACTORS};
pub use protocols::{
    red_flag_protocol, vital_groups, RedFlagProtocol, RiskFactor, SymptomCategory, VitalGroup,
    GENERIC_RED_FLAG_PROMPT,
};
pub use result::{
    split_sections, AssessmentResult, Section, EMPTY_RESPONSE_MESSAGE, FALLBACK_ERROR_MESSAGE,
    SECTION_DELIMITER,
};
pub use state::{Transition, WizardAction, WizardStep, TOTAL_STEPS};
