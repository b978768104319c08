//! Triage form values
//!
//! `TriageForm` is an immutable value: every edit consumes the old form and
//! returns a new one, so the wizard swaps it wholesale and tests can diff
//! snapshots.

use crate::errors::{Result, TriageError};
use crate::wizard::protocols::{RiskFactor, SymptomCategory};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Lowest and highest accepted body temperature (ºC)
pub const TEMPERATURE_RANGE: (f32, f32) = (25.0, 45.0);

/// How the symptom started
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OnsetType {
    Sudden,
    Gradual,
}

impl OnsetType {
    pub const ALL: [OnsetType; 2] = [OnsetType::Sudden, OnsetType::Gradual];

    pub fn label(&self) -> &'static str {
        match self {
            OnsetType::Sudden => "Brusco (De repente)",
            OnsetType::Gradual => "Progresivo (Poco a poco)",
        }
    }
}

/// Current trend of the symptom
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Evolution {
    Improving,
    Stable,
    Worsening,
}

impl Evolution {
    pub const ALL: [Evolution; 3] = [Evolution::Improving, Evolution::Stable, Evolution::Worsening];

    pub fn label(&self) -> &'static str {
        match self {
            Evolution::Improving => "Mejorando",
            Evolution::Stable => "Estable (Igual)",
            Evolution::Worsening => "Empeorando",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BreathingDifficulty {
    Normal,
    Difficult,
}

impl BreathingDifficulty {
    pub fn label(&self) -> &'static str {
        match self {
            BreathingDifficulty::Normal => "Habla normal",
            BreathingDifficulty::Difficult => "Dificultad al hablar",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Consciousness {
    Normal,
    LossOfConsciousness,
}

impl Consciousness {
    pub fn label(&self) -> &'static str {
        match self {
            Consciousness::Normal => "Consciencia normal",
            Consciousness::LossOfConsciousness => "Pérdida de consciencia",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Bleeding {
    None,
    Active,
}

impl Bleeding {
    pub fn label(&self) -> &'static str {
        match self {
            Bleeding::None => "Sin sangrado",
            Bleeding::Active => "Sangrado activo",
        }
    }
}

/// Optional vital signs, each field independent
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Vitals {
    pub oxygen_saturation: Option<u8>,
    pub temperature: Option<f32>,
    pub breathing: Option<BreathingDifficulty>,
    pub consciousness: Option<Consciousness>,
    pub bleeding: Option<Bleeding>,
}

impl Vitals {
    /// True when no field has been set
    pub fn is_empty(&self) -> bool {
        self.oxygen_saturation.is_none()
            && self.temperature.is_none()
            && self.breathing.is_none()
            && self.consciousness.is_none()
            && self.bleeding.is_none()
    }

    /// Parse a saturation reading such as `92` or `92%`
    pub fn parse_oxygen_saturation(input: &str) -> Result<u8> {
        let raw = input.trim().trim_end_matches('%').trim();
        let value: u8 = raw.parse().map_err(|_| TriageError::InvalidVital {
            field: "SatO2".to_string(),
            value: input.trim().to_string(),
            reason: "not a whole number".to_string(),
        })?;
        validate_saturation(value)?;
        Ok(value)
    }

    /// Parse a temperature such as `38.5`, `38,5` or `38.5º`
    pub fn parse_temperature(input: &str) -> Result<f32> {
        let raw = input
            .trim()
            .trim_end_matches(|c| c == 'C' || c == 'c')
            .trim_end_matches(|c| c == 'º' || c == '°')
            .trim()
            .replace(',', ".");
        let value: f32 = raw.parse().map_err(|_| TriageError::InvalidVital {
            field: "Temperatura".to_string(),
            value: input.trim().to_string(),
            reason: "not a number".to_string(),
        })?;
        validate_temperature(value)?;
        Ok(value)
    }
}

fn validate_saturation(value: u8) -> Result<()> {
    if value > 100 {
        return Err(TriageError::InvalidVital {
            field: "SatO2".to_string(),
            value: value.to_string(),
            reason: "must be between 0 and 100".to_string(),
        });
    }
    Ok(())
}

fn validate_temperature(value: f32) -> Result<()> {
    let (min, max) = TEMPERATURE_RANGE;
    if !value.is_finite() || value < min || value > max {
        return Err(TriageError::InvalidVital {
            field: "Temperatura".to_string(),
            value: value.to_string(),
            reason: format!("must be between {} and {}", min, max),
        });
    }
    Ok(())
}

/// Everything collected by the wizard during one session
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TriageForm {
    pub symptom_category: Option<SymptomCategory>,
    pub symptom_free_text: String,
    pub onset_time: String,
    pub onset_type: Option<OnsetType>,
    pub evolution: Option<Evolution>,
    /// Checked phrases, kept in the order they were checked
    pub selected_red_flags: Vec<String>,
    pub free_text_red_flags: String,
    pub vitals: Vitals,
    pub risk_factors: BTreeSet<RiskFactor>,
}

impl TriageForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_category(mut self, category: Option<SymptomCategory>) -> Self {
        self.symptom_category = category;
        self
    }

    pub fn with_symptom_text(mut self, text: impl Into<String>) -> Self {
        self.symptom_free_text = text.into();
        self
    }

    pub fn with_onset_time(mut self, onset_time: impl Into<String>) -> Self {
        self.onset_time = onset_time.into();
        self
    }

    pub fn with_onset_type(mut self, onset_type: OnsetType) -> Self {
        self.onset_type = Some(onset_type);
        self
    }

    pub fn with_evolution(mut self, evolution: Evolution) -> Self {
        self.evolution = Some(evolution);
        self
    }

    /// Check the phrase if absent, uncheck it if present
    pub fn toggle_red_flag(mut self, flag: &str) -> Self {
        if let Some(pos) = self.selected_red_flags.iter().position(|f| f == flag) {
            self.selected_red_flags.remove(pos);
        } else {
            self.selected_red_flags.push(flag.to_string());
        }
        self
    }

    pub fn with_red_flag_notes(mut self, notes: impl Into<String>) -> Self {
        self.free_text_red_flags = notes.into();
        self
    }

    pub fn toggle_risk_factor(mut self, factor: RiskFactor) -> Self {
        if !self.risk_factors.remove(&factor) {
            self.risk_factors.insert(factor);
        }
        self
    }

    pub fn with_oxygen_saturation(mut self, value: Option<u8>) -> Result<Self> {
        if let Some(v) = value {
            validate_saturation(v)?;
        }
        self.vitals.oxygen_saturation = value;
        Ok(self)
    }

    pub fn with_temperature(mut self, value: Option<f32>) -> Result<Self> {
        if let Some(v) = value {
            validate_temperature(v)?;
        }
        self.vitals.temperature = value;
        Ok(self)
    }

    pub fn with_breathing(mut self, value: Option<BreathingDifficulty>) -> Self {
        self.vitals.breathing = value;
        self
    }

    pub fn with_consciousness(mut self, value: Option<Consciousness>) -> Self {
        self.vitals.consciousness = value;
        self
    }

    pub fn with_bleeding(mut self, value: Option<Bleeding>) -> Self {
        self.vitals.bleeding = value;
        self
    }

    /// Symptom line as sent to the assessor.
    ///
    /// A known category gives its label, with the free text appended when
    /// both were given. `Other` or no category gives the free text alone.
    pub fn symptom(&self) -> String {
        let text = self.symptom_free_text.trim();
        match self.symptom_category {
            Some(cat) if cat.is_known() => {
                if text.is_empty() {
                    cat.label().to_string()
                } else {
                    format!("{} - {}", cat.label(), text)
                }
            }
            _ => text.to_string(),
        }
    }

    /// Step 1 predicate: a known category or some free text
    pub fn has_symptom(&self) -> bool {
        matches!(self.symptom_category, Some(cat) if cat.is_known())
            || !self.symptom_free_text.trim().is_empty()
    }

    /// Step 2 predicate: onset time and onset type
    pub fn has_onset(&self) -> bool {
        !self.onset_time.trim().is_empty() && self.onset_type.is_some()
    }

    /// Step 3 predicate
    pub fn has_evolution(&self) -> bool {
        self.evolution.is_some()
    }

    /// Any red flag checked or described
    pub fn has_red_flags(&self) -> bool {
        !self.selected_red_flags.is_empty() || !self.free_text_red_flags.trim().is_empty()
    }
}
