//! Input parsing for the terminal wizard
//!
//! Turns one line of user input into a `WizardInput` for the current
//! step. Slash commands work on every step; everything else depends on
//! what the step asks for.

use crate::wizard::{Evolution, OnsetType, RiskFactor, SymptomCategory, WizardStep};

/// Slash commands
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Next,
    Back,
    Submit,
    Restart,
    Home,
    Cancel,
    Help,
    Exit,
    Unknown { input: String },
}

/// Vital sign entered on step 5
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VitalInput {
    /// Raw saturation text, `None` clears the field
    Saturation(Option<String>),
    /// Raw temperature text, `None` clears the field
    Temperature(Option<String>),
    /// Difficulty speaking full sentences
    Breathing(bool),
    /// Loss of consciousness
    Consciousness(bool),
    /// Visible active bleeding
    Bleeding(bool),
}

/// One parsed line of input
#[derive(Debug, Clone, PartialEq)]
pub enum WizardInput {
    Command(Command),
    /// Empty line: confirm / continue
    Continue,
    SelectCategory(SymptomCategory),
    SymptomText(String),
    OnsetTime(String),
    OnsetType(OnsetType),
    Evolution(Evolution),
    /// 0-based index into the current checklist
    ToggleRedFlag(usize),
    RedFlagNotes(String),
    Vital(VitalInput),
    ToggleRiskFactor(RiskFactor),
    /// Input that means nothing on this step, with a hint
    Invalid(String),
}

/// Check if input is a slash command
pub fn is_command(input: &str) -> bool {
    input.trim().starts_with('/')
}

/// Parse a slash command (Spanish names with English aliases)
pub fn parse_command(input: &str) -> Command {
    let trimmed = input.trim();
    let Some(body) = trimmed.strip_prefix('/') else {
        return Command::Unknown {
            input: input.to_string(),
        };
    };

    match body.split_whitespace().next().unwrap_or("").to_lowercase().as_str() {
        "siguiente" | "next" | "n" => Command::Next,
        "atras" | "atrás" | "back" | "b" => Command::Back,
        "finalizar" | "submit" | "enviar" => Command::Submit,
        "nuevo" | "nueva" | "restart" => Command::Restart,
        "inicio" | "home" => Command::Home,
        "cancelar" | "cancel" => Command::Cancel,
        "ayuda" | "help" | "h" | "?" => Command::Help,
        "salir" | "exit" | "quit" | "q" => Command::Exit,
        _ => Command::Unknown {
            input: input.to_string(),
        },
    }
}

/// Parse a line for the given step.
///
/// `checklist_len` is the length of the current red-flag checklist, zero
/// when the generic prompt applies.
pub fn parse_input(step: WizardStep, line: &str, checklist_len: usize) -> WizardInput {
    let trimmed = line.trim();

    if is_command(trimmed) {
        return WizardInput::Command(parse_command(trimmed));
    }
    if trimmed.is_empty() {
        return WizardInput::Continue;
    }

    let choice = trimmed.parse::<usize>().ok();

    match step {
        WizardStep::Symptom => match choice {
            Some(n) if (1..=SymptomCategory::KNOWN.len()).contains(&n) => {
                WizardInput::SelectCategory(SymptomCategory::KNOWN[n - 1])
            }
            _ => match SymptomCategory::from_label(trimmed) {
                Some(cat) if cat.is_known() => WizardInput::SelectCategory(cat),
                _ => WizardInput::SymptomText(trimmed.to_string()),
            },
        },
        // Bare numbers are onset times ("3" days); types need "tipo N" or the word
        WizardStep::Onset => {
            let lowered = trimmed.to_lowercase();
            let type_choice = lowered
                .strip_prefix("tipo")
                .and_then(|rest| rest.trim().parse::<usize>().ok());
            match (type_choice, lowered.as_str()) {
                (Some(n), _) if (1..=OnsetType::ALL.len()).contains(&n) => {
                    WizardInput::OnsetType(OnsetType::ALL[n - 1])
                }
                (Some(_), _) => WizardInput::Invalid(format!(
                    "Elige tipo 1 a tipo {}",
                    OnsetType::ALL.len()
                )),
                (None, "brusco") => WizardInput::OnsetType(OnsetType::Sudden),
                (None, "progresivo") => WizardInput::OnsetType(OnsetType::Gradual),
                (None, _) => WizardInput::OnsetTime(trimmed.to_string()),
            }
        }
        WizardStep::Evolution => match choice {
            Some(n) if (1..=Evolution::ALL.len()).contains(&n) => {
                WizardInput::Evolution(Evolution::ALL[n - 1])
            }
            _ => WizardInput::Invalid(format!(
                "Elige una opción entre 1 y {}",
                Evolution::ALL.len()
            )),
        },
        WizardStep::RedFlags => match choice {
            Some(n) if checklist_len > 0 && (1..=checklist_len).contains(&n) => {
                WizardInput::ToggleRedFlag(n - 1)
            }
            Some(_) if checklist_len > 0 => WizardInput::Invalid(format!(
                "Elige una comprobación entre 1 y {}",
                checklist_len
            )),
            _ => WizardInput::RedFlagNotes(trimmed.to_string()),
        },
        WizardStep::Vitals => parse_vital(trimmed),
        WizardStep::RiskFactors => match choice {
            Some(n) if (1..=RiskFactor::ALL.len()).contains(&n) => {
                WizardInput::ToggleRiskFactor(RiskFactor::ALL[n - 1])
            }
            _ => WizardInput::Invalid(format!(
                "Elige un factor entre 1 y {}",
                RiskFactor::ALL.len()
            )),
        },
        WizardStep::Result => match choice {
            Some(1) => WizardInput::Command(Command::Restart),
            Some(2) => WizardInput::Command(Command::Home),
            _ => WizardInput::Invalid("Pulsa 1 para una nueva valoración o 2 para volver al inicio".to_string()),
        },
    }
}

fn parse_vital(line: &str) -> WizardInput {
    let mut parts = line.splitn(2, char::is_whitespace);
    let key = parts.next().unwrap_or("").to_lowercase();
    let value = parts.next().unwrap_or("").trim();
    let clear = value == "-" || value.eq_ignore_ascii_case("borrar");

    let raw = |v: &str| {
        if clear {
            None
        } else {
            Some(v.to_string())
        }
    };

    let input = match key.as_str() {
        "sat" | "sato2" | "saturacion" | "saturación" if !value.is_empty() => {
            VitalInput::Saturation(raw(value))
        }
        "temp" | "temperatura" if !value.is_empty() => VitalInput::Temperature(raw(value)),
        "resp" | "respiracion" | "respiración" => match parse_yes_no(value) {
            Some(yes) => VitalInput::Breathing(yes),
            None => return yes_no_hint(&key),
        },
        "conc" | "consciencia" | "conocimiento" => match parse_yes_no(value) {
            Some(yes) => VitalInput::Consciousness(yes),
            None => return yes_no_hint(&key),
        },
        "sangrado" | "sangre" => match parse_yes_no(value) {
            Some(yes) => VitalInput::Bleeding(yes),
            None => return yes_no_hint(&key),
        },
        _ => {
            return WizardInput::Invalid(
                "Formato: sat 92 | temp 38.5 | resp si/no | conc si/no | sangrado si/no".to_string(),
            )
        }
    };

    WizardInput::Vital(input)
}

fn yes_no_hint(key: &str) -> WizardInput {
    WizardInput::Invalid(format!("Responde '{} si' o '{} no'", key, key))
}

/// Parse a yes/no answer
pub fn parse_yes_no(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "si" | "sí" | "s" | "yes" | "y" => Some(true),
        "no" | "n" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_commands() {
        assert_eq!(parse_command("/atras"), Command::Back);
        assert_eq!(parse_command("/BACK"), Command::Back);
        assert_eq!(parse_command("/finalizar"), Command::Submit);
        assert_eq!(parse_command("/nuevo"), Command::Restart);
        assert_eq!(parse_command("/salir"), Command::Exit);
        assert_eq!(parse_command("/?"), Command::Help);
        assert!(matches!(parse_command("/bogus"), Command::Unknown { .. }));
        assert!(matches!(parse_command("atras"), Command::Unknown { .. }));
    }

    #[test]
    fn test_empty_line_continues() {
        assert_eq!(parse_input(WizardStep::Onset, "   ", 0), WizardInput::Continue);
    }

    #[test]
    fn test_symptom_step() {
        assert_eq!(
            parse_input(WizardStep::Symptom, "1", 0),
            WizardInput::SelectCategory(SymptomCategory::ChestPain)
        );
        assert_eq!(
            parse_input(WizardStep::Symptom, "traumatismos", 0),
            WizardInput::SelectCategory(SymptomCategory::Trauma)
        );
        assert_eq!(
            parse_input(WizardStep::Symptom, "Dolor de cabeza intenso", 0),
            WizardInput::SymptomText("Dolor de cabeza intenso".to_string())
        );
        assert_eq!(
            parse_input(WizardStep::Symptom, "7", 0),
            WizardInput::SymptomText("7".to_string())
        );
    }

    #[test]
    fn test_onset_step() {
        assert_eq!(
            parse_input(WizardStep::Onset, "tipo 1", 0),
            WizardInput::OnsetType(OnsetType::Sudden)
        );
        assert_eq!(
            parse_input(WizardStep::Onset, "Tipo 2", 0),
            WizardInput::OnsetType(OnsetType::Gradual)
        );
        assert!(matches!(
            parse_input(WizardStep::Onset, "tipo 3", 0),
            WizardInput::Invalid(_)
        ));
        assert_eq!(
            parse_input(WizardStep::Onset, "progresivo", 0),
            WizardInput::OnsetType(OnsetType::Gradual)
        );
        assert_eq!(
            parse_input(WizardStep::Onset, "Hace 20 minutos", 0),
            WizardInput::OnsetTime("Hace 20 minutos".to_string())
        );
    }

    #[test]
    fn test_onset_bare_number_is_time() {
        assert_eq!(
            parse_input(WizardStep::Onset, "1", 0),
            WizardInput::OnsetTime("1".to_string())
        );
        assert_eq!(
            parse_input(WizardStep::Onset, "2", 0),
            WizardInput::OnsetTime("2".to_string())
        );
    }

    #[test]
    fn test_evolution_step() {
        assert_eq!(
            parse_input(WizardStep::Evolution, "3", 0),
            WizardInput::Evolution(Evolution::Worsening)
        );
        assert!(matches!(
            parse_input(WizardStep::Evolution, "peor", 0),
            WizardInput::Invalid(_)
        ));
    }

    #[test]
    fn test_red_flag_step() {
        assert_eq!(parse_input(WizardStep::RedFlags, "2", 4), WizardInput::ToggleRedFlag(1));
        assert!(matches!(
            parse_input(WizardStep::RedFlags, "5", 4),
            WizardInput::Invalid(_)
        ));
        assert_eq!(
            parse_input(WizardStep::RedFlags, "2", 0),
            WizardInput::RedFlagNotes("2".to_string())
        );
        assert_eq!(
            parse_input(WizardStep::RedFlags, "me cuesta respirar", 4),
            WizardInput::RedFlagNotes("me cuesta respirar".to_string())
        );
    }

    #[test]
    fn test_vital_step() {
        assert_eq!(
            parse_input(WizardStep::Vitals, "sat 90", 0),
            WizardInput::Vital(VitalInput::Saturation(Some("90".to_string())))
        );
        assert_eq!(
            parse_input(WizardStep::Vitals, "temp -", 0),
            WizardInput::Vital(VitalInput::Temperature(None))
        );
        assert_eq!(
            parse_input(WizardStep::Vitals, "resp sí", 0),
            WizardInput::Vital(VitalInput::Breathing(true))
        );
        assert_eq!(
            parse_input(WizardStep::Vitals, "sangrado no", 0),
            WizardInput::Vital(VitalInput::Bleeding(false))
        );
        assert!(matches!(
            parse_input(WizardStep::Vitals, "conc tal vez", 0),
            WizardInput::Invalid(_)
        ));
        assert!(matches!(
            parse_input(WizardStep::Vitals, "pulso 80", 0),
            WizardInput::Invalid(_)
        ));
    }

    #[test]
    fn test_risk_factor_step() {
        assert_eq!(
            parse_input(WizardStep::RiskFactors, "9", 0),
            WizardInput::ToggleRiskFactor(RiskFactor::AgeOver65)
        );
        assert!(matches!(
            parse_input(WizardStep::RiskFactors, "10", 0),
            WizardInput::Invalid(_)
        ));
    }

    #[test]
    fn test_result_step() {
        assert_eq!(
            parse_input(WizardStep::Result, "1", 0),
            WizardInput::Command(Command::Restart)
        );
        assert_eq!(
            parse_input(WizardStep::Result, "2", 0),
            WizardInput::Command(Command::Home)
        );
    }

    #[test]
    fn test_yes_no() {
        assert_eq!(parse_yes_no("Sí"), Some(true));
        assert_eq!(parse_yes_no("n"), Some(false));
        assert_eq!(parse_yes_no(""), None);
    }
}
