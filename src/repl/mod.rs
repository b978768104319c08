//! Interactive terminal front end
//!
//! Drives a `GuidedTriage` from the keyboard: a home menu, the six
//! wizard steps and the result screen. The wizard core never touches the
//! terminal; this module reads lines, maps them to wizard operations and
//! renders the new state.

pub mod commands;
pub mod display;
pub mod input;

use anyhow::Result;
use std::path::PathBuf;
use std::sync::mpsc;
use std::sync::Arc;
use tracing::{debug, info};

use crate::assess::Assessor;
use crate::errors::TriageError;
use crate::repl::commands::{parse_input, Command, VitalInput, WizardInput};
pub use crate::repl::display::DisplayManager;
use crate::repl::input::{InputHandler, ReadOutcome};
use crate::telemetry::TelemetryCollector;
use crate::wizard::{
    Bleeding, BreathingDifficulty, Consciousness, ExitReason, GuidedTriage, Vitals,
    WizardAction, WizardStep,
};

/// What the driver should do after one line of input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplAction {
    /// State changed, redraw the step
    Render,
    /// Call the assessor
    Submit,
    Help,
    /// Input was not understood; show the hint
    Hint(String),
    /// The wizard was left through cancel or return-home
    Left(ExitReason),
    /// Close the program
    Quit,
}

/// How a wizard session ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEnd {
    Home(ExitReason),
    Quit,
}

/// Configuration for the terminal front end
#[derive(Debug, Clone)]
pub struct ReplConfig {
    pub history_file: Option<PathBuf>,
    pub show_progress: bool,
    pub color_output: bool,
    pub model: String,
}

impl Default for ReplConfig {
    fn default() -> Self {
        ReplConfig {
            history_file: None,
            show_progress: true,
            color_output: true,
            model: crate::assess::DEFAULT_MODEL.to_string(),
        }
    }
}

impl ReplConfig {
    pub fn with_history(path: PathBuf) -> Self {
        ReplConfig {
            history_file: Some(path),
            ..Default::default()
        }
    }
}

/// Apply one parsed line to the wizard
pub fn apply_input(
    wizard: &mut GuidedTriage,
    input: WizardInput,
) -> crate::errors::Result<ReplAction> {
    let action = match input {
        WizardInput::Command(command) => return apply_command(wizard, command),
        WizardInput::Continue => match wizard.step() {
            WizardStep::RiskFactors => ReplAction::Submit,
            WizardStep::Result => ReplAction::Hint(
                "Pulsa 1 para una nueva valoración o 2 para volver al inicio".to_string(),
            ),
            _ => {
                wizard.next()?;
                ReplAction::Render
            }
        },
        WizardInput::SelectCategory(category) => {
            wizard.select_category(category)?;
            ReplAction::Render
        }
        WizardInput::SymptomText(text) => {
            wizard.set_symptom_text(&text)?;
            ReplAction::Render
        }
        WizardInput::OnsetTime(text) => {
            wizard.set_onset_time(&text)?;
            ReplAction::Render
        }
        WizardInput::OnsetType(onset) => {
            wizard.set_onset_type(onset)?;
            ReplAction::Render
        }
        WizardInput::Evolution(evolution) => {
            wizard.set_evolution(evolution)?;
            ReplAction::Render
        }
        WizardInput::ToggleRedFlag(index) => {
            wizard.toggle_red_flag_at(index)?;
            ReplAction::Render
        }
        WizardInput::RedFlagNotes(notes) => {
            wizard.set_red_flag_notes(&notes)?;
            ReplAction::Render
        }
        WizardInput::Vital(vital) => {
            apply_vital(wizard, vital)?;
            ReplAction::Render
        }
        WizardInput::ToggleRiskFactor(factor) => {
            wizard.toggle_risk_factor(factor)?;
            ReplAction::Render
        }
        WizardInput::Invalid(hint) => ReplAction::Hint(hint),
    };
    Ok(action)
}

fn apply_command(
    wizard: &mut GuidedTriage,
    command: Command,
) -> crate::errors::Result<ReplAction> {
    let action = match command {
        Command::Next if wizard.step() == WizardStep::RiskFactors => ReplAction::Submit,
        Command::Next => {
            wizard.next()?;
            ReplAction::Render
        }
        Command::Submit => {
            wizard.step().transition(WizardAction::Submit)?;
            ReplAction::Submit
        }
        Command::Back => {
            wizard.back()?;
            ReplAction::Render
        }
        Command::Restart => {
            wizard.restart()?;
            ReplAction::Render
        }
        Command::Home => ReplAction::Left(wizard.exit()?),
        Command::Cancel => ReplAction::Left(wizard.cancel()?),
        Command::Help => ReplAction::Help,
        Command::Exit => ReplAction::Quit,
        Command::Unknown { input } => {
            ReplAction::Hint(format!("Comando desconocido: {} (use /ayuda)", input))
        }
    };
    Ok(action)
}

fn apply_vital(wizard: &mut GuidedTriage, vital: VitalInput) -> crate::errors::Result<()> {
    match vital {
        VitalInput::Saturation(raw) => {
            let value = raw
                .map(|r| Vitals::parse_oxygen_saturation(&r))
                .transpose()?;
            wizard.set_oxygen_saturation(value)
        }
        VitalInput::Temperature(raw) => {
            let value = raw.map(|r| Vitals::parse_temperature(&r)).transpose()?;
            wizard.set_temperature(value)
        }
        VitalInput::Breathing(difficult) => wizard.set_breathing(Some(if difficult {
            BreathingDifficulty::Difficult
        } else {
            BreathingDifficulty::Normal
        })),
        VitalInput::Consciousness(lost) => wizard.set_consciousness(Some(if lost {
            Consciousness::LossOfConsciousness
        } else {
            Consciousness::Normal
        })),
        VitalInput::Bleeding(active) => wizard.set_bleeding(Some(if active {
            Bleeding::Active
        } else {
            Bleeding::None
        })),
    }
}

/// User-facing message for a refused operation
pub fn describe_error(err: &TriageError) -> String {
    match err {
        TriageError::StepIncomplete { step: 1 } => {
            "Selecciona una categoría o describe el síntoma para continuar".to_string()
        }
        TriageError::StepIncomplete { step: 2 } => {
            "Indica cuándo comenzó y si fue brusco o progresivo".to_string()
        }
        TriageError::StepIncomplete { step: 3 } => {
            "Indica si el síntoma mejora, sigue igual o empeora".to_string()
        }
        TriageError::InvalidTransition { .. } => {
            "Esa acción no está disponible en este paso".to_string()
        }
        TriageError::NotAvailableInKiosk(_) => {
            "En modo quiosco elige una de las opciones numeradas".to_string()
        }
        TriageError::UnknownRedFlag(_) => {
            "Esa comprobación no corresponde al motivo de consulta".to_string()
        }
        TriageError::InvalidVital { field, value, .. } => {
            format!("Valor no válido para {}: {}", field, value)
        }
        other => other.to_string(),
    }
}

/// Terminal session: home menu plus any number of wizard runs
pub struct TriageRepl {
    input: InputHandler,
    display: DisplayManager,
    assessor: Arc<dyn Assessor>,
    telemetry: TelemetryCollector,
    model: String,
}

impl TriageRepl {
    pub fn new(
        assessor: Arc<dyn Assessor>,
        telemetry: TelemetryCollector,
        config: ReplConfig,
    ) -> Result<Self> {
        let input = match config.history_file {
            Some(path) => InputHandler::with_history(path)?,
            None => InputHandler::new()?,
        };

        Ok(TriageRepl {
            input,
            display: DisplayManager::new(config.show_progress, config.color_output),
            assessor,
            telemetry,
            model: config.model,
        })
    }

    pub fn show_welcome(&self, version: &str) {
        self.display.show_banner(version, &self.model);
    }

    /// Welcome screen loop
    pub async fn run_home(&mut self) -> Result<()> {
        loop {
            self.display.show_home_menu();
            self.input.set_prompt("inicio> ".to_string());

            let line = match self.input.read_line()? {
                ReadOutcome::Line(line) => line,
                ReadOutcome::Interrupted | ReadOutcome::Eof => break,
            };

            let kiosk = match line.as_str() {
                "1" => false,
                "2" => true,
                "3" | "/salir" | "/exit" | "/quit" => break,
                _ => {
                    self.display.show_warning("Elige 1, 2 o 3");
                    continue;
                }
            };

            if self.run_wizard(kiosk).await? == SessionEnd::Quit {
                break;
            }
        }

        self.save()
    }

    /// One wizard session, until cancel, return-home or quit
    pub async fn run_wizard(&mut self, kiosk: bool) -> Result<SessionEnd> {
        let (tx, rx) = mpsc::channel();
        let mut wizard = GuidedTriage::new(kiosk)
            .with_telemetry(self.telemetry.clone())
            .with_exit_handler(Box::new(move |reason: ExitReason| {
                let _ = tx.send(reason);
            }));
        info!(session = %wizard.session_id(), kiosk, "Wizard session started");

        self.input.set_prompt(if kiosk {
            "quiosco> ".to_string()
        } else {
            input::DEFAULT_PROMPT.to_string()
        });
        if let Err(e) = self.display.clear_screen() {
            debug!(error = %e, "Could not clear terminal");
        }
        self.display.render_step(&wizard);

        loop {
            let line = match self.input.read_line()? {
                ReadOutcome::Line(line) => line,
                ReadOutcome::Interrupted => {
                    self.display.show_info("Use /salir para cerrar el programa");
                    continue;
                }
                ReadOutcome::Eof => return Ok(SessionEnd::Quit),
            };

            let checklist_len = wizard
                .red_flag_protocol()
                .map(|p| p.checks.len())
                .unwrap_or(0);
            let parsed = parse_input(wizard.step(), &line, checklist_len);
            debug!(step = wizard.step().number(), input = ?parsed, "Wizard input");

            match apply_input(&mut wizard, parsed) {
                Ok(ReplAction::Render) => self.display.render_step(&wizard),
                Ok(ReplAction::Submit) => self.submit(&mut wizard).await?,
                Ok(ReplAction::Help) => self.display.show_help(wizard.step()),
                Ok(ReplAction::Hint(hint)) => self.display.show_warning(&hint),
                Ok(ReplAction::Left(_)) => {}
                Ok(ReplAction::Quit) => return Ok(SessionEnd::Quit),
                Err(e) => self.display.show_error(&describe_error(&e)),
            }

            if let Ok(reason) = rx.try_recv() {
                info!(session = %wizard.session_id(), ?reason, "Wizard session ended");
                return Ok(SessionEnd::Home(reason));
            }
        }
    }

    async fn submit(&mut self, wizard: &mut GuidedTriage) -> Result<()> {
        let payload = wizard.begin_submission()?;
        let spinner = self.display.start_assessment(&self.model);

        let outcome = self.assessor.assess(&payload).await;

        if let Some(pb) = spinner {
            pb.finish_and_clear();
        }
        wizard.complete_submission(outcome)?;
        self.display.show_result(wizard);
        Ok(())
    }

    pub fn save(&mut self) -> Result<()> {
        self.input.save_history()
    }
}
