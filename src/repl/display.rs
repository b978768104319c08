//! Display manager for the terminal wizard
//!
//! Renders each step, the waiting spinner and the sectioned result.
//! Step bodies are built as lines first so they can be checked in tests.

use crate::wizard::{
    red_flag_protocol, vital_groups, Evolution, GuidedTriage, OnsetType, RiskFactor,
    SymptomCategory, VitalGroup, WizardStep, GENERIC_RED_FLAG_PROMPT, TOTAL_STEPS,
};
use colored::*;
use crossterm::{
    cursor, execute,
    terminal::{Clear, ClearType},
};
use indicatif::{ProgressBar, ProgressStyle};
use std::io;
use std::time::Duration;

/// Width of the step progress bar
const PROGRESS_WIDTH: usize = 30;

/// Display manager for the wizard UI
pub struct DisplayManager {
    current_bar: Option<ProgressBar>,
    show_progress: bool,
    update_interval: Duration,
}

fn mark(selected: bool) -> ColoredString {
    if selected {
        "[x]".green().bold()
    } else {
        "[ ]".dimmed()
    }
}

impl DisplayManager {
    pub fn new(show_progress: bool, color_output: bool) -> Self {
        if !color_output {
            colored::control::set_override(false);
        }
        DisplayManager {
            current_bar: None,
            show_progress,
            update_interval: Duration::from_millis(100),
        }
    }

    /// Show welcome banner
    pub fn show_banner(&self, version: &str, model: &str) {
        let width = 64;
        println!("\n{}", "=".repeat(width).cyan());
        println!(
            "{}",
            format!("  TriageBuddy {} - Asistente de Triaje", version).bold().cyan()
        );
        println!("{}", format!("  Modelo: {}", model).dimmed());
        println!("{}\n", "=".repeat(width).cyan());
        println!(
            "{}",
            "Esta valoración es orientativa. Ante una emergencia llame al 112.".yellow()
        );
    }

    /// Welcome screen options
    pub fn show_home_menu(&self) {
        println!("\n{}", "¿Qué desea hacer?".bold());
        println!("  {}. Triaje guiado", "1".cyan());
        println!("  {}. Admisión de urgencias (quiosco)", "2".cyan());
        println!("  {}. Salir", "3".cyan());
    }

    /// "PASO n / 6" line with a bar
    pub fn progress_line(step: WizardStep, kiosk: bool) -> String {
        let n = step.number().min(TOTAL_STEPS) as usize;
        let filled = PROGRESS_WIDTH * n / TOTAL_STEPS as usize;
        let label = if kiosk {
            "Admisión de Urgencias"
        } else {
            "Progreso del Triaje"
        };
        format!(
            "{}  [{}{}] Paso {} / {}",
            label,
            "=".repeat(filled),
            " ".repeat(PROGRESS_WIDTH - filled),
            n,
            TOTAL_STEPS
        )
    }

    /// Title line of a step
    pub fn step_title(step: WizardStep, kiosk: bool) -> String {
        if kiosk && step == WizardStep::Symptom {
            return "¿En qué puedo ayudarte hoy?".to_string();
        }
        format!("PASO {}: {}", step.number(), step.title())
    }

    /// Body of the current step
    pub fn step_lines(wizard: &GuidedTriage) -> Vec<String> {
        let form = wizard.form();
        let mut lines = Vec::new();

        match wizard.step() {
            WizardStep::Symptom => {
                if !wizard.is_kiosk() {
                    lines.push("Selecciona la categoría que mejor describe tu problema o descríbelo:".to_string());
                }
                for (i, cat) in SymptomCategory::KNOWN.iter().enumerate() {
                    let selected = form.symptom_category == Some(*cat);
                    let hint = cat.alert_hint().unwrap_or_default();
                    lines.push(format!(
                        "  {} {}. {}  {}",
                        mark(selected),
                        i + 1,
                        cat.label(),
                        hint.dimmed()
                    ));
                }
                if wizard.accepts_free_text() {
                    let text = if form.symptom_free_text.is_empty() {
                        "(escribe para describir otro motivo)".dimmed().to_string()
                    } else {
                        form.symptom_free_text.clone()
                    };
                    lines.push(format!("  Otro / Descripción detallada: {}", text));
                }
                lines.push(Self::footer(wizard, "Siguiente", "/cancelar para salir"));
            }
            WizardStep::Onset => {
                let time = if form.onset_time.is_empty() {
                    "Ej: Hace 20 minutos, esta madrugada...".dimmed().to_string()
                } else {
                    form.onset_time.clone()
                };
                lines.push(format!("¿Cuándo comenzó el síntoma? {}", time));
                lines.push("¿Cómo apareció?".to_string());
                for (i, t) in OnsetType::ALL.iter().enumerate() {
                    lines.push(format!(
                        "  {} tipo {}. {}",
                        mark(form.onset_type == Some(*t)),
                        i + 1,
                        t.label()
                    ));
                }
                lines.push(
                    "Escribe \"tipo 1\" o \"tipo 2\"; cualquier otro texto es el momento de inicio"
                        .dimmed()
                        .to_string(),
                );
                lines.push(Self::footer(wizard, "Siguiente", "/atras"));
            }
            WizardStep::Evolution => {
                lines.push("¿Cómo se comporta el síntoma ahora?".to_string());
                for (i, e) in Evolution::ALL.iter().enumerate() {
                    lines.push(format!(
                        "  {} {}. {}",
                        mark(form.evolution == Some(*e)),
                        i + 1,
                        e.label()
                    ));
                }
                lines.push(Self::footer(wizard, "Siguiente", "/atras"));
            }
            WizardStep::RedFlags => {
                match red_flag_protocol(form.symptom_category) {
                    Some(protocol) => {
                        lines.push(format!("{} {}", "⚠".red(), protocol.title.red().bold()));
                        for (i, check) in protocol.checks.iter().enumerate() {
                            let selected = form.selected_red_flags.iter().any(|f| f == check);
                            lines.push(format!("  {} {}. {}", mark(selected), i + 1, check));
                        }
                    }
                    None => {
                        lines.push("Valoración general".bold().to_string());
                        lines.push(GENERIC_RED_FLAG_PROMPT.to_string());
                    }
                }
                if wizard.accepts_free_text() {
                    let notes = if form.free_text_red_flags.is_empty() {
                        "(escribe aquí otros detalles si es necesario)".dimmed().to_string()
                    } else {
                        form.free_text_red_flags.clone()
                    };
                    lines.push(format!("  Otros síntomas o detalles: {}", notes));
                }
                let label = if form.has_red_flags() {
                    "Siguiente"
                } else {
                    "Ninguno / Continuar"
                };
                lines.push(Self::footer(wizard, label, "/atras"));
            }
            WizardStep::Vitals => {
                lines.push("Si conoces estos datos, ayúdanos a precisar. Si no, pulsa Enter para continuar.".to_string());
                let groups = vital_groups(form.symptom_category);
                if groups.is_empty() {
                    lines.push("  No se solicitan signos vitales para este motivo.".dimmed().to_string());
                }
                let v = &form.vitals;
                let unset = || "-".dimmed().to_string();
                for group in groups {
                    match group {
                        VitalGroup::Respiratory => {
                            lines.push(format!(
                                "  Saturación de Oxígeno (%) [sat N]: {}",
                                v.oxygen_saturation.map(|s| s.to_string()).unwrap_or_else(unset)
                            ));
                            lines.push(format!(
                                "  ¿Te cuesta hablar frases completas? [resp si/no]: {}",
                                v.breathing.map(|b| b.label().to_string()).unwrap_or_else(unset)
                            ));
                        }
                        VitalGroup::Fever => lines.push(format!(
                            "  Temperatura (ºC) [temp N]: {}",
                            v.temperature.map(|t| t.to_string()).unwrap_or_else(unset)
                        )),
                        VitalGroup::Neurological => lines.push(format!(
                            "  ¿Has perdido el conocimiento? [conc si/no]: {}",
                            v.consciousness.map(|c| c.label().to_string()).unwrap_or_else(unset)
                        )),
                        VitalGroup::Bleeding => lines.push(format!(
                            "  ¿Hay sangrado activo visible? [sangrado si/no]: {}",
                            v.bleeding.map(|b| b.label().to_string()).unwrap_or_else(unset)
                        )),
                    }
                }
                lines.push(Self::footer(wizard, "Continuar", "/atras"));
            }
            WizardStep::RiskFactors => {
                lines.push("Seleccione si aplica alguno de estos antecedentes:".to_string());
                for (i, factor) in RiskFactor::ALL.iter().enumerate() {
                    let selected = form.risk_factors.contains(factor);
                    let sign = if selected { "✓".green().bold() } else { "+".dimmed() };
                    lines.push(format!("  {} {}. {}", sign, i + 1, factor.label()));
                }
                lines.push(format!(
                    "{} FINALIZAR TRIAJE  {}",
                    "[Enter]".green().bold(),
                    "/atras".dimmed()
                ));
            }
            WizardStep::Result => {
                if wizard.is_loading() {
                    lines.push("Analizando gravedad...".to_string());
                } else {
                    lines.push("1. Nueva Valoración   2. Volver al Inicio".to_string());
                }
            }
        }

        lines
    }

    fn footer(wizard: &GuidedTriage, label: &str, extra: &str) -> String {
        let action = if wizard.can_advance() {
            format!("[Enter] {}", label).green().bold()
        } else {
            format!("[Enter] {}", label).dimmed()
        };
        format!("{}  {}", action, extra.dimmed())
    }

    /// Print header and body of the current step
    pub fn render_step(&self, wizard: &GuidedTriage) {
        let step = wizard.step();
        println!();
        if !step.is_terminal() {
            println!("{}", Self::progress_line(step, wizard.is_kiosk()).dimmed());
        }
        println!("{}", Self::step_title(step, wizard.is_kiosk()).bold().cyan());
        for line in Self::step_lines(wizard) {
            println!("{}", line);
        }
    }

    /// Spinner shown while the assessor call is pending
    pub fn start_assessment(&mut self, model: &str) -> Option<ProgressBar> {
        if !self.show_progress {
            println!("Analizando gravedad...");
            return None;
        }
        self.finish_current();

        let pb = ProgressBar::new_spinner();
        let style = ProgressStyle::default_spinner()
            .template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner());
        pb.set_style(style);
        pb.set_message(format!("Analizando gravedad... (consultando {})", model));
        pb.enable_steady_tick(self.update_interval);

        self.current_bar = Some(pb.clone());
        Some(pb)
    }

    pub fn finish_current(&mut self) {
        if let Some(pb) = self.current_bar.take() {
            pb.finish_and_clear();
        }
    }

    /// Print the assessment sections
    pub fn show_result(&mut self, wizard: &GuidedTriage) {
        self.finish_current();

        println!("\n{}", "RESULTADO DE VALORACIÓN".bold());
        println!("{}", "-".repeat(60).cyan());

        let failed = wizard.result().map(|r| r.failed).unwrap_or(false);
        for section in wizard.sections() {
            if let Some(heading) = &section.heading {
                println!("\n{}", heading.to_uppercase().bold().cyan());
            }
            if failed {
                println!("{}", section.body.red());
            } else if !section.body.is_empty() {
                println!("{}", section.body);
            }
        }
        println!();
        for line in Self::step_lines(wizard) {
            println!("{}", line);
        }
    }

    /// Print every checklist and vital-group mapping
    pub fn show_protocols(&self) {
        println!("{}", "Protocolos de banderas rojas".bold().cyan());
        for cat in SymptomCategory::KNOWN {
            println!("\n{}", cat.label().bold());
            if let Some(protocol) = red_flag_protocol(Some(cat)) {
                println!("  {}", protocol.title);
                for check in protocol.checks {
                    println!("    • {}", check);
                }
            }
            let groups: Vec<_> = vital_groups(Some(cat)).iter().map(|g| g.label()).collect();
            let groups = if groups.is_empty() {
                "ninguno".to_string()
            } else {
                groups.join(", ")
            };
            println!("  Signos vitales: {}", groups.dimmed());
        }
        println!("\n{}", SymptomCategory::Other.label().bold());
        println!("  {}", GENERIC_RED_FLAG_PROMPT);
        println!("  Signos vitales: {}", "ninguno".dimmed());
        println!("\n{}", "Sin categoría (solo descripción libre)".bold());
        println!("  {}", GENERIC_RED_FLAG_PROMPT);
        println!("  Signos vitales: {}", "todos".dimmed());
    }

    pub fn show_help(&self, step: WizardStep) {
        println!("\n{}", "Ayuda".bold().cyan());
        println!("  Enter vacío       Siguiente / Finalizar");
        println!("  /atras            Paso anterior");
        println!("  /cancelar         Salir del triaje (solo paso 1)");
        println!("  /nuevo, /inicio   Tras el resultado");
        println!("  /salir            Cerrar el programa");
        if step == WizardStep::Vitals {
            println!("  sat 92 | temp 38.5 | resp si/no | conc si/no | sangrado si/no  (valor '-' borra)");
        }
    }

    pub fn show_error(&self, error: &str) {
        println!("{} {}", "Error:".red().bold(), error.red());
    }

    pub fn show_warning(&self, warning: &str) {
        println!("{} {}", "Aviso:".yellow().bold(), warning.yellow());
    }

    pub fn show_info(&self, info: &str) {
        println!("{} {}", "Info:".cyan(), info);
    }

    pub fn clear_screen(&self) -> io::Result<()> {
        execute!(io::stdout(), Clear(ClearType::All), cursor::MoveTo(0, 0))
    }
}

impl Default for DisplayManager {
    fn default() -> Self {
        Self::new(true, true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn joined(wizard: &GuidedTriage) -> String {
        DisplayManager::step_lines(wizard).join("\n")
    }

    #[test]
    fn test_progress_line() {
        let line = DisplayManager::progress_line(WizardStep::Evolution, false);
        assert!(line.contains("Paso 3 / 6"));
        assert!(line.starts_with("Progreso del Triaje"));
        assert!(DisplayManager::progress_line(WizardStep::Symptom, true)
            .starts_with("Admisión de Urgencias"));
    }

    #[test]
    fn test_step_title() {
        assert_eq!(
            DisplayManager::step_title(WizardStep::Onset, false),
            "PASO 2: Inicio"
        );
        assert_eq!(
            DisplayManager::step_title(WizardStep::Symptom, true),
            "¿En qué puedo ayudarte hoy?"
        );
    }

    #[test]
    fn test_symptom_step_hides_free_text_in_kiosk() {
        assert!(joined(&GuidedTriage::new(false)).contains("Otro / Descripción detallada"));
        assert!(!joined(&GuidedTriage::new(true)).contains("Otro / Descripción detallada"));
    }

    #[test]
    fn test_red_flag_step_checklist_and_generic() {
        let mut wizard = GuidedTriage::new(false);
        wizard.select_category(SymptomCategory::Breathing).unwrap();
        wizard.next().unwrap();
        wizard.set_onset_time("hoy").unwrap();
        wizard.set_onset_type(OnsetType::Sudden).unwrap();
        wizard.next().unwrap();
        wizard.set_evolution(Evolution::Worsening).unwrap();
        wizard.next().unwrap();
        let text = joined(&wizard);
        assert!(text.contains("Coloración azulada en labios o dedos"));
        assert!(text.contains("Ninguno / Continuar"));

        let mut wizard = GuidedTriage::new(false);
        wizard.set_symptom_text("picor").unwrap();
        wizard.next().unwrap();
        wizard.set_onset_time("hoy").unwrap();
        wizard.set_onset_type(OnsetType::Sudden).unwrap();
        wizard.next().unwrap();
        wizard.set_evolution(Evolution::Stable).unwrap();
        wizard.next().unwrap();
        assert!(joined(&wizard).contains(GENERIC_RED_FLAG_PROMPT));
    }

    #[test]
    fn test_start_assessment_without_progress() {
        let mut manager = DisplayManager::new(false, false);
        assert!(manager.start_assessment("m").is_none());
        assert!(manager.current_bar.is_none());
    }

    #[test]
    fn test_start_assessment_spinner() {
        let mut manager = DisplayManager::new(true, false);
        let pb = manager.start_assessment("m");
        assert!(pb.is_some());
        assert!(manager.current_bar.is_some());
        manager.finish_current();
        assert!(manager.current_bar.is_none());
    }
}
