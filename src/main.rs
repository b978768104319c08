//! TriageBuddy - Main CLI Entry Point

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use std::sync::Arc;
use triagebuddy::{
    assess::{Assessor, OllamaAssessor},
    cli::{Args, Commands, Config, Verbosity},
    doctor::Doctor,
    repl::{DisplayManager, ReplConfig, SessionEnd, TriageRepl},
    telemetry::{TelemetryCollector, TelemetryDisplay},
};

const VERSION: &str = env!("CARGO_PKG_VERSION");

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    if let Err(msg) = args.validate() {
        eprintln!("{} {}", "Error:".red().bold(), msg);
        std::process::exit(2);
    }

    let mut config = Config::load(args.config.as_deref()).context("Failed to load configuration")?;
    args.apply_overrides(&mut config);
    config.validate()?;

    init_logging(config.verbosity());

    match args.command() {
        Commands::Start => run_session(&config, None).await?,
        Commands::Guided => run_session(&config, Some(config.wizard.kiosk)).await?,
        Commands::Doctor => run_doctor(&config).await?,
        Commands::Config => show_config(&config)?,
        Commands::Protocols => DisplayManager::new(false, config.telemetry.color_output).show_protocols(),
    }

    Ok(())
}

/// `RUST_LOG` wins over the verbosity flags
fn init_logging(verbosity: Verbosity) {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(verbosity.tracing_filter())),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn build_assessor(config: &Config) -> Result<OllamaAssessor> {
    OllamaAssessor::with_config(&config.ollama_url(), &config.ollama.model, config.request_timeout())
        .context("Failed to create Ollama client")
}

/// Interactive session. `wizard` skips the home menu and opens the wizard
/// directly in the given mode.
async fn run_session(config: &Config, wizard: Option<bool>) -> Result<()> {
    let assessor = build_assessor(config)?;
    let verbosity = config.verbosity();

    if !assessor.health_check().await? {
        eprintln!(
            "{} Ollama no responde en {}. Las valoraciones devolverán el mensaje de error.",
            "Aviso:".yellow().bold(),
            assessor.base_url()
        );
        eprintln!("Inicie Ollama con: ollama serve");
    }

    let telemetry = TelemetryCollector::new();
    let repl_config = ReplConfig {
        history_file: Some(config.history_path()),
        show_progress: config.telemetry.show_progress_bars && verbosity.show_progress(),
        color_output: config.telemetry.color_output,
        model: config.ollama.model.clone(),
    };
    let assessor: Arc<dyn Assessor> = Arc::new(assessor);
    let mut repl = TriageRepl::new(assessor, telemetry.clone(), repl_config)?;

    repl.show_welcome(VERSION);
    match wizard {
        Some(kiosk) => {
            if repl.run_wizard(kiosk).await? == SessionEnd::Quit {
                repl.save()?;
            } else {
                repl.run_home().await?;
            }
        }
        None => repl.run_home().await?,
    }

    TelemetryDisplay::new(telemetry, verbosity).display_summary();
    Ok(())
}

async fn run_doctor(config: &Config) -> Result<()> {
    let doctor = Doctor::new(build_assessor(config)?, config.state_dir());

    let checks = doctor.run_diagnostics().await;
    Doctor::display_results(&checks);

    std::process::exit(if Doctor::overall_status(&checks) { 0 } else { 1 });
}

fn show_config(config: &Config) -> Result<()> {
    let path = Config::default_path()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "(sin directorio personal)".to_string());

    println!("\n{}", "Configuración de TriageBuddy".bold());
    println!("Archivo: {}\n", path.dimmed());
    let rendered = toml::to_string_pretty(config).context("Failed to render configuration")?;
    println!("{}", rendered);
    Ok(())
}
