//! Command-line argument parsing for TriageBuddy
//!
//! Provides clap-based CLI with subcommands and verbosity control.

use crate::cli::config::Config;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// TriageBuddy - guided emergency triage in the terminal
#[derive(Parser, Debug)]
#[command(name = "triagebuddy")]
#[command(version)]
#[command(about = "Guided emergency triage assistant backed by a local Ollama model", long_about = None)]
pub struct Args {
    /// Kiosk mode: walk-up admission flow, picking a category advances immediately
    #[arg(long)]
    pub kiosk: bool,

    /// Ollama model to use (overrides the config file)
    #[arg(short, long)]
    pub model: Option<String>,

    /// Ollama host
    #[arg(long)]
    pub host: Option<String>,

    /// Ollama port
    #[arg(long)]
    pub port: Option<u16>,

    /// Configuration file path
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Verbosity level: -q (quiet), default (normal), -v (verbose), -vv (very verbose)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Quiet mode (only errors are logged)
    #[arg(short, long)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Show the home menu (default)
    Start,

    /// Go straight into the guided triage wizard
    Guided,

    /// Check that Ollama is running and the model is installed
    Doctor,

    /// Display the effective configuration
    Config,

    /// Print the red-flag checklists and vital-sign groups
    Protocols,
}

/// Verbosity level enum
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verbosity {
    Quiet,
    Normal,
    Verbose,
    VeryVerbose,
}

impl Args {
    /// Get verbosity level based on flags
    pub fn verbosity(&self) -> Verbosity {
        if self.quiet {
            Verbosity::Quiet
        } else {
            match self.verbose {
                0 => Verbosity::Normal,
                1 => Verbosity::Verbose,
                _ => Verbosity::VeryVerbose,
            }
        }
    }

    /// Reject contradictory flag combinations
    pub fn validate(&self) -> Result<(), String> {
        if self.quiet && self.verbose > 0 {
            return Err("Cannot combine --quiet with --verbose.".to_string());
        }
        if self.port == Some(0) {
            return Err("Port must be greater than 0.".to_string());
        }
        Ok(())
    }

    /// Apply command-line overrides on top of the file configuration
    pub fn apply_overrides(&self, config: &mut Config) {
        if let Some(model) = &self.model {
            config.ollama.model = model.clone();
        }
        if let Some(host) = &self.host {
            config.ollama.host = host.clone();
        }
        if let Some(port) = self.port {
            config.ollama.port = port;
        }
        if self.kiosk {
            config.wizard.kiosk = true;
        }
        if self.quiet || self.verbose > 0 {
            config.telemetry.default_verbosity = self.verbosity().as_str().to_string();
        }
    }

    /// Subcommand to run, `Start` when none was given
    pub fn command(&self) -> Commands {
        self.command.clone().unwrap_or(Commands::Start)
    }
}

impl Verbosity {
    /// Convert to string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Verbosity::Quiet => "quiet",
            Verbosity::Normal => "normal",
            Verbosity::Verbose => "verbose",
            Verbosity::VeryVerbose => "very_verbose",
        }
    }

    pub fn from_str_opt(value: &str) -> Option<Self> {
        match value {
            "quiet" => Some(Verbosity::Quiet),
            "normal" => Some(Verbosity::Normal),
            "verbose" => Some(Verbosity::Verbose),
            "very_verbose" => Some(Verbosity::VeryVerbose),
            _ => None,
        }
    }

    /// Default tracing filter for this verbosity
    pub fn tracing_filter(&self) -> &'static str {
        match self {
            Verbosity::Quiet => "error",
            Verbosity::Normal => "warn",
            Verbosity::Verbose => "info",
            Verbosity::VeryVerbose => "debug",
        }
    }

    /// Check if should show progress spinners
    pub fn show_progress(&self) -> bool {
        !matches!(self, Verbosity::Quiet)
    }

    /// Check if should show session summaries
    pub fn show_events(&self) -> bool {
        matches!(self, Verbosity::Verbose | Verbosity::VeryVerbose)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(argv: &[&str]) -> Args {
        Args::try_parse_from(argv).unwrap()
    }

    #[test]
    fn test_defaults() {
        let args = parse(&["triagebuddy"]);
        assert!(!args.kiosk);
        assert_eq!(args.verbosity(), Verbosity::Normal);
        assert_eq!(args.command(), Commands::Start);
        assert!(args.validate().is_ok());
    }

    #[test]
    fn test_verbosity_levels() {
        assert_eq!(parse(&["triagebuddy", "-q"]).verbosity(), Verbosity::Quiet);
        assert_eq!(parse(&["triagebuddy", "-v"]).verbosity(), Verbosity::Verbose);
        assert_eq!(parse(&["triagebuddy", "-vv"]).verbosity(), Verbosity::VeryVerbose);
    }

    #[test]
    fn test_quiet_and_verbose_conflict() {
        assert!(parse(&["triagebuddy", "-q", "-v"]).validate().is_err());
    }

    #[test]
    fn test_port_zero_rejected() {
        assert!(parse(&["triagebuddy", "--port", "0"]).validate().is_err());
    }

    #[test]
    fn test_subcommands() {
        assert_eq!(parse(&["triagebuddy", "doctor"]).command(), Commands::Doctor);
        assert_eq!(parse(&["triagebuddy", "--kiosk", "guided"]).command(), Commands::Guided);
        assert_eq!(parse(&["triagebuddy", "protocols"]).command(), Commands::Protocols);
    }

    #[test]
    fn test_overrides() {
        let args = parse(&[
            "triagebuddy",
            "--kiosk",
            "-m",
            "llama3.1:8b",
            "--host",
            "10.0.0.2",
            "--port",
            "8080",
            "-v",
        ]);
        let mut config = Config::default();
        args.apply_overrides(&mut config);
        assert_eq!(config.ollama.model, "llama3.1:8b");
        assert_eq!(config.ollama.host, "10.0.0.2");
        assert_eq!(config.ollama.port, 8080);
        assert!(config.wizard.kiosk);
        assert_eq!(config.telemetry.default_verbosity, "verbose");
    }

    #[test]
    fn test_no_overrides_keep_config() {
        let mut config = Config::default();
        config.ollama.model = "custom".to_string();
        parse(&["triagebuddy"]).apply_overrides(&mut config);
        assert_eq!(config.ollama.model, "custom");
        assert!(!config.wizard.kiosk);
    }

    #[test]
    fn test_tracing_filter() {
        assert_eq!(Verbosity::Quiet.tracing_filter(), "error");
        assert_eq!(Verbosity::VeryVerbose.tracing_filter(), "debug");
        assert_eq!(Verbosity::from_str_opt("verbose"), Some(Verbosity::Verbose));
        assert_eq!(Verbosity::from_str_opt("loud"), None);
    }
}
