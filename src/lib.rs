//! TriageBuddy - Guided Emergency Triage
//!
//! A terminal wizard that walks a patient or clinician through six
//! structured steps (main symptom, onset, evolution, red flags, vital
//! signs, risk factors), compiles the answers into a triage payload and
//! asks a local Ollama model for a severity assessment.
//!
//! # Architecture
//!
//! - **wizard**: form data, step state machine, payload compilation
//! - **assess**: `Assessor` trait and the Ollama-backed implementation
//! - **repl**: terminal front end (input parsing, rendering, spinner)
//! - **cli**: arguments and TOML configuration

pub mod errors;
pub mod wizard;
pub mod assess;

// Re-export commonly used types
pub use errors::{Result, TriageError};

pub mod cli;
pub mod doctor;
pub mod repl;
pub mod telemetry;
