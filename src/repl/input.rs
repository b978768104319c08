//! Line input for the terminal wizard using rustyline
//!
//! History is kept across sessions when a history file is configured.

use anyhow::Result;
use rustyline::error::ReadlineError;
use rustyline::history::History;
use rustyline::DefaultEditor;
use std::path::PathBuf;

/// Default prompt shown before each answer
pub const DEFAULT_PROMPT: &str = "triaje> ";

/// What the user typed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadOutcome {
    /// A (trimmed, possibly empty) line
    Line(String),
    /// Ctrl-C
    Interrupted,
    /// Ctrl-D
    Eof,
}

/// Input handler wrapping the readline editor
pub struct InputHandler {
    editor: DefaultEditor,
    history_path: Option<PathBuf>,
    prompt: String,
}

impl InputHandler {
    pub fn new() -> Result<Self> {
        Ok(InputHandler {
            editor: DefaultEditor::new()?,
            history_path: None,
            prompt: DEFAULT_PROMPT.to_string(),
        })
    }

    /// Create input handler with persistent history
    pub fn with_history(history_file: PathBuf) -> Result<Self> {
        let mut editor = DefaultEditor::new()?;

        if history_file.exists() {
            let _ = editor.load_history(&history_file);
        }

        Ok(InputHandler {
            editor,
            history_path: Some(history_file),
            prompt: DEFAULT_PROMPT.to_string(),
        })
    }

    pub fn set_prompt(&mut self, prompt: String) {
        self.prompt = prompt;
    }

    /// Read one line; empty lines are returned as `Line("")`
    pub fn read_line(&mut self) -> Result<ReadOutcome> {
        match self.editor.readline(&self.prompt) {
            Ok(line) => {
                let trimmed = line.trim();
                if !trimmed.is_empty() {
                    let _ = self.editor.add_history_entry(trimmed);
                }
                Ok(ReadOutcome::Line(trimmed.to_string()))
            }
            Err(ReadlineError::Interrupted) => Ok(ReadOutcome::Interrupted),
            Err(ReadlineError::Eof) => Ok(ReadOutcome::Eof),
            Err(err) => Err(anyhow::anyhow!("Readline error: {}", err)),
        }
    }

    /// Save history to disk, creating the state directory if needed
    pub fn save_history(&mut self) -> Result<()> {
        if let Some(ref path) = self.history_path {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            self.editor.save_history(path)?;
        }
        Ok(())
    }

    pub fn history_len(&self) -> usize {
        self.editor.history().len()
    }
}
