//! Line-editing prompts for interactive commands.

use crate::error::{CliError, Result};
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;

/// Interactive prompt backed by a line editor.
pub struct Prompt {
    editor: DefaultEditor,
}

impl Prompt {
    /// Open a prompt on the terminal.
    pub fn new() -> Result<Self> {
        let editor = DefaultEditor::new()
            .map_err(|e| CliError::Prompt(format!("Failed to initialize editor: {}", e)))?;
        Ok(Self { editor })
    }

    /// Ask for a value; Ctrl-C or Ctrl-D aborts the command.
    pub fn ask(&mut self, label: &str) -> Result<String> {
        match self.editor.readline(&format!("{}: ", label)) {
            Ok(line) => Ok(line.trim().to_string()),
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => {
                Err(CliError::Prompt("Aborted".to_string()))
            }
            Err(err) => Err(CliError::Prompt(err.to_string())),
        }
    }

    /// Ask for a value that may be left blank.
    pub fn ask_optional(&mut self, label: &str) -> Result<Option<String>> {
        let answer = self.ask(label)?;
        Ok(if answer.is_empty() { None } else { Some(answer) })
    }

    /// Ask for a required value, repeating until one is given.
    pub fn ask_required(&mut self, label: &str) -> Result<String> {
        loop {
            let answer = self.ask(label)?;
            if !answer.is_empty() {
                return Ok(answer);
            }
        }
    }

    /// Ask a yes/no question; anything but `y`/`yes` is no.
    pub fn confirm(&mut self, label: &str) -> Result<bool> {
        let answer = self.ask(&format!("{} [y/N]", label))?;
        Ok(parse_yes(&answer))
    }
}

fn parse_yes(answer: &str) -> bool {
    matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_yes() {
        assert!(parse_yes("y"));
        assert!(parse_yes(" YES "));
        assert!(!parse_yes(""));
        assert!(!parse_yes("n"));
        assert!(!parse_yes("maybe"));
    }
}
