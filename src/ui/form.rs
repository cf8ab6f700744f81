//! Interactive prompts used by the settings command

use anyhow::Result;
use console::Term;
use dialoguer::{Confirm, Password, Select};

use super::theme::{colors, PadTheme};

/// A single option in a selection
#[derive(Debug, Clone)]
pub struct FormOption {
    pub label: String,
    pub description: String,
    pub recommended: bool,
}

impl FormOption {
    pub fn new(label: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            description: description.into(),
            recommended: false,
        }
    }

    pub fn recommended(mut self) -> Self {
        self.recommended = true;
        self
    }

    fn display(&self) -> String {
        if self.recommended {
            format!("{} (Recommended)", self.label)
        } else {
            self.label.clone()
        }
    }
}

pub struct PadForm {
    theme: PadTheme,
}

impl Default for PadForm {
    fn default() -> Self {
        Self::new()
    }
}

impl PadForm {
    pub fn new() -> Self {
        Self {
            theme: PadTheme::new(),
        }
    }

    /// Single-select question, `None` when cancelled
    pub fn select(&self, question: &str, options: &[FormOption]) -> Result<Option<usize>> {
        println!();
        println!(
            "{}{}{}{}",
            colors::PRIMARY, colors::BOLD, question, colors::RESET
        );
        for opt in options {
            println!(
                "{}  {}{}{} {}{}",
                colors::MUTED,
                colors::FG,
                opt.label,
                colors::MUTED,
                opt.description,
                colors::RESET
            );
        }

        let items: Vec<String> = options.iter().map(|o| o.display()).collect();
        let default = options.iter().position(|o| o.recommended).unwrap_or(0);

        let selection = Select::with_theme(&self.theme)
            .items(&items)
            .default(default)
            .interact_on_opt(&Term::stderr())?;
        Ok(selection)
    }

    /// Yes/no confirmation, `None` when cancelled
    pub fn confirm(&self, question: &str, default: bool) -> Result<Option<bool>> {
        let result = Confirm::with_theme(&self.theme)
            .with_prompt(question)
            .default(default)
            .interact_on_opt(&Term::stderr())?;
        Ok(result)
    }

    /// Hidden input
    pub fn password(&self, question: &str) -> Result<String> {
        let secret = Password::with_theme(&self.theme)
            .with_prompt(question)
            .interact_on(&Term::stderr())?;
        Ok(secret)
    }
}
