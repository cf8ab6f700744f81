//! Styled terminal output

use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

use super::theme::{colors, symbols};
use crate::prompt::Prompt;

pub fn print_header(title: &str) {
    println!();
    println!("{}{}  {}{}", colors::PRIMARY, colors::BOLD, title, colors::RESET);
    print_divider();
}

pub fn print_divider() {
    println!(
        "{}{}{}",
        colors::MUTED,
        symbols::DIVIDER.repeat(55),
        colors::RESET
    );
}

pub fn print_status(message: &str) {
    println!(
        "{}  {} {}{}",
        colors::MUTED, symbols::STATUS, message, colors::RESET
    );
}

pub fn print_success(message: &str) {
    println!(
        "{}  {} {}{}",
        colors::SUCCESS, symbols::SUCCESS, message, colors::RESET
    );
}

pub fn print_warning(message: &str) {
    println!(
        "{}  {} {}{}",
        colors::WARNING, symbols::WARNING, message, colors::RESET
    );
}

pub fn print_error(message: &str) {
    eprintln!(
        "{}  {} Error: {}{}",
        colors::ERROR, symbols::ERROR, message, colors::RESET
    );
}

/// Token and price line for a prepared prompt
pub fn print_summary(prompt: &Prompt, locale: &str) {
    println!(
        "{}  {} {}{}{}",
        colors::MUTED,
        prompt.model.label(),
        colors::FG,
        prompt.summary(locale),
        colors::RESET
    );
    if prompt.exceeds_context() {
        print_warning(&format!(
            "Estimated {} tokens exceed the {} token context of {}",
            prompt.total_tokens(),
            prompt.model.context_window(),
            prompt.model
        ));
    }
}

/// Spinner shown until the first streamed chunk arrives
pub fn waiting_spinner(message: &str) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .tick_strings(symbols::SPINNER)
            .template("  {spinner} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner.set_message(message.to_string());
    spinner.enable_steady_tick(Duration::from_millis(80));
    spinner
}
