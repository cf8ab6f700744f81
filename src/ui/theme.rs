//! promptpad theme for terminal output and interactive prompts

use console::Style;
use dialoguer::theme::Theme;
use std::fmt;

/// Design system colors
pub mod colors {
    pub const RESET: &str = "\x1b[0m";
    pub const BOLD: &str = "\x1b[1m";
    pub const PRIMARY: &str = "\x1b[38;2;100;181;246m";      // #64B5F6
    pub const SUCCESS: &str = "\x1b[38;2;165;214;167m";      // #A5D6A7
    pub const WARNING: &str = "\x1b[38;2;255;202;40m";       // #FFCA28
    pub const ERROR: &str = "\x1b[38;2;239;154;154m";        // #EF9A9A
    pub const MUTED: &str = "\x1b[38;2;84;110;122m";         // #546E7A
    pub const FG: &str = "\x1b[38;2;212;212;215m";           // #D4D4D7
}

pub mod symbols {
    pub const SUCCESS: &str = "✓";
    pub const ERROR: &str = "✗";
    pub const WARNING: &str = "⚠";
    pub const STATUS: &str = "›";
    pub const DIVIDER: &str = "─";
    pub const SPINNER: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];
}

/// Theme for dialoguer prompts
pub struct PadTheme {
    pub prompt_style: Style,
    pub hint_style: Style,
    pub success_style: Style,
    pub error_style: Style,
    pub prompt_prefix: String,
    pub success_prefix: String,
}

impl Default for PadTheme {
    fn default() -> Self {
        Self::new()
    }
}

impl PadTheme {
    pub fn new() -> Self {
        // Color256 approximations of PRIMARY, MUTED, SUCCESS and ERROR
        Self {
            prompt_style: Style::new().fg(console::Color::Color256(117)).bold(),
            hint_style: Style::new().fg(console::Color::Color256(242)),
            success_style: Style::new().fg(console::Color::Color256(114)),
            error_style: Style::new().fg(console::Color::Color256(210)),
            prompt_prefix: "› ".to_string(),
            success_prefix: "✓ ".to_string(),
        }
    }
}

impl Theme for PadTheme {
    fn format_prompt(&self, f: &mut dyn fmt::Write, prompt: &str) -> fmt::Result {
        write!(
            f,
            "{}{}",
            self.prompt_style.apply_to(&self.prompt_prefix),
            self.prompt_style.apply_to(prompt)
        )
    }

    fn format_error(&self, f: &mut dyn fmt::Write, err: &str) -> fmt::Result {
        write!(f, "{}", self.error_style.apply_to(err))
    }

    fn format_confirm_prompt(
        &self,
        f: &mut dyn fmt::Write,
        prompt: &str,
        default: Option<bool>,
    ) -> fmt::Result {
        write!(f, "{}{}", self.prompt_prefix, self.prompt_style.apply_to(prompt))?;
        match default {
            Some(true) => write!(f, " {}", self.hint_style.apply_to("[Y/n]")),
            Some(false) => write!(f, " {}", self.hint_style.apply_to("[y/N]")),
            None => write!(f, " {}", self.hint_style.apply_to("[y/n]")),
        }
    }

    fn format_confirm_prompt_selection(
        &self,
        f: &mut dyn fmt::Write,
        prompt: &str,
        selection: Option<bool>,
    ) -> fmt::Result {
        write!(f, "{}{}", self.prompt_prefix, self.prompt_style.apply_to(prompt))?;
        match selection {
            Some(true) => write!(f, " {}", self.success_style.apply_to("Yes")),
            Some(false) => write!(f, " {}", self.error_style.apply_to("No")),
            None => Ok(()),
        }
    }

    fn format_password_prompt(&self, f: &mut dyn fmt::Write, prompt: &str) -> fmt::Result {
        write!(
            f,
            "{}{} {}: ",
            self.prompt_prefix,
            self.prompt_style.apply_to(prompt),
            self.hint_style.apply_to("(hidden)")
        )
    }

    fn format_password_prompt_selection(
        &self,
        f: &mut dyn fmt::Write,
        prompt: &str,
    ) -> fmt::Result {
        write!(
            f,
            "{}{}: {}",
            self.success_style.apply_to(&self.success_prefix),
            self.prompt_style.apply_to(prompt),
            self.success_style.apply_to("********")
        )
    }
}
