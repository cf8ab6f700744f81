//! Typed errors for the prompt and settings layers.
//!
//! Everything above these layers works in `anyhow::Result`; these variants
//! exist for the failures callers may want to match on.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PromptError {
    #[error("Unknown module '{0}' (available: translation)")]
    UnknownModule(String),

    #[error("Unknown model '{0}' (available: gpt-4o, perplexity-sonar)")]
    UnknownModel(String),

    #[error("Invalid prompt value '{0}', expected KEY=VALUE")]
    InvalidValue(String),

    #[error("API key must contain at least {min} characters")]
    InvalidApiKey { min: usize },

    #[error("No API key configured for {provider}. Run `promptpad settings --provider {provider}` or set {env_var}")]
    MissingApiKey {
        provider: &'static str,
        env_var: &'static str,
    },

    #[error("Nothing extracted from {0}")]
    EmptyExtraction(String),
}
