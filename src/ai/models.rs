//! Supported models with their backends and prices

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::errors::PromptError;

/// Remote API a model is served from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    OpenAi,
    Perplexity,
}

impl Backend {
    pub fn name(&self) -> &'static str {
        match self {
            Backend::OpenAi => "openai",
            Backend::Perplexity => "perplexity",
        }
    }

    /// Preference key the API key is stored under
    pub fn api_key_pref(&self) -> &'static str {
        match self {
            Backend::OpenAi => crate::core::store::OPEN_AI_API_KEY_NAME,
            Backend::Perplexity => crate::core::store::PERPLEXITY_API_KEY_NAME,
        }
    }

    pub fn default_api_key_env(&self) -> &'static str {
        match self {
            Backend::OpenAi => "OPENAI_API_KEY",
            Backend::Perplexity => "PERPLEXITY_API_KEY",
        }
    }
}

impl FromStr for Backend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "openai" => Ok(Backend::OpenAi),
            "perplexity" => Ok(Backend::Perplexity),
            other => anyhow::bail!("Unknown provider '{}' (available: openai, perplexity)", other),
        }
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Models selectable for a prompt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ModelName {
    #[serde(rename = "gpt-4o")]
    Gpt4o,
    #[serde(rename = "perplexity-sonar")]
    PerplexitySonar,
}

impl ModelName {
    pub const ALL: [ModelName; 2] = [ModelName::Gpt4o, ModelName::PerplexitySonar];

    pub fn as_str(&self) -> &'static str {
        match self {
            ModelName::Gpt4o => "gpt-4o",
            ModelName::PerplexitySonar => "perplexity-sonar",
        }
    }

    /// Human readable label
    pub fn label(&self) -> &'static str {
        match self {
            ModelName::Gpt4o => "OpenAI GPT-4o",
            ModelName::PerplexitySonar => "Perplexity Sonar",
        }
    }

    pub fn backend(&self) -> Backend {
        match self {
            ModelName::Gpt4o => Backend::OpenAi,
            ModelName::PerplexitySonar => Backend::Perplexity,
        }
    }

    /// Model id sent on the wire
    pub fn api_model(&self) -> &'static str {
        match self {
            ModelName::Gpt4o => "gpt-4o",
            ModelName::PerplexitySonar => "sonar",
        }
    }

    pub fn context_window(&self) -> usize {
        match self {
            ModelName::Gpt4o => 128_000,
            ModelName::PerplexitySonar => 127_072,
        }
    }

    /// USD per million input tokens
    pub fn input_price(&self) -> f64 {
        match self {
            ModelName::Gpt4o => 2.50,
            ModelName::PerplexitySonar => 1.00,
        }
    }

    /// USD per million output tokens
    pub fn output_price(&self) -> f64 {
        match self {
            ModelName::Gpt4o => 10.00,
            ModelName::PerplexitySonar => 1.00,
        }
    }
}

impl FromStr for ModelName {
    type Err = PromptError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ModelName::ALL
            .into_iter()
            .find(|m| m.as_str().eq_ignore_ascii_case(s) || m.api_model().eq_ignore_ascii_case(s))
            .ok_or_else(|| PromptError::UnknownModel(s.to_string()))
    }
}

impl fmt::Display for ModelName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
