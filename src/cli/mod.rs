//! CLI command implementations

pub mod extract;
pub mod info;
pub mod models;
pub mod prompt;
pub mod send;
pub mod settings;
pub mod share;
pub mod show;
pub mod slots;
pub mod watch;

use anyhow::{Context, Result};
use clap::Args;
use std::collections::HashMap;
use std::path::PathBuf;

use crate::ai::{Backend, ModelName, OpenAiCompatClient};
use crate::config::Config;
use crate::core::Store;
use crate::errors::PromptError;
use crate::prompt::{module, parse_values, Module, Prompt};

/// Options shared by every command that prepares a prompt
#[derive(Args, Debug, Clone)]
pub struct PromptArgs {
    /// Use-case module
    #[arg(short, long, default_value = "translation")]
    pub module: String,

    /// Model to estimate for and send to (gpt-4o, perplexity-sonar)
    #[arg(long)]
    pub model: Option<String>,

    /// Prompt value, e.g. TARGET_LANGUAGE=German (repeatable)
    #[arg(short, long = "set", value_name = "KEY=VALUE")]
    pub set: Vec<String>,

    /// Template file replacing the module template
    #[arg(short, long, value_name = "FILE")]
    pub template: Option<PathBuf>,
}

/// Everything a recompute needs besides the editor content
#[derive(Debug, Clone)]
pub struct PromptPlan {
    pub module: &'static Module,
    pub model: ModelName,
    pub template: Option<String>,
    pub overrides: HashMap<String, String>,
    pub output_scale: Option<f64>,
}

impl PromptPlan {
    pub async fn from_args(config: &Config, args: &PromptArgs) -> Result<Self> {
        let module = module(&args.module)?;
        let model = resolve_model(config, module, args.model.as_deref())?;

        let template = match &args.template {
            Some(path) => Some(
                tokio::fs::read_to_string(path)
                    .await
                    .with_context(|| format!("Failed to read template {:?}", path))?,
            ),
            None => None,
        };

        // Config values first, command line wins
        let mut overrides: HashMap<String, String> = config
            .prompt
            .values
            .iter()
            .map(|(k, v)| (k.to_ascii_uppercase(), v.clone()))
            .collect();
        overrides.extend(parse_values(&args.set)?);

        Ok(Self {
            module,
            model,
            template,
            overrides,
            output_scale: config.prompt.output_token_scale_factor,
        })
    }

    pub fn prepare(&self, editor_content: &str) -> Prompt {
        self.module.prepare(
            self.template.as_deref(),
            editor_content,
            &self.overrides,
            self.model,
            self.output_scale,
        )
    }

    /// Template file contents, else the module's own template
    pub fn template_text(&self) -> &str {
        self.template.as_deref().unwrap_or(self.module.default_template)
    }

    /// Placeholders the rendered prompt leaves for the model
    pub fn unresolved(&self, editor_content: &str) -> Vec<String> {
        crate::prompt::template::unresolved(
            self.template_text(),
            &self.module.values(editor_content, &self.overrides),
        )
    }
}

pub fn open_store(config: &Config) -> Result<Store> {
    Store::open(&config.database_path()?)
}

/// Command line model, then the configured default, then the module's own
pub fn resolve_model(
    config: &Config,
    module: &Module,
    requested: Option<&str>,
) -> Result<ModelName, PromptError> {
    match requested {
        Some(name) => name.parse(),
        None => Ok(config.ai.default_model.unwrap_or(module.default_model)),
    }
}

/// Environment variable first, then the stored preference
pub fn resolve_api_key(config: &Config, store: &Store, backend: Backend) -> Result<String> {
    let env_var = &config.provider(backend).api_key_env;
    if let Ok(key) = std::env::var(env_var) {
        if !key.trim().is_empty() {
            tracing::debug!("Using {} API key from ${}", backend, env_var);
            return Ok(key.trim().to_string());
        }
    }

    match store.pref::<String>(backend.api_key_pref()).get()? {
        Some(key) if !key.is_empty() => Ok(key),
        _ => Err(PromptError::MissingApiKey {
            provider: backend.name(),
            env_var: backend.default_api_key_env(),
        }
        .into()),
    }
}

pub fn build_client(config: &Config, model: ModelName, api_key: String) -> Result<OpenAiCompatClient> {
    let provider = config.provider(model.backend());
    let mut client = OpenAiCompatClient::for_model(model, api_key)?
        .with_max_tokens(provider.max_tokens)
        .with_temperature(provider.temperature);
    if let Some(endpoint) = &provider.endpoint {
        client = client.with_url(endpoint);
    }
    tracing::debug!("Using model {} on {}", client.model(), model.backend());
    Ok(client)
}

/// File the watch command mirrors a slot into
pub fn slot_export_path(config: &Config, slot: &str) -> Result<PathBuf> {
    Ok(config.data_dir()?.join("slots").join(format!("{}.md", slot)))
}

/// `sk-abcdef` becomes `sk…ef`
pub fn mask_key(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    if chars.len() <= 4 {
        return "*".repeat(chars.len());
    }
    let head: String = chars[..2].iter().collect();
    let tail: String = chars[chars.len() - 2..].iter().collect();
    format!("{}…{}", head, tail)
}
