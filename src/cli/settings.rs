//! Settings command - read or store provider API keys

use anyhow::Result;

use super::{mask_key, open_store};
use crate::ai::Backend;
use crate::config::Config;
use crate::core::Store;
use crate::errors::PromptError;
use crate::ui::{self, FormOption, PadForm};

/// Shortest accepted API key
pub const MIN_API_KEY_LEN: usize = 2;

pub fn run(config: Config, provider: Option<&str>, key: Option<String>, show: bool) -> Result<()> {
    let store = open_store(&config)?;

    if show {
        let backends = match provider {
            Some(name) => vec![name.parse::<Backend>()?],
            None => vec![Backend::OpenAi, Backend::Perplexity],
        };
        ui::print_header("API keys");
        for backend in backends {
            println!("  {:<12} {}", backend.name(), key_status(&config, &store, backend)?);
        }
        return Ok(());
    }

    let form = PadForm::new();
    let backend = match provider {
        Some(name) => name.parse::<Backend>()?,
        None if key.is_some() => Backend::OpenAi,
        None => choose_backend(&form)?,
    };

    let key = match key {
        Some(key) => validate_api_key(&key)?.to_string(),
        None => {
            let stored = store.pref::<String>(backend.api_key_pref()).get()?;
            if stored.is_some() {
                let replace = form.confirm("Replace the stored key?", false)?;
                if replace != Some(true) {
                    ui::print_status("Kept the stored key");
                    return Ok(());
                }
            }
            let prompt = format!("{} API key", backend.name());
            validate_api_key(&form.password(&prompt)?)?.to_string()
        }
    };

    store.pref::<String>(backend.api_key_pref()).set(&key)?;
    tracing::debug!("Stored API key under '{}'", backend.api_key_pref());
    ui::print_success(&format!("Saved {} API key ({})", backend.name(), mask_key(&key)));
    Ok(())
}

/// Trimmed key, rejected when shorter than [`MIN_API_KEY_LEN`]
pub fn validate_api_key(key: &str) -> Result<&str, PromptError> {
    let key = key.trim();
    if key.chars().count() < MIN_API_KEY_LEN {
        return Err(PromptError::InvalidApiKey {
            min: MIN_API_KEY_LEN,
        });
    }
    Ok(key)
}

fn choose_backend(form: &PadForm) -> Result<Backend> {
    let options = vec![
        FormOption::new("openai", "GPT-4o").recommended(),
        FormOption::new("perplexity", "Sonar"),
    ];
    match form.select("Which provider is this key for?", &options)? {
        Some(1) => Ok(Backend::Perplexity),
        Some(_) => Ok(Backend::OpenAi),
        None => anyhow::bail!("Selection cancelled"),
    }
}

fn key_status(config: &Config, store: &Store, backend: Backend) -> Result<String> {
    let env_var = &config.provider(backend).api_key_env;
    if std::env::var(env_var).is_ok_and(|v| !v.trim().is_empty()) {
        return Ok(format!("from ${}", env_var));
    }
    Ok(match store.pref::<String>(backend.api_key_pref()).get()? {
        Some(key) => format!("stored ({})", mask_key(&key)),
        None => "not set".to_string(),
    })
}
