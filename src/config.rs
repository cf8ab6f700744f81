//! Configuration management for promptpad

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

use crate::ai::models::{Backend, ModelName};
use crate::prompt::debounce::{DEFAULT_MAX_WAIT, DEFAULT_WAIT};
use crate::prompt::prepared::MAX_OUTPUT_SCALE;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub general: GeneralConfig,
    pub ai: AiConfig,
    pub prompt: PromptConfig,
    pub storage: StorageConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Controls number formatting in summaries
    pub locale: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AiConfig {
    /// Overrides the module's default model
    pub default_model: Option<ModelName>,
    pub providers: AiProviders,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AiProviders {
    pub openai: ProviderConfig,
    pub perplexity: ProviderConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    pub api_key_env: String,
    pub endpoint: Option<String>,
    pub max_tokens: Option<u32>,
    pub temperature: Option<f32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PromptConfig {
    pub debounce_ms: u64,
    pub max_wait_ms: u64,
    /// Overrides the module's output token scale factor
    pub output_token_scale_factor: Option<f64>,
    /// Extra placeholder values applied to every prompt
    pub values: HashMap<String, String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Database path, defaults to the data directory
    pub database: Option<PathBuf>,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            locale: "en".to_string(),
        }
    }
}

impl Default for AiProviders {
    fn default() -> Self {
        Self {
            openai: ProviderConfig {
                api_key_env: Backend::OpenAi.default_api_key_env().to_string(),
                endpoint: None,
                max_tokens: Some(4096),
                temperature: Some(0.3),
            },
            perplexity: ProviderConfig {
                api_key_env: Backend::Perplexity.default_api_key_env().to_string(),
                endpoint: None,
                max_tokens: Some(4096),
                temperature: Some(0.3),
            },
        }
    }
}

impl Default for PromptConfig {
    fn default() -> Self {
        Self {
            debounce_ms: DEFAULT_WAIT.as_millis() as u64,
            max_wait_ms: DEFAULT_MAX_WAIT.as_millis() as u64,
            output_token_scale_factor: None,
            values: HashMap::new(),
        }
    }
}

impl Config {
    /// Reject values that would make estimates meaningless
    pub fn validate(&self) -> Result<()> {
        if let Some(scale) = self.prompt.output_token_scale_factor {
            if !scale.is_finite() || scale < 0.0 || scale > MAX_OUTPUT_SCALE {
                anyhow::bail!(
                    "prompt.output_token_scale_factor must be between 0 and {}, got {}",
                    MAX_OUTPUT_SCALE,
                    scale
                );
            }
        }
        Ok(())
    }

    pub fn provider(&self, backend: Backend) -> &ProviderConfig {
        match backend {
            Backend::OpenAi => &self.ai.providers.openai,
            Backend::Perplexity => &self.ai.providers.perplexity,
        }
    }

    pub fn database_path(&self) -> Result<PathBuf> {
        match &self.storage.database {
            Some(path) => Ok(path.clone()),
            None => Ok(data_dir()?.join("promptpad.db")),
        }
    }

    /// Directory holding exported slots and shared prompts
    pub fn data_dir(&self) -> Result<PathBuf> {
        match &self.storage.database {
            Some(path) => Ok(path
                .parent()
                .map(|p| p.to_path_buf())
                .unwrap_or_else(|| PathBuf::from("."))),
            None => data_dir(),
        }
    }
}

fn project_dirs() -> Result<directories::ProjectDirs> {
    directories::ProjectDirs::from("com", "promptpad", "promptpad")
        .context("Failed to determine config directory")
}

/// Get the configuration file path
pub fn config_path() -> Result<PathBuf> {
    Ok(project_dirs()?.config_dir().join("config.toml"))
}

fn data_dir() -> Result<PathBuf> {
    Ok(project_dirs()?.data_dir().to_path_buf())
}

/// Load configuration from file or use defaults
pub fn load_config(custom_path: Option<&str>) -> Result<Config> {
    let path = if let Some(p) = custom_path {
        PathBuf::from(p)
    } else {
        config_path()?
    };

    if path.exists() {
        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config from {:?}", path))?;
        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config from {:?}", path))?;
        config
            .validate()
            .with_context(|| format!("Invalid config in {:?}", path))?;
        tracing::debug!("Loaded config from {:?}", path);
        Ok(config)
    } else {
        Ok(Config::default())
    }
}

/// Initialize configuration file with defaults
pub fn init_config(custom_path: Option<&str>) -> Result<()> {
    let path = match custom_path {
        Some(p) => PathBuf::from(p),
        None => config_path()?,
    };

    if path.exists() {
        println!("Configuration file already exists at {:?}", path);
        return Ok(());
    }

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create config directory {:?}", parent))?;
    }

    let content = toml::to_string_pretty(&Config::default())
        .context("Failed to serialize default config")?;

    std::fs::write(&path, content)
        .with_context(|| format!("Failed to write config to {:?}", path))?;

    println!("Configuration initialized at {:?}", path);
    Ok(())
}

/// Show current configuration
pub fn show_config(config: &Config) -> Result<()> {
    let content = toml::to_string_pretty(config).context("Failed to serialize config")?;
    println!("{}", content);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_roundtrips_through_toml() {
        let text = toml::to_string_pretty(&Config::default()).unwrap();
        let parsed: Config = toml::from_str(&text).unwrap();
        assert_eq!(parsed.prompt.debounce_ms, 250);
        assert_eq!(parsed.prompt.max_wait_ms, 500);
        assert_eq!(parsed.ai.providers.openai.api_key_env, "OPENAI_API_KEY");
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let parsed: Config = toml::from_str(
            r#"
            [general]
            locale = "de"

            [ai]
            default_model = "perplexity-sonar"

            [prompt.values]
            TARGET_LANGUAGE = "German"
            "#,
        )
        .unwrap();

        assert_eq!(parsed.general.locale, "de");
        assert_eq!(parsed.ai.default_model, Some(ModelName::PerplexitySonar));
        assert_eq!(parsed.prompt.values["TARGET_LANGUAGE"], "German");
        assert_eq!(parsed.prompt.debounce_ms, 250);
        assert_eq!(
            parsed.provider(Backend::Perplexity).api_key_env,
            "PERPLEXITY_API_KEY"
        );
    }

    #[test]
    fn test_verbose_key_is_ignored() {
        // Logging level comes from --verbose only
        let parsed: Config = toml::from_str("verbose = true\n\n[general]\nlocale = \"fr\"\n").unwrap();
        assert_eq!(parsed.general.locale, "fr");
        let text = toml::to_string_pretty(&parsed).unwrap();
        assert!(!text.contains("verbose"));
    }

    #[test]
    fn test_custom_database_path() {
        let mut config = Config::default();
        config.storage.database = Some(PathBuf::from("/tmp/pp/store.db"));
        assert_eq!(config.database_path().unwrap(), PathBuf::from("/tmp/pp/store.db"));
        assert_eq!(config.data_dir().unwrap(), PathBuf::from("/tmp/pp"));
    }

    #[test]
    fn test_load_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.toml");
        let config = load_config(path.to_str()).unwrap();
        assert_eq!(config.general.locale, "en");
    }

    #[test]
    fn test_rejects_unbounded_scale_factor() {
        let dir = tempfile::tempdir().unwrap();
        for value in ["inf", "1e30", "-1.0", "nan"] {
            let path = dir.path().join("config.toml");
            std::fs::write(
                &path,
                format!("[prompt]\noutput_token_scale_factor = {}\n", value),
            )
            .unwrap();
            let err = load_config(path.to_str()).unwrap_err();
            assert!(format!("{:#}", err).contains("output_token_scale_factor"), "{}", value);
        }

        let path = dir.path().join("ok.toml");
        std::fs::write(&path, "[prompt]\noutput_token_scale_factor = 1.5\n").unwrap();
        let config = load_config(path.to_str()).unwrap();
        assert_eq!(config.prompt.output_token_scale_factor, Some(1.5));
    }
}
