//! Info command - show system information

use anyhow::Result;

use super::open_store;
use crate::ai::Backend;
use crate::config::{config_path, Config};

pub fn run(config: &Config) -> Result<()> {
    println!("promptpad v{}", env!("CARGO_PKG_VERSION"));
    println!();
    println!("System Information:");
    println!("  OS: {} {}", std::env::consts::OS, std::env::consts::ARCH);

    println!();
    println!("Configuration:");
    println!("  Config file: {}", display(config_path()));
    println!("  Database: {}", display(config.database_path()));
    println!("  Locale: {}", config.general.locale);

    println!();
    println!("AI Providers:");
    let store = open_store(config)?;
    for backend in [Backend::OpenAi, Backend::Perplexity] {
        check_provider(config, &store, backend)?;
    }

    Ok(())
}

fn display(path: Result<std::path::PathBuf>) -> String {
    path.map(|p| p.to_string_lossy().to_string())
        .unwrap_or_else(|_| "unknown".to_string())
}

fn check_provider(config: &Config, store: &crate::core::Store, backend: Backend) -> Result<()> {
    let env_var = &config.provider(backend).api_key_env;
    let status = if std::env::var(env_var).is_ok() {
        "configured (environment)"
    } else if store.pref::<String>(backend.api_key_pref()).get()?.is_some() {
        "configured (stored)"
    } else {
        "not configured"
    };
    println!("  {}: {}", backend.name(), status);
    Ok(())
}
