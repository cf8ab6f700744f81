//! Share command - export the prepared prompt as a JSON document

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::{Path, PathBuf};
use uuid::Uuid;

use super::{open_store, PromptArgs, PromptPlan};
use crate::config::Config;
use crate::core::EditorBuffer;
use crate::prompt::Prompt;
use crate::ui;

#[derive(Debug, Serialize)]
struct SharedPrompt<'a> {
    id: Uuid,
    module: &'a str,
    created_at: DateTime<Utc>,
    #[serde(flatten)]
    prompt: &'a Prompt,
}

pub async fn run(config: Config, args: &PromptArgs) -> Result<()> {
    let plan = PromptPlan::from_args(&config, args).await?;
    let store = open_store(&config)?;
    let buffer = EditorBuffer::load(&store, plan.module.slot())?;
    let prompt = plan.prepare(buffer.content());

    let path = write_shared(&config.data_dir()?.join("shared"), plan.module.name, &prompt)?;
    tracing::info!("Shared prompt written to {:?}", path);
    ui::print_success(&format!("Shared prompt saved to {}", path.display()));
    Ok(())
}

fn write_shared(dir: &Path, module: &str, prompt: &Prompt) -> Result<PathBuf> {
    std::fs::create_dir_all(dir).with_context(|| format!("Failed to create {:?}", dir))?;

    let shared = SharedPrompt {
        id: Uuid::new_v4(),
        module,
        created_at: Utc::now(),
        prompt,
    };
    let path = dir.join(format!("{}.json", shared.id));
    let json = serde_json::to_string_pretty(&shared).context("Failed to serialize prompt")?;
    std::fs::write(&path, json).with_context(|| format!("Failed to write {:?}", path))?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::ModelName;
    use crate::prompt::prepared::generate_prompt;
    use std::collections::HashMap;

    #[test]
    fn test_write_shared_document() {
        let dir = tempfile::tempdir().unwrap();
        let values = HashMap::from([("CONTENT".to_string(), "Hallo".to_string())]);
        let prompt = generate_prompt("Translate: {{CONTENT}}", &values, ModelName::Gpt4o, 1.0);

        let path = write_shared(&dir.path().join("shared"), "translation", &prompt).unwrap();
        let json: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();

        assert_eq!(json["module"], "translation");
        assert_eq!(json["text"], "Translate: Hallo");
        assert_eq!(json["model"], "gpt-4o");
        assert!(json.get("encoded").is_none());
        assert_eq!(
            path.file_stem().unwrap().to_str().unwrap(),
            json["id"].as_str().unwrap()
        );
    }
}
