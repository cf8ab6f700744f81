//! Prompt command - render the prepared prompt with its estimates

use anyhow::Result;

use super::{open_store, PromptArgs, PromptPlan};
use crate::config::Config;
use crate::core::EditorBuffer;
use crate::ui;

pub async fn run(config: Config, args: &PromptArgs, json: bool) -> Result<()> {
    let plan = PromptPlan::from_args(&config, args).await?;
    let store = open_store(&config)?;
    let buffer = EditorBuffer::load(&store, plan.module.slot())?;

    let prompt = plan.prepare(buffer.content());
    tracing::debug!(
        "Prepared {} prompt: {} input tokens",
        plan.module.name,
        prompt.estimated_input_tokens
    );

    if json {
        println!("{}", serde_json::to_string_pretty(&prompt)?);
        return Ok(());
    }

    if buffer.content().is_empty() {
        ui::print_warning(&format!("Slot '{}' is empty", buffer.slot()));
    }

    ui::print_header(&format!("{} prompt", plan.module.name));
    println!("{}", prompt.text);
    ui::print_divider();

    for name in plan.unresolved(buffer.content()) {
        ui::print_status(&format!("{{{{{}}}}} is left for the model", name));
    }
    ui::print_summary(&prompt, &config.general.locale);
    Ok(())
}
