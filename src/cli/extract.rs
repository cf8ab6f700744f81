//! Extract command - load a page into a module's editor slot

use anyhow::Result;

use super::{open_store, PromptArgs, PromptPlan};
use crate::config::Config;
use crate::core::extract::extract;
use crate::core::EditorBuffer;
use crate::prompt::tokens;
use crate::ui;

pub async fn run(config: Config, source: &str, args: &PromptArgs) -> Result<()> {
    let plan = PromptPlan::from_args(&config, args).await?;
    let store = open_store(&config)?;

    ui::print_status(&format!("Extracting {}", source));
    let page = extract(source).await?;

    let mut buffer = EditorBuffer::load(&store, plan.module.slot())?;
    buffer.set(page.document())?;

    ui::print_success(&format!(
        "Stored {} characters (~{} tokens) in slot '{}'",
        buffer.content().chars().count(),
        tokens::count(buffer.content()),
        buffer.slot()
    ));
    ui::print_summary(&plan.prepare(buffer.content()), &config.general.locale);
    Ok(())
}
