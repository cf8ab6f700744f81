//! Send command - stream the model's response into the editor slot

use anyhow::Result;
use std::cell::RefCell;
use std::io::Write;

use super::{build_client, open_store, resolve_api_key, PromptArgs, PromptPlan};
use crate::ai::send_prompt;
use crate::config::Config;
use crate::core::{EditorBuffer, StreamRelay};
use crate::ui;

pub async fn run(config: Config, args: &PromptArgs, print_only: bool) -> Result<()> {
    let plan = PromptPlan::from_args(&config, args).await?;
    let store = open_store(&config)?;
    let mut buffer = EditorBuffer::load(&store, plan.module.slot())?;

    if buffer.content().trim().is_empty() {
        anyhow::bail!(
            "Slot '{}' is empty. Run `promptpad extract <source>` first.",
            buffer.slot()
        );
    }

    let prompt = plan.prepare(buffer.content());
    ui::print_summary(&prompt, &config.general.locale);

    let api_key = resolve_api_key(&config, &store, plan.model.backend())?;
    let client = build_client(&config, plan.model, api_key)?;

    let slot = buffer.slot().to_string();
    let relay = RefCell::new((!print_only).then(|| StreamRelay::new(&mut buffer)));
    let spinner = ui::waiting_spinner(&format!("Waiting for {}...", plan.model.label()));
    let printed = RefCell::new(0usize);

    let print = |text: &str| {
        if text.is_empty() {
            return;
        }
        spinner.finish_and_clear();
        print!("{}", text);
        let _ = std::io::stdout().flush();
        *printed.borrow_mut() += text.len();
    };

    let result = send_prompt(
        &client,
        &prompt.text,
        |chunk| {
            tracing::trace!("chunk: {} bytes", chunk.len());
            print(chunk);
            if let Some(relay) = relay.borrow_mut().as_mut() {
                relay.on_chunk(chunk);
            }
        },
        |done| {
            print(done);
            if let Some(relay) = relay.borrow_mut().as_mut() {
                relay.on_done(done);
            }
        },
    )
    .await;

    spinner.finish_and_clear();
    if *printed.borrow() > 0 {
        println!();
    }

    let response = match result {
        Ok(response) => response,
        Err(e) => {
            tracing::error!("Streaming from {} failed: {:#}", plan.model, e);
            return Err(e);
        }
    };

    if let Some(relay) = relay.into_inner() {
        relay.finish()?;
        ui::print_success(&format!(
            "Appended {} characters to slot '{}'",
            response.chars().count(),
            slot
        ));
    }
    Ok(())
}
