//! Show command - print an editor slot

use anyhow::Result;

use super::open_store;
use crate::config::Config;
use crate::core::EditorBuffer;
use crate::prompt::module;
use crate::ui;

pub fn run(config: Config, module_name: &str) -> Result<()> {
    let module = module(module_name)?;
    let store = open_store(&config)?;
    let buffer = EditorBuffer::load(&store, module.slot())?;

    if buffer.content().is_empty() {
        ui::print_status(&format!(
            "Slot '{}' is empty. Run `promptpad extract <source>` first.",
            buffer.slot()
        ));
    } else {
        println!("{}", buffer.content());
    }
    Ok(())
}
