//! Slots command - list or delete stored editor slots

use anyhow::Result;

use super::open_store;
use crate::config::Config;
use crate::ui;

pub fn run(config: &Config, delete: Option<&str>) -> Result<()> {
    let store = open_store(config)?;

    if let Some(name) = delete {
        if store.delete_slot(name)? {
            ui::print_success(&format!("Deleted slot '{}'", name));
        } else {
            ui::print_warning(&format!("No slot named '{}'", name));
        }
        return Ok(());
    }

    let slots = store.slots()?;
    if slots.is_empty() {
        ui::print_status("No slots stored yet");
        return Ok(());
    }

    ui::print_header("Slots");
    for slot in slots {
        let updated = slot
            .updated_at
            .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|| "-".to_string());
        println!("  {:<20} {:>10} bytes  {}", slot.name, slot.bytes, updated);
    }
    Ok(())
}
