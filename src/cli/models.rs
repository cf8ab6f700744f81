//! Models command - list supported models and their pricing

use anyhow::Result;

use crate::ai::ModelName;
use crate::config::Config;
use crate::prompt::module::MODULES;
use crate::ui;

pub fn run(config: &Config) -> Result<()> {
    ui::print_header("Models");
    println!(
        "  {:<18} {:<12} {:>9} {:>12} {:>12}",
        "NAME", "BACKEND", "CONTEXT", "IN $/1M", "OUT $/1M"
    );
    for model in ModelName::ALL {
        println!(
            "  {:<18} {:<12} {:>9} {:>12.2} {:>12.2}",
            model.as_str(),
            model.backend().name(),
            model.context_window(),
            model.input_price(),
            model.output_price()
        );
    }

    println!();
    for module in MODULES {
        let model = config.ai.default_model.unwrap_or(module.default_model);
        println!("  {} uses {} by default", module.name, model);
    }
    Ok(())
}
