//! Prompt preparation: interpolation, estimation and debounced recompute

pub mod debounce;
pub mod module;
pub mod prepared;
pub mod template;
pub mod templates;
pub mod tokens;

pub use debounce::Debouncer;
pub use module::{module, parse_values, Module};
pub use prepared::Prompt;
