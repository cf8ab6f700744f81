//! Terminal UI for promptpad
//!
//! Styled status output, the waiting spinner and interactive prompts.

pub mod form;
pub mod output;
pub mod theme;

pub use form::{FormOption, PadForm};
pub use output::{
    print_divider, print_error, print_header, print_status, print_success, print_summary,
    print_warning, waiting_spinner,
};
