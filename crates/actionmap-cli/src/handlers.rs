//! Command handlers for CLI subcommands
//!
//! This module contains the implementation logic for each CLI subcommand.

mod completions;
mod evaluate;
mod keys;
mod transform;
mod utils;
mod validate;

pub use completions::handle_completions;
pub use evaluate::handle_evaluate;
pub use keys::handle_keys;
pub use transform::handle_transform;
pub use validate::handle_validate;
pub use utils::effective_format;
