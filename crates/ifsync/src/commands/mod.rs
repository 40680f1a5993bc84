//! Stage handlers: each subcommand drives one pipeline terminus.

pub mod config_cmd;
pub mod discover;
pub mod identify;
pub mod update;
pub mod util;
