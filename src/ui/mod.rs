//! Terminal front end

mod cli;

pub use cli::{format_time, format_update, parse_command, Args, Cli, ReplCommand, SEEK_STEP_SECONDS, VOLUME_STEP};
