use clap_complete::{generate, Shell};

use crate::common::CmdResult;

/// Write the completion script for `shell` to stdout.
pub fn run(shell: Shell, command: &mut clap::Command) -> CmdResult {
    let mut out = std::io::stdout();
    generate(shell, command, "timeslot", &mut out);
    Ok(())
}
