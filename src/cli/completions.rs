//! `hoard completions`: print a completion script for the given shell.

use clap::CommandFactory;
use clap_complete::Shell;

use crate::cli::{output, Cli};
use crate::error::Result;

pub fn execute(shell: Shell) -> Result<()> {
    let mut command = Cli::command();
    let name = command.get_name().to_string();

    let mut script = Vec::new();
    clap_complete::generate(shell, &mut command, name, &mut script);
    output::raw(&script)?;
    Ok(())
}
