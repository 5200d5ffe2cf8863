//! Saved mode state inspection and conversion.

use annuli_config::ModuleState;
use anyhow::Context;
use clap::{Args, Subcommand};
use std::path::{Path, PathBuf};

#[derive(Args)]
pub struct StateArgs {
    #[command(subcommand)]
    command: StateCommand,
}

#[derive(Subcommand)]
enum StateCommand {
    /// Print a state file and the mode it selects
    Show {
        /// State file (.json or .toml)
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },

    /// Convert a state file between JSON and TOML (by extension)
    Convert {
        /// Source file
        #[arg(value_name = "INPUT")]
        input: PathBuf,

        /// Destination file
        #[arg(value_name = "OUTPUT")]
        output: PathBuf,
    },
}

pub fn run(args: StateArgs) -> anyhow::Result<()> {
    match args.command {
        StateCommand::Show { file } => show(&file),
        StateCommand::Convert { input, output } => convert(&input, &output),
    }
}

fn show(file: &Path) -> anyhow::Result<()> {
    let state = ModuleState::load(file)
        .with_context(|| format!("failed to load state '{}'", file.display()))?;
    let mode = state.to_snapshot();

    println!("{}", file.display());
    println!("  polyphony:  {} ({} voices)", state.polyphony, mode.voices());
    println!("  model:      {} ({})", state.model, mode.model.name());
    println!("  easter egg: {}", if state.easter_egg { "on" } else { "off" });
    Ok(())
}

fn convert(input: &Path, output: &Path) -> anyhow::Result<()> {
    let state = ModuleState::load(input)
        .with_context(|| format!("failed to load state '{}'", input.display()))?;
    state
        .save(output)
        .with_context(|| format!("failed to save state '{}'", output.display()))?;
    tracing::info!(from = %input.display(), to = %output.display(), "converted state");
    Ok(())
}
