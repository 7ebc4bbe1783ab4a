use anyhow::Result;
use clap::{Parser, Subcommand};

mod cmd;

use cmd::{CompleteArgs, ExecArgs, TreeArgs};
use hyper_command::utils;

/// Hyper Command - completion and dispatch over a declarative command tree.
///
/// Command layout:
///   hyper-command -c cmds.yaml complete "<line>" [--json]
///   hyper-command -c cmds.yaml exec "<line>" [--json]
///   hyper-command -c cmds.yaml tree [--json]
///
/// A line ending in a space completes the next word:
///   hyper-command complete "MyCommand say "
///
/// Global flags / env:
///   -v / -vv          Increase verbosity (debug / trace of every dispatch decision)
///   -q / --quiet      Errors only
///   -c / --commands   Command manifest (YAML or JSON)
///   HYPER_COMMANDS    Environment fallback if -c not provided
#[derive(Parser, Debug)]
#[command(
    name = "hyper-command",
    version,
    author,
    about = "Hyper Command - tab completion and dispatch for command trees",
    propagate_version = true,
    disable_help_subcommand = true
)]
pub struct Cli {
    /// Increase verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Silence all non-error output
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Command manifest file (.yaml/.yml or .json)
    #[arg(short = 'c', long = "commands", global = true, value_name = "FILE")]
    commands: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Suggest completions for the last word of a line
    Complete(CompleteArgs),

    /// Execute the command a line resolves to
    Exec(ExecArgs),

    /// Show the compiled command tree
    Tree(TreeArgs),
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = utils::derive_level(cli.verbose, cli.quiet);
    utils::init_logging(level);

    let manifest = match cmd::shared::resolve_manifest_path(cli.commands.as_deref()) {
        Ok(p) => p,
        Err(e) => {
            hyper_command::log_error!("{e}");
            std::process::exit(2);
        }
    };

    match cli.command {
        Commands::Complete(args) => cmd::execute_complete(args, &manifest),
        Commands::Exec(args) => cmd::execute_exec(args, &manifest),
        Commands::Tree(args) => cmd::execute_tree(args, &manifest),
    }
}
