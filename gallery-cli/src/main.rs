//! Gallery: draft and deploy tool for the character gallery.
//!
//! # Usage
//!
//! ```text
//! gallery init [--published <path> | --rest-url <url> [--table T] [--api-key-env VAR]] [--public]
//! gallery list [--published] [--json]
//! gallery add --title <t> --creator <c> [--cover URL] [--audio URL] [...]
//! gallery edit <id> [--title <t>] [...] [--clear-description] [...]
//! gallery remove <id>
//! gallery move <id> <position>
//! gallery reset
//! gallery diff
//! gallery deploy [--dry-run]
//! ```

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};

use commands::{
    deploy::DeployArgs,
    diff::DiffArgs,
    init::InitArgs,
    items::{AddArgs, EditArgs, MoveArgs, RemoveArgs},
    list::ListArgs,
};

// ---------------------------------------------------------------------------
// CLI entry point
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(
    name = "gallery",
    version,
    about = "Edit the gallery draft locally and deploy it to the published store",
    long_about = None,
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Create ~/.gallery/config.yaml.
    Init(InitArgs),

    /// Show the draft (or the published set).
    List(ListArgs),

    /// Append a new item to the draft.
    Add(AddArgs),

    /// Change fields of a draft item.
    Edit(EditArgs),

    /// Remove an item from the draft.
    Remove(RemoveArgs),

    /// Move a draft item to a new 1-based position.
    Move(MoveArgs),

    /// Replace the draft with the built-in seed set.
    Reset,

    /// Show unified diffs of what deploy would change.
    Diff(DiffArgs),

    /// Publish the draft to the remote store.
    Deploy(DeployArgs),
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Init(args) => args.run(),
        Commands::List(args) => args.run(),
        Commands::Add(args) => args.run(),
        Commands::Edit(args) => args.run(),
        Commands::Remove(args) => args.run(),
        Commands::Move(args) => args.run(),
        Commands::Reset => commands::items::reset(),
        Commands::Diff(args) => args.run(),
        Commands::Deploy(args) => args.run(),
    }
}
