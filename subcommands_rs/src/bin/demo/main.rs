//! subcommands-demo binary
//!
//! Loads a small bot's extensions into an in-memory host, lets the manager
//! bind subcommands to groups declared in other cogs, and prints the final
//! command tree.

mod extensions;

use std::path::PathBuf;

use anyhow::{Result, anyhow};
use clap::Parser;
use serde::Serialize;
use tracing_subscriber::filter::LevelFilter;

use subcommands::memory::{MemoryHost, TreeEntry};
use subcommands::{ManagerConfig, SubcommandManager, UnresolvedSubcommand};

use extensions::Extension;

/// Bind subcommands declared across cogs to their groups and show the result.
#[derive(Parser, Debug)]
#[command(name = "subcommands-demo", author, version, about)]
struct Cli {
    /// Extensions to load, in order (comma separated).
    #[arg(
        long = "load",
        value_enum,
        value_delimiter = ',',
        default_values = ["prefix", "hybrid", "slash"]
    )]
    load: Vec<Extension>,
    /// Add the cogs of each extension in reverse order.
    #[arg(long)]
    reverse_cogs: bool,
    /// Cog to unload once every extension is in (repeatable).
    #[arg(long = "unload", value_name = "COG")]
    unload: Vec<String>,
    /// Manager config file (TOML, or JSON by extension).
    #[arg(long)]
    config: Option<PathBuf>,
    /// Give subcommands without an error handler their group's handler.
    #[arg(long)]
    copy_group_error_handler: bool,
    /// Refuse subcommands whose kind the target group cannot hold.
    #[arg(long)]
    check_group_type: bool,
    /// Exit with an error if any subcommand is left unattached.
    #[arg(long)]
    strict: bool,
    /// Print the tree and pending subcommands as JSON.
    #[arg(long)]
    json: bool,
    /// Log level (trace|debug|info|warn|error).
    #[arg(long, default_value = "warn")]
    log_level: String,
}

#[derive(Serialize)]
struct Report<'a> {
    config: &'a ManagerConfig,
    commands: Vec<TreeEntry>,
    unresolved: &'a [UnresolvedSubcommand],
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = cli
        .log_level
        .parse::<LevelFilter>()
        .map_err(|_| anyhow!("invalid log level: {}", cli.log_level))?;
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let config = resolve_config(&cli)?;
    let mut manager = SubcommandManager::new(MemoryHost::new(), config);

    for extension in &cli.load {
        extension
            .load(&mut manager, cli.reverse_cogs)
            .map_err(|err| anyhow!("extension {extension} failed to load: {err:#}"))?;
    }

    for cog in &cli.unload {
        manager.host_mut().unload_owner(cog);
        manager.process_events()?;
    }

    let remaining = manager.raise_for_remaining_commands();
    let unresolved = match &remaining {
        Ok(()) => &[][..],
        Err(err) => err.unresolved(),
    };

    if cli.json {
        let report = Report {
            config: manager.config(),
            commands: manager.host().snapshot(),
            unresolved,
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        for line in manager.host().render() {
            println!("{line}");
        }
        if !unresolved.is_empty() {
            println!();
            println!("unattached:");
            for entry in unresolved {
                println!("  {entry}");
            }
        }
    }

    tracing::info!(
        attached = manager.attached_count(),
        pending = manager.pending_count(),
        "demo finished"
    );

    if cli.strict {
        remaining?;
    }
    Ok(())
}

/// Config file first, then flags switch options on.
fn resolve_config(cli: &Cli) -> Result<ManagerConfig> {
    let base = match &cli.config {
        Some(path) => ManagerConfig::load_from_path(path)?,
        None => ManagerConfig::default(),
    };
    let copy = base.copy_group_error_handler || cli.copy_group_error_handler;
    let check = base.check_group_type || cli.check_group_type;
    Ok(base
        .with_copy_group_error_handler(copy)
        .with_check_group_type(check))
}
