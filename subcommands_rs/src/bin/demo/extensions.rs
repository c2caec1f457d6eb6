//! Demo extensions: groups in one cog, their subcommands spread over others.

use std::fmt;

use anyhow::{Context, Result};
use clap::ValueEnum;
use subcommands::memory::{MemoryHost, NodeId};
use subcommands::{CommandKind, Declaration, SubcommandError, SubcommandManager, subcommand};

type Manager = SubcommandManager<MemoryHost>;
type Build = fn(&mut MemoryHost, &str) -> Result<Vec<Declaration<NodeId>>, SubcommandError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Extension {
    /// `user` prefix group, `user utils` subgroup, user info commands
    Prefix,
    /// `channel` hybrid group with `manage` and `utils` subgroups
    Hybrid,
    /// `server` slash group with a `settings` subgroup
    Slash,
    /// A slash command aimed at the prefix `user` group
    Misplaced,
}

impl Extension {
    /// Cogs in the order the extension adds them.
    fn cogs(self) -> &'static [(&'static str, Build)] {
        match self {
            Extension::Prefix => &[
                ("Groups", prefix_groups),
                ("Utilities", prefix_utilities),
                ("UserInfo", prefix_user_info),
            ],
            Extension::Hybrid => &[
                ("HybridGroups", hybrid_groups),
                ("HybridChannelCommands", hybrid_channel_commands),
                ("HybridChannelManagement", hybrid_channel_management),
                ("HybridUtilityCommands", hybrid_utility_commands),
            ],
            Extension::Slash => &[
                ("ServerCommands", slash_server_commands),
                ("SlashCog", slash_cog),
                ("ServerSettingsCommands", slash_server_settings),
            ],
            Extension::Misplaced => &[("Misplaced", misplaced)],
        }
    }

    pub fn load(self, manager: &mut Manager, reverse_cogs: bool) -> Result<()> {
        let mut cogs: Vec<&(&str, Build)> = self.cogs().iter().collect();
        if reverse_cogs {
            cogs.reverse();
        }
        for (owner, build) in cogs {
            let declarations = build(manager.host_mut(), owner)
                .with_context(|| format!("failed to build cog {owner}"))?;
            manager
                .load_owner(owner.to_string(), declarations)
                .with_context(|| format!("failed to add cog {owner}"))?;
            manager.process_events()?;
            tracing::info!(extension = %self, cog = owner, "cog added");
        }
        Ok(())
    }
}

impl fmt::Display for Extension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Extension::Prefix => "prefix",
            Extension::Hybrid => "hybrid",
            Extension::Slash => "slash",
            Extension::Misplaced => "misplaced",
        };
        f.write_str(label)
    }
}

fn declare(
    host: &mut MemoryHost,
    owner: &str,
    target: &str,
    name: &str,
    kind: CommandKind,
) -> Result<Declaration<NodeId>, SubcommandError> {
    subcommand(target, host.add_command(owner, name, kind))
}

fn declare_group(
    host: &mut MemoryHost,
    owner: &str,
    target: &str,
    name: &str,
    kind: CommandKind,
) -> Result<Declaration<NodeId>, SubcommandError> {
    subcommand(target, host.add_group(owner, name, kind))
}

fn prefix_groups(
    host: &mut MemoryHost,
    owner: &str,
) -> Result<Vec<Declaration<NodeId>>, SubcommandError> {
    let user = host.add_group(owner, "user", CommandKind::Prefix);
    host.set_error_handler_label(user, "user_error");
    host.add_nested_command(user, owner, "help")?;
    Ok(Vec::new())
}

fn prefix_utilities(
    host: &mut MemoryHost,
    owner: &str,
) -> Result<Vec<Declaration<NodeId>>, SubcommandError> {
    Ok(vec![declare(host, owner, "user utils", "whenjoin", CommandKind::Prefix)?])
}

fn prefix_user_info(
    host: &mut MemoryHost,
    owner: &str,
) -> Result<Vec<Declaration<NodeId>>, SubcommandError> {
    Ok(vec![
        declare(host, owner, "user", "info", CommandKind::Prefix)?,
        declare(host, owner, "user", "avatar", CommandKind::Prefix)?,
        declare_group(host, owner, "user", "utils", CommandKind::Prefix)?,
    ])
}

fn hybrid_groups(
    host: &mut MemoryHost,
    owner: &str,
) -> Result<Vec<Declaration<NodeId>>, SubcommandError> {
    let channel = host.add_group(owner, "channel", CommandKind::Hybrid);
    host.add_nested_command(channel, owner, "help")?;
    Ok(Vec::new())
}

fn hybrid_channel_commands(
    host: &mut MemoryHost,
    owner: &str,
) -> Result<Vec<Declaration<NodeId>>, SubcommandError> {
    Ok(vec![
        declare(host, owner, "channel", "info", CommandKind::Hybrid)?,
        declare(host, owner, "channel", "topic", CommandKind::Hybrid)?,
    ])
}

fn hybrid_channel_management(
    host: &mut MemoryHost,
    owner: &str,
) -> Result<Vec<Declaration<NodeId>>, SubcommandError> {
    let manage = declare_group(host, owner, "channel", "manage", CommandKind::Hybrid)?;
    host.add_nested_command(manage.command, owner, "create")?;
    host.add_nested_command(manage.command, owner, "delete")?;
    Ok(vec![manage])
}

fn hybrid_utility_commands(
    host: &mut MemoryHost,
    owner: &str,
) -> Result<Vec<Declaration<NodeId>>, SubcommandError> {
    Ok(vec![
        declare_group(host, owner, "channel", "utils", CommandKind::Hybrid)?,
        declare(host, owner, "channel utils", "membercount", CommandKind::Hybrid)?,
        declare(host, owner, "channel utils", "permissions", CommandKind::Hybrid)?,
    ])
}

fn slash_server_commands(
    host: &mut MemoryHost,
    owner: &str,
) -> Result<Vec<Declaration<NodeId>>, SubcommandError> {
    Ok(vec![
        declare(host, owner, "server", "banner", CommandKind::Slash)?,
        declare(host, owner, "server", "icon", CommandKind::Slash)?,
    ])
}

fn slash_cog(
    host: &mut MemoryHost,
    owner: &str,
) -> Result<Vec<Declaration<NodeId>>, SubcommandError> {
    let server = host.add_group(owner, "server", CommandKind::Slash);
    host.add_nested_command(server, owner, "info")?;
    host.add_nested_group(server, owner, "settings")?;
    Ok(Vec::new())
}

fn slash_server_settings(
    host: &mut MemoryHost,
    owner: &str,
) -> Result<Vec<Declaration<NodeId>>, SubcommandError> {
    Ok(vec![
        declare(host, owner, "server settings", "edit-name", CommandKind::Slash)?,
        declare(host, owner, "server settings", "edit-description", CommandKind::Slash)?,
    ])
}

fn misplaced(
    host: &mut MemoryHost,
    owner: &str,
) -> Result<Vec<Declaration<NodeId>>, SubcommandError> {
    Ok(vec![declare(host, owner, "user", "ping", CommandKind::Slash)?])
}
