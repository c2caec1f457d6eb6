//! Attach-time policy.
//!
//! Pure functions, evaluated only while attaching a record; changing the
//! configuration later never touches subcommands that are already attached.

use crate::config::ManagerConfig;
use crate::kind::CommandKind;

/// Whether a group of `group` kind can hold a child command of `command` kind.
///
/// Slash groups only take slash commands, hybrid groups only take hybrid
/// commands, prefix groups take anything that can be invoked with a prefix.
pub fn accepts(group: CommandKind, command: CommandKind) -> bool {
    match group {
        CommandKind::Slash => command == CommandKind::Slash,
        CommandKind::Hybrid => command == CommandKind::Hybrid,
        CommandKind::Prefix => matches!(command, CommandKind::Prefix | CommandKind::Hybrid),
    }
}

/// Whether the group's error handler is copied onto the attached subcommand.
///
/// A subcommand that already has its own handler keeps it.
pub fn should_copy_error_handler(
    config: &ManagerConfig,
    group_has_handler: bool,
    command_has_handler: bool,
) -> bool {
    config.copy_group_error_handler && group_has_handler && !command_has_handler
}

/// Whether incompatible groups are reported instead of skipped.
pub fn reports_kind_mismatch(config: &ManagerConfig) -> bool {
    config.check_group_type
}
