//! Command kinds reported by the host.
//!
//! Kinds drive the group compatibility policy and the wording of
//! diagnostics for commands that never found their group.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Invocation family of a command or group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CommandKind {
    /// Text command invoked with a prefix
    Prefix,
    /// Registered both as a prefix command and as a slash command
    Hybrid,
    /// Application (slash) command only
    Slash,
}

impl CommandKind {
    /// Returns a lowercase label for the kind.
    pub fn as_label(&self) -> &'static str {
        match self {
            CommandKind::Prefix => "prefix",
            CommandKind::Hybrid => "hybrid",
            CommandKind::Slash => "slash",
        }
    }

    /// How a command of this kind is called in diagnostics.
    pub fn command_noun(&self, is_group: bool) -> &'static str {
        if is_group {
            return "group";
        }
        match self {
            CommandKind::Slash => "app command",
            CommandKind::Prefix | CommandKind::Hybrid => "command",
        }
    }

    /// How a group able to hold a command of this kind is called in diagnostics.
    pub fn group_noun(&self, is_group: bool) -> &'static str {
        if is_group {
            return "Group";
        }
        match self {
            CommandKind::Slash => "App command group",
            CommandKind::Prefix | CommandKind::Hybrid => "Command group",
        }
    }
}

impl fmt::Display for CommandKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_label())
    }
}
