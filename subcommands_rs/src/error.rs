//! Error types.
//!
//! "Target group not found yet" is not an error anywhere in this crate: it is
//! the normal pending state. Unresolved records are only reported on demand,
//! through [`SubcommandManager::raise_for_remaining_commands`](crate::SubcommandManager::raise_for_remaining_commands).

use std::fmt;

use serde::Serialize;
use thiserror::Error;

use crate::kind::CommandKind;
use crate::name::QualifiedName;

/// Failure reported by a host capability.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HostError {
    #[error("group {group:?} already has a child named {name:?}")]
    NameCollision { group: String, name: String },
    #[error("command {name:?} is not a child of group {group:?}")]
    NotAChild { group: String, name: String },
    #[error("group {group:?} is no longer registered")]
    UnknownGroup { group: String },
}

/// Group kind found for a target that cannot hold the subcommand's kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct KindMismatch {
    pub group_kind: CommandKind,
    pub command_kind: CommandKind,
}

/// One record still pending when diagnostics were requested.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnresolvedSubcommand {
    pub command: String,
    pub kind: CommandKind,
    pub is_group: bool,
    pub target: QualifiedName,
    pub owner: String,
    /// Set when a group with the target path exists but has the wrong kind.
    pub mismatch: Option<KindMismatch>,
    /// Closest existing group path, if any is near enough.
    pub suggestion: Option<String>,
}

impl fmt::Display for UnresolvedSubcommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let group_noun = self.kind.group_noun(self.is_group);
        let command_noun = self.kind.command_noun(self.is_group);
        if let Some(mismatch) = self.mismatch {
            return write!(
                f,
                "{group_noun} {:?} for {command_noun} {:?} in owner {:?} is a {} group and cannot hold a {} command.",
                self.target.to_string(),
                self.command,
                self.owner,
                mismatch.group_kind,
                mismatch.command_kind,
            );
        }
        write!(
            f,
            "{group_noun} {:?} for {command_noun} {:?} in owner {:?} was not found.",
            self.target.to_string(),
            self.command,
            self.owner,
        )?;
        if let Some(suggestion) = &self.suggestion {
            write!(f, " Did you mean {suggestion:?}?")?;
        }
        Ok(())
    }
}

/// Errors raised by the binding manager.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubcommandError {
    /// Target text contained no group name.
    #[error("invalid target group name {text:?}: expected at least one name")]
    InvalidTarget { text: String },

    /// Target group exists but cannot hold the command (only with `check_group_type`).
    #[error(
        "cannot add {command_kind} command {command:?} to {group_kind} group {group:?}"
    )]
    TypeMismatch {
        command: String,
        command_kind: CommandKind,
        group: String,
        group_kind: CommandKind,
    },

    /// Command already sits under some group.
    #[error("command {command:?} is already a subcommand")]
    AlreadySubcommand { command: String },

    /// Same command handle registered twice.
    #[error("command {command:?} is already registered as a subcommand of {target:?}")]
    DuplicateSubcommand { command: String, target: String },

    /// Host refused to add or remove a child.
    #[error(transparent)]
    Host(#[from] HostError),

    /// Records still pending when the caller asserted everything should be attached.
    #[error("{}", format_unresolved(.0))]
    Unresolved(Vec<UnresolvedSubcommand>),
}

impl SubcommandError {
    /// Pending records carried by an [`SubcommandError::Unresolved`] error.
    pub fn unresolved(&self) -> &[UnresolvedSubcommand] {
        match self {
            SubcommandError::Unresolved(entries) => entries,
            _ => &[],
        }
    }
}

fn format_unresolved(entries: &[UnresolvedSubcommand]) -> String {
    match entries {
        [single] => single.to_string(),
        _ => {
            let mut out = format!("{} subcommands could not be attached:", entries.len());
            for entry in entries {
                out.push_str("\n  - ");
                out.push_str(&entry.to_string());
            }
            out
        }
    }
}
