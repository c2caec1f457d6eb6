//! Capabilities the binding core needs from the host application.
//!
//! The host owns every command and group; the core only holds handles to
//! them. Handles are cheap to clone and compare (an index, an `Rc`, an id).

use std::fmt;

use crate::error::HostError;
use crate::kind::CommandKind;

/// Read-only view of the host's group tree.
pub trait GroupTree {
    type Group: Clone + PartialEq + fmt::Debug;

    /// Top-level groups, in host registration order.
    fn root_groups(&self) -> Vec<Self::Group>;

    /// Own (unqualified) name of a group.
    fn group_name(&self, group: &Self::Group) -> String;

    /// Groups nested directly under `group`, in host order.
    fn nested_groups(&self, group: &Self::Group) -> Vec<Self::Group>;

    /// Invocation family of the group, which decides what it can hold.
    fn group_kind(&self, group: &Self::Group) -> CommandKind;
}

/// Notification delivered by the host to the binding manager.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostEvent<O> {
    /// A group (top-level or nested) became reachable; pending records are retried.
    GroupRegistered,
    /// An owner is about to be unloaded; its subcommands must be detached.
    OwnerRemoved(O),
}

/// Full host surface used by [`SubcommandManager`](crate::SubcommandManager).
pub trait CommandHost: GroupTree {
    type Command: Clone + PartialEq + fmt::Debug;
    /// Identity of the unit (module, cog) that declares subcommands.
    type Owner: Clone + PartialEq + fmt::Debug + fmt::Display;
    type ErrorHandler: Clone;

    fn command_name(&self, command: &Self::Command) -> String;

    fn command_kind(&self, command: &Self::Command) -> CommandKind;

    /// Whether the command is itself a group able to hold children.
    fn is_group(&self, command: &Self::Command) -> bool;

    /// Whether the command already sits under some group.
    fn has_parent(&self, command: &Self::Command) -> bool;

    /// Add `command` as a child of `group`. Fails on a child name collision.
    fn add_child(&mut self, group: &Self::Group, command: &Self::Command)
    -> Result<(), HostError>;

    /// Remove `command` from the children of `group`.
    fn remove_child(
        &mut self,
        group: &Self::Group,
        command: &Self::Command,
    ) -> Result<(), HostError>;

    /// Drop the command from the host's top-level command table, if present.
    fn remove_top_level(&mut self, _command: &Self::Command) {}

    fn group_error_handler(&self, group: &Self::Group) -> Option<Self::ErrorHandler>;

    fn has_error_handler(&self, command: &Self::Command) -> bool;

    fn set_error_handler(&mut self, command: &Self::Command, handler: Self::ErrorHandler);

    /// Start delivering [`HostEvent`]s through [`CommandHost::poll_events`].
    fn subscribe(&mut self) {}

    /// Stop delivering events.
    fn unsubscribe(&mut self) {}

    /// Drain events queued since the last call.
    fn poll_events(&mut self) -> Vec<HostEvent<Self::Owner>> {
        Vec::new()
    }
}

impl<T: GroupTree + ?Sized> GroupTree for &mut T {
    type Group = T::Group;

    fn root_groups(&self) -> Vec<Self::Group> {
        (**self).root_groups()
    }

    fn group_name(&self, group: &Self::Group) -> String {
        (**self).group_name(group)
    }

    fn nested_groups(&self, group: &Self::Group) -> Vec<Self::Group> {
        (**self).nested_groups(group)
    }

    fn group_kind(&self, group: &Self::Group) -> CommandKind {
        (**self).group_kind(group)
    }
}

impl<T: CommandHost + ?Sized> CommandHost for &mut T {
    type Command = T::Command;
    type Owner = T::Owner;
    type ErrorHandler = T::ErrorHandler;

    fn command_name(&self, command: &Self::Command) -> String {
        (**self).command_name(command)
    }

    fn command_kind(&self, command: &Self::Command) -> CommandKind {
        (**self).command_kind(command)
    }

    fn is_group(&self, command: &Self::Command) -> bool {
        (**self).is_group(command)
    }

    fn has_parent(&self, command: &Self::Command) -> bool {
        (**self).has_parent(command)
    }

    fn add_child(
        &mut self,
        group: &Self::Group,
        command: &Self::Command,
    ) -> Result<(), HostError> {
        (**self).add_child(group, command)
    }

    fn remove_child(
        &mut self,
        group: &Self::Group,
        command: &Self::Command,
    ) -> Result<(), HostError> {
        (**self).remove_child(group, command)
    }

    fn remove_top_level(&mut self, command: &Self::Command) {
        (**self).remove_top_level(command)
    }

    fn group_error_handler(&self, group: &Self::Group) -> Option<Self::ErrorHandler> {
        (**self).group_error_handler(group)
    }

    fn has_error_handler(&self, command: &Self::Command) -> bool {
        (**self).has_error_handler(command)
    }

    fn set_error_handler(&mut self, command: &Self::Command, handler: Self::ErrorHandler) {
        (**self).set_error_handler(command, handler)
    }

    fn subscribe(&mut self) {
        (**self).subscribe()
    }

    fn unsubscribe(&mut self) {
        (**self).unsubscribe()
    }

    fn poll_events(&mut self) -> Vec<HostEvent<Self::Owner>> {
        (**self).poll_events()
    }
}
