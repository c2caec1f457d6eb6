//! Binding flows through the public API, over the bundled memory host and
//! over a minimal host that never emits events.

use std::collections::HashMap;

use subcommands::memory::MemoryHost;
use subcommands::{
    CommandHost, CommandKind, DeclarationQueue, GroupTree, HostError, ManagerConfig,
    SubcommandError, SubcommandManager, subcommand,
};

/// Groups keyed by their full path, commands by name. No event queue, so the
/// manager only retries when asked to.
#[derive(Default)]
struct PathHost {
    groups: HashMap<String, CommandKind>,
    children: HashMap<String, Vec<&'static str>>,
    commands: HashMap<&'static str, CommandKind>,
    parent: HashMap<&'static str, String>,
}

impl PathHost {
    fn group(&mut self, path: &str, kind: CommandKind) {
        self.groups.insert(path.to_string(), kind);
    }

    fn command(&mut self, name: &'static str, kind: CommandKind) -> &'static str {
        self.commands.insert(name, kind);
        name
    }

    fn children_of(&self, path: &str) -> Vec<&'static str> {
        self.children.get(path).cloned().unwrap_or_default()
    }
}

impl GroupTree for PathHost {
    type Group = String;

    fn root_groups(&self) -> Vec<String> {
        let mut roots: Vec<String> = self
            .groups
            .keys()
            .filter(|path| !path.contains(' '))
            .cloned()
            .collect();
        roots.sort();
        roots
    }

    fn group_name(&self, group: &String) -> String {
        group.rsplit(' ').next().unwrap_or(group).to_string()
    }

    fn nested_groups(&self, group: &String) -> Vec<String> {
        let prefix = format!("{group} ");
        let mut nested: Vec<String> = self
            .groups
            .keys()
            .filter(|path| {
                path.strip_prefix(&prefix)
                    .is_some_and(|rest| !rest.contains(' '))
            })
            .cloned()
            .collect();
        nested.sort();
        nested
    }

    fn group_kind(&self, group: &String) -> CommandKind {
        self.groups[group]
    }
}

impl CommandHost for PathHost {
    type Command = &'static str;
    type Owner = &'static str;
    type ErrorHandler = ();

    fn command_name(&self, command: &&'static str) -> String {
        command.to_string()
    }

    fn command_kind(&self, command: &&'static str) -> CommandKind {
        self.commands[command]
    }

    fn is_group(&self, _command: &&'static str) -> bool {
        false
    }

    fn has_parent(&self, command: &&'static str) -> bool {
        self.parent.contains_key(command)
    }

    fn add_child(&mut self, group: &String, command: &&'static str) -> Result<(), HostError> {
        if !self.groups.contains_key(group) {
            return Err(HostError::UnknownGroup {
                group: group.clone(),
            });
        }
        self.children.entry(group.clone()).or_default().push(*command);
        self.parent.insert(*command, group.clone());
        Ok(())
    }

    fn remove_child(&mut self, group: &String, command: &&'static str) -> Result<(), HostError> {
        let siblings = self.children.entry(group.clone()).or_default();
        let Some(position) = siblings.iter().position(|c| c == command) else {
            return Err(HostError::NotAChild {
                group: group.clone(),
                name: command.to_string(),
            });
        };
        siblings.remove(position);
        self.parent.remove(command);
        Ok(())
    }

    fn group_error_handler(&self, _group: &String) -> Option<()> {
        None
    }

    fn has_error_handler(&self, _command: &&'static str) -> bool {
        false
    }

    fn set_error_handler(&mut self, _command: &&'static str, _handler: ()) {}
}

#[test]
fn silent_host_binds_on_explicit_retry() {
    let mut manager = SubcommandManager::new(PathHost::default(), ManagerConfig::default());
    let ban = manager.host_mut().command("ban", CommandKind::Prefix);
    manager.register(ban, "admin", "Moderation").unwrap();
    assert_eq!(manager.pending_count(), 1);

    manager.host_mut().group("admin", CommandKind::Prefix);
    manager.process_events().unwrap();
    assert_eq!(manager.pending_count(), 1);

    assert_eq!(manager.resolve_pending().unwrap(), 1);
    assert_eq!(manager.host().children_of("admin"), vec!["ban"]);
    assert_eq!(manager.record(&"ban").unwrap().group(), Some(&"admin".to_string()));
}

#[test]
fn silent_host_resolves_nested_paths() {
    let mut host = PathHost::default();
    host.group("server", CommandKind::Slash);
    host.group("server settings", CommandKind::Slash);
    let edit = host.command("edit-name", CommandKind::Slash);

    let mut manager = SubcommandManager::new(host, ManagerConfig::default());
    manager.register(edit, "server  settings", "Settings").unwrap();

    assert_eq!(manager.host().children_of("server settings"), vec!["edit-name"]);
    assert!(manager.host().children_of("server").is_empty());
}

#[test]
fn owner_removal_without_events() {
    let mut host = PathHost::default();
    host.group("admin", CommandKind::Prefix);
    let ban = host.command("ban", CommandKind::Prefix);
    let kick = host.command("kick", CommandKind::Prefix);

    let mut manager = SubcommandManager::new(host, ManagerConfig::default());
    manager.register(ban, "admin", "Moderation").unwrap();
    manager.register(kick, "admin", "Kicks").unwrap();

    manager.on_owner_removed(&"Moderation");

    assert_eq!(manager.host().children_of("admin"), vec!["kick"]);
    assert_eq!(manager.records().len(), 1);
    assert_eq!(manager.records()[0].owner(), &"Kicks");
}

#[test]
fn startup_queue_then_strict_validation() {
    let mut host = MemoryHost::new();
    let user = host.add_group("Groups", "user", CommandKind::Prefix);
    let info = host.add_command("UserInfo", "info", CommandKind::Prefix);
    let banner = host.add_command("ServerCommands", "banner", CommandKind::Slash);
    let whenjoin = host.add_command("Utilities", "whenjoin", CommandKind::Prefix);

    let mut queue = DeclarationQueue::new();
    queue.push("UserInfo".to_string(), subcommand("user", info).unwrap());
    queue.push("ServerCommands".to_string(), subcommand("server", banner).unwrap());
    queue.push("Utilities".to_string(), subcommand("user utils", whenjoin).unwrap());

    let manager = SubcommandManager::with_declarations(host, ManagerConfig::default(), queue);
    assert_eq!(manager.host().child_names(user), vec!["info"]);

    let err = manager.raise_for_remaining_commands().unwrap_err();
    let message = err.to_string();
    assert!(message.starts_with("2 subcommands could not be attached:"));
    assert!(message.contains("\"server\""));
    assert!(message.contains("\"user utils\""));
    assert_eq!(err.unresolved().len(), 2);
}

#[test]
fn mismatch_is_reported_and_recoverable() {
    let config = ManagerConfig::default().with_check_group_type(true);
    let mut manager = SubcommandManager::new(MemoryHost::new(), config);
    let prefix_server = manager
        .host_mut()
        .add_group("Legacy", "server", CommandKind::Prefix);
    let banner = manager
        .host_mut()
        .add_command("ServerCommands", "banner", CommandKind::Slash);

    let err = manager
        .register(banner, "server", "ServerCommands".to_string())
        .unwrap_err();
    assert!(matches!(err, SubcommandError::TypeMismatch { .. }));
    assert!(manager.host().children(prefix_server).is_empty());

    // The slash group shows up later and the pending record binds to it.
    let slash_server = manager
        .host_mut()
        .add_group("SlashCog", "server", CommandKind::Slash);
    manager.process_events().unwrap();

    assert_eq!(manager.host().child_names(slash_server), vec!["banner"]);
    manager.raise_for_remaining_commands().unwrap();
}
