//! In-memory command host.
//!
//! An arena of command nodes with owners, kinds and error-handler labels.
//! It behaves like a small bot framework: commands start out top-level,
//! groups hold named children, unloading an owner removes what it added at
//! top level. Events are queued only while a manager is subscribed.

use serde::Serialize;

use crate::error::HostError;
use crate::host::{CommandHost, GroupTree, HostEvent};
use crate::kind::CommandKind;

/// Handle to a command or group stored in a [`MemoryHost`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct NodeId(usize);

#[derive(Debug, Clone)]
struct Node {
    name: String,
    kind: CommandKind,
    is_group: bool,
    owner: String,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    error_handler: Option<String>,
    live: bool,
}

/// Serializable view of one command and its children.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TreeEntry {
    pub name: String,
    pub kind: CommandKind,
    pub group: bool,
    pub owner: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_handler: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<TreeEntry>,
}

#[derive(Debug, Default)]
pub struct MemoryHost {
    nodes: Vec<Node>,
    top_level: Vec<NodeId>,
    events: Vec<HostEvent<String>>,
    subscribed: bool,
}

impl MemoryHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a top-level command.
    pub fn add_command(&mut self, owner: &str, name: &str, kind: CommandKind) -> NodeId {
        let id = self.push_node(owner, name, kind, false, None);
        self.top_level.push(id);
        id
    }

    /// Register a top-level group.
    pub fn add_group(&mut self, owner: &str, name: &str, kind: CommandKind) -> NodeId {
        let id = self.push_node(owner, name, kind, true, None);
        self.top_level.push(id);
        self.emit(HostEvent::GroupRegistered);
        id
    }

    /// Declare a command directly inside `parent`, inheriting its kind.
    pub fn add_nested_command(
        &mut self,
        parent: NodeId,
        owner: &str,
        name: &str,
    ) -> Result<NodeId, HostError> {
        self.add_nested(parent, owner, name, false)
    }

    /// Declare a group directly inside `parent`, inheriting its kind.
    pub fn add_nested_group(
        &mut self,
        parent: NodeId,
        owner: &str,
        name: &str,
    ) -> Result<NodeId, HostError> {
        let id = self.add_nested(parent, owner, name, true)?;
        self.emit(HostEvent::GroupRegistered);
        Ok(id)
    }

    pub fn set_error_handler_label(&mut self, id: NodeId, label: &str) {
        self.nodes[id.0].error_handler = Some(label.to_string());
    }

    pub fn error_handler(&self, id: NodeId) -> Option<&str> {
        self.nodes[id.0].error_handler.as_deref()
    }

    pub fn name(&self, id: NodeId) -> &str {
        &self.nodes[id.0].name
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0].parent
    }

    pub fn is_live(&self, id: NodeId) -> bool {
        self.nodes[id.0].live
    }

    pub fn is_top_level(&self, id: NodeId) -> bool {
        self.top_level.contains(&id)
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id.0].children
    }

    pub fn child_names(&self, id: NodeId) -> Vec<String> {
        self.children(id)
            .iter()
            .map(|child| self.nodes[child.0].name.clone())
            .collect()
    }

    pub fn top_level_names(&self) -> Vec<String> {
        self.top_level
            .iter()
            .map(|id| self.nodes[id.0].name.clone())
            .collect()
    }

    /// Find a live command by its space-separated path, first match wins.
    pub fn find(&self, path: &str) -> Option<NodeId> {
        let mut frontier: &[NodeId] = self.top_level.as_slice();
        let mut found = None;
        for segment in path.split_whitespace() {
            let next = frontier
                .iter()
                .copied()
                .find(|id| self.nodes[id.0].live && self.nodes[id.0].name == segment)?;
            frontier = self.nodes[next.0].children.as_slice();
            found = Some(next);
        }
        found
    }

    /// Unload `owner`: queue [`HostEvent::OwnerRemoved`], then drop every
    /// top-level command and group it registered (with their subtrees).
    ///
    /// Subcommands the owner contributed to other owners' groups stay where
    /// they are until the manager detaches them.
    pub fn unload_owner(&mut self, owner: &str) {
        self.emit(HostEvent::OwnerRemoved(owner.to_string()));
        let (removed, kept): (Vec<NodeId>, Vec<NodeId>) = self
            .top_level
            .iter()
            .partition(|id| self.nodes[id.0].owner == owner);
        self.top_level = kept;
        for id in removed {
            self.kill_subtree(id);
        }
    }

    /// Live top-level commands as a tree.
    pub fn snapshot(&self) -> Vec<TreeEntry> {
        self.top_level.iter().map(|id| self.entry(*id)).collect()
    }

    /// Indented, one line per command.
    pub fn render(&self) -> Vec<String> {
        let mut lines = Vec::new();
        for entry in self.snapshot() {
            render_entry(&entry, 0, &mut lines);
        }
        lines
    }

    fn entry(&self, id: NodeId) -> TreeEntry {
        let node = &self.nodes[id.0];
        TreeEntry {
            name: node.name.clone(),
            kind: node.kind,
            group: node.is_group,
            owner: node.owner.clone(),
            error_handler: node.error_handler.clone(),
            children: node.children.iter().map(|child| self.entry(*child)).collect(),
        }
    }

    fn push_node(
        &mut self,
        owner: &str,
        name: &str,
        kind: CommandKind,
        is_group: bool,
        parent: Option<NodeId>,
    ) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            name: name.to_string(),
            kind,
            is_group,
            owner: owner.to_string(),
            parent,
            children: Vec::new(),
            error_handler: None,
            live: true,
        });
        id
    }

    fn add_nested(
        &mut self,
        parent: NodeId,
        owner: &str,
        name: &str,
        is_group: bool,
    ) -> Result<NodeId, HostError> {
        self.check_group(parent)?;
        self.check_free_name(parent, name)?;
        let kind = self.nodes[parent.0].kind;
        let id = self.push_node(owner, name, kind, is_group, Some(parent));
        self.nodes[parent.0].children.push(id);
        Ok(id)
    }

    fn check_group(&self, group: NodeId) -> Result<(), HostError> {
        let node = &self.nodes[group.0];
        if node.live && node.is_group {
            Ok(())
        } else {
            Err(HostError::UnknownGroup {
                group: node.name.clone(),
            })
        }
    }

    fn check_free_name(&self, group: NodeId, name: &str) -> Result<(), HostError> {
        let taken = self.nodes[group.0]
            .children
            .iter()
            .any(|child| self.nodes[child.0].name == name);
        if taken {
            return Err(HostError::NameCollision {
                group: self.nodes[group.0].name.clone(),
                name: name.to_string(),
            });
        }
        Ok(())
    }

    fn kill_subtree(&mut self, id: NodeId) {
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            let node = &mut self.nodes[current.0];
            node.live = false;
            stack.extend(node.children.iter().copied());
        }
    }

    fn emit(&mut self, event: HostEvent<String>) {
        if self.subscribed {
            self.events.push(event);
        }
    }
}

fn render_entry(entry: &TreeEntry, depth: usize, lines: &mut Vec<String>) {
    let what = if entry.group { "group" } else { "command" };
    let mut line = format!(
        "{}{} [{} {}] ({})",
        "  ".repeat(depth),
        entry.name,
        entry.kind,
        what,
        entry.owner
    );
    if let Some(handler) = &entry.error_handler {
        line.push_str(&format!(" on_error={handler}"));
    }
    lines.push(line);
    for child in &entry.children {
        render_entry(child, depth + 1, lines);
    }
}

impl GroupTree for MemoryHost {
    type Group = NodeId;

    fn root_groups(&self) -> Vec<NodeId> {
        self.top_level
            .iter()
            .copied()
            .filter(|id| self.nodes[id.0].is_group && self.nodes[id.0].live)
            .collect()
    }

    fn group_name(&self, group: &NodeId) -> String {
        self.nodes[group.0].name.clone()
    }

    fn nested_groups(&self, group: &NodeId) -> Vec<NodeId> {
        self.nodes[group.0]
            .children
            .iter()
            .copied()
            .filter(|id| self.nodes[id.0].is_group && self.nodes[id.0].live)
            .collect()
    }

    fn group_kind(&self, group: &NodeId) -> CommandKind {
        self.nodes[group.0].kind
    }
}

impl CommandHost for MemoryHost {
    type Command = NodeId;
    type Owner = String;
    type ErrorHandler = String;

    fn command_name(&self, command: &NodeId) -> String {
        self.nodes[command.0].name.clone()
    }

    fn command_kind(&self, command: &NodeId) -> CommandKind {
        self.nodes[command.0].kind
    }

    fn is_group(&self, command: &NodeId) -> bool {
        self.nodes[command.0].is_group
    }

    fn has_parent(&self, command: &NodeId) -> bool {
        self.nodes[command.0].parent.is_some()
    }

    fn add_child(&mut self, group: &NodeId, command: &NodeId) -> Result<(), HostError> {
        self.check_group(*group)?;
        let name = self.nodes[command.0].name.clone();
        self.check_free_name(*group, &name)?;
        self.nodes[group.0].children.push(*command);
        self.nodes[command.0].parent = Some(*group);
        if self.nodes[command.0].is_group {
            self.emit(HostEvent::GroupRegistered);
        }
        Ok(())
    }

    fn remove_child(&mut self, group: &NodeId, command: &NodeId) -> Result<(), HostError> {
        let position = self.nodes[group.0]
            .children
            .iter()
            .position(|child| child == command)
            .ok_or_else(|| HostError::NotAChild {
                group: self.nodes[group.0].name.clone(),
                name: self.nodes[command.0].name.clone(),
            })?;
        self.nodes[group.0].children.remove(position);
        self.nodes[command.0].parent = None;
        Ok(())
    }

    fn remove_top_level(&mut self, command: &NodeId) {
        self.top_level.retain(|id| id != command);
    }

    fn group_error_handler(&self, group: &NodeId) -> Option<String> {
        self.nodes[group.0].error_handler.clone()
    }

    fn has_error_handler(&self, command: &NodeId) -> bool {
        self.nodes[command.0].error_handler.is_some()
    }

    fn set_error_handler(&mut self, command: &NodeId, handler: String) {
        self.nodes[command.0].error_handler = Some(handler);
    }

    fn subscribe(&mut self) {
        self.subscribed = true;
    }

    fn unsubscribe(&mut self) {
        self.subscribed = false;
        self.events.clear();
    }

    fn poll_events(&mut self) -> Vec<HostEvent<String>> {
        std::mem::take(&mut self.events)
    }
}
