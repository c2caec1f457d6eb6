//! Subcommand declarations and the records the manager keeps for them.

use crate::error::{KindMismatch, SubcommandError};
use crate::name::QualifiedName;

/// A command marked as belonging to a group declared elsewhere.
///
/// Produced by [`subcommand`] at declaration time, possibly before any group
/// or manager exists.
#[derive(Debug, Clone, PartialEq)]
pub struct Declaration<C> {
    pub command: C,
    pub target: QualifiedName,
}

impl<C> Declaration<C> {
    pub fn into_command(self) -> C {
        self.command
    }
}

/// Mark `command` as a subcommand of the group at `target`.
///
/// The builder-style counterpart of a `@subcommand("group")` decorator: the
/// command comes back unchanged, paired with its parsed target.
pub fn subcommand<C>(target: &str, command: C) -> Result<Declaration<C>, SubcommandError> {
    Ok(Declaration {
        target: QualifiedName::parse(target)?,
        command,
    })
}

/// Declarations collected per owner before a manager is constructed.
#[derive(Debug, Clone)]
pub struct DeclarationQueue<C, O> {
    entries: Vec<(O, Declaration<C>)>,
}

impl<C, O> Default for DeclarationQueue<C, O> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
        }
    }
}

impl<C, O> DeclarationQueue<C, O> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, owner: O, declaration: Declaration<C>) {
        self.entries.push((owner, declaration));
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<C, O> IntoIterator for DeclarationQueue<C, O> {
    type Item = (O, Declaration<C>);
    type IntoIter = std::vec::IntoIter<(O, Declaration<C>)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

/// Where a record currently stands.
#[derive(Debug, Clone, PartialEq)]
pub enum RecordState<G> {
    /// Target not resolved (or not compatible) yet.
    Pending,
    /// Bound to this group.
    Attached(G),
}

/// One declared subcommand tracked by the manager.
#[derive(Debug, Clone)]
pub struct SubcommandRecord<C, G, O> {
    pub(crate) command: C,
    pub(crate) target: QualifiedName,
    pub(crate) owner: O,
    pub(crate) state: RecordState<G>,
    pub(crate) mismatch: Option<KindMismatch>,
}

impl<C, G, O> SubcommandRecord<C, G, O> {
    pub(crate) fn new(owner: O, declaration: Declaration<C>) -> Self {
        Self {
            command: declaration.command,
            target: declaration.target,
            owner,
            state: RecordState::Pending,
            mismatch: None,
        }
    }

    pub fn command(&self) -> &C {
        &self.command
    }

    pub fn target(&self) -> &QualifiedName {
        &self.target
    }

    pub fn owner(&self) -> &O {
        &self.owner
    }

    pub fn state(&self) -> &RecordState<G> {
        &self.state
    }

    pub fn is_attached(&self) -> bool {
        matches!(self.state, RecordState::Attached(_))
    }

    /// Group this record is attached to.
    pub fn group(&self) -> Option<&G> {
        match &self.state {
            RecordState::Attached(group) => Some(group),
            RecordState::Pending => None,
        }
    }

    /// Kind mismatch seen on the last resolution attempt, if any.
    pub fn mismatch(&self) -> Option<KindMismatch> {
        self.mismatch
    }
}
