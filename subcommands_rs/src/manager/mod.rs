//! Binding manager: keeps every declared subcommand, attaches it once its
//! group shows up in the host and detaches it again when its owner goes away.
//!
//! Records are kept in declaration order so that resolution (and therefore
//! every diagnostic) is reproducible.

use std::mem;

use tracing::{debug, info, warn};

use crate::config::ManagerConfig;
use crate::error::{KindMismatch, SubcommandError, UnresolvedSubcommand};
use crate::host::{CommandHost, GroupTree, HostEvent};
use crate::policy;
use crate::record::{Declaration, DeclarationQueue, RecordState, SubcommandRecord, subcommand};
use crate::resolver;


/// Record type used by a manager over host `H`.
pub type Record<H> = SubcommandRecord<
    <H as CommandHost>::Command,
    <H as GroupTree>::Group,
    <H as CommandHost>::Owner,
>;

/// Attaches subcommands declared anywhere to groups declared anywhere else.
///
/// The manager owns the host handle it was given (pass `&mut host` to keep
/// ownership on the caller side). All work happens synchronously inside the
/// calling method; there is no background retry.
pub struct SubcommandManager<H: CommandHost> {
    host: H,
    config: ManagerConfig,
    records: Vec<Record<H>>,
    listening: bool,
}

impl<H: CommandHost> SubcommandManager<H> {
    /// Subscribe to host events and start with no declarations.
    pub fn new(host: H, config: ManagerConfig) -> Self {
        Self::with_declarations(host, config, DeclarationQueue::new())
    }

    /// Subscribe to host events and immediately resolve declarations that
    /// were collected before the manager existed.
    ///
    /// Declarations that cannot be recorded (duplicates, commands that already
    /// have a parent) are skipped with a warning; records that fail to attach
    /// stay pending and show up in [`Self::raise_for_remaining_commands`].
    pub fn with_declarations(
        mut host: H,
        config: ManagerConfig,
        declarations: DeclarationQueue<H::Command, H::Owner>,
    ) -> Self {
        host.subscribe();
        info!(
            copy_group_error_handler = config.copy_group_error_handler,
            check_group_type = config.check_group_type,
            "subcommand manager initialized"
        );

        let mut manager = Self {
            host,
            config,
            records: Vec::new(),
            listening: true,
        };
        for (owner, declaration) in declarations {
            if let Err(err) = manager.push_record(owner, declaration) {
                warn!("skipping queued subcommand: {}", err);
            }
        }
        // Nothing at construction time belongs to a caller: log every failure.
        for (index, err) in manager.resolve_pass() {
            manager.log_failure(index, &err);
        }
        manager
    }

    pub fn config(&self) -> &ManagerConfig {
        &self.config
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    /// All records, pending and attached. Declaration order, except that a
    /// record renewed after its group went away moves to the end.
    pub fn records(&self) -> &[Record<H>] {
        &self.records
    }

    pub fn record(&self, command: &H::Command) -> Option<&Record<H>> {
        self.records.iter().find(|record| record.command == *command)
    }

    pub fn pending_count(&self) -> usize {
        self.records.iter().filter(|r| !r.is_attached()).count()
    }

    pub fn attached_count(&self) -> usize {
        self.records.iter().filter(|r| r.is_attached()).count()
    }

    /// `false` once [`Self::remove`] has run.
    pub fn is_listening(&self) -> bool {
        self.listening
    }

    /// Declare `command` as a subcommand of the group at `target` on behalf
    /// of `owner`, and attach it right away if the group already exists.
    ///
    /// Returns the command unchanged. A target that does not exist yet is not
    /// an error: the record stays pending until a later retry finds it.
    pub fn register(
        &mut self,
        command: H::Command,
        target: &str,
        owner: H::Owner,
    ) -> Result<H::Command, SubcommandError> {
        let declaration = subcommand(target, command)?;
        let command = declaration.command.clone();
        self.declare(owner, declaration)?;
        Ok(command)
    }

    /// Record an already-parsed declaration and try to resolve it.
    pub fn declare(
        &mut self,
        owner: H::Owner,
        declaration: Declaration<H::Command>,
    ) -> Result<(), SubcommandError> {
        self.renew_stale();
        let index = self.push_record(owner, declaration)?;
        let failures = self.resolve_pass();
        self.settle(failures, &[index])
    }

    /// Record every declaration of a freshly loaded owner, then resolve once.
    ///
    /// Nothing is recorded if any declaration is rejected.
    pub fn load_owner<I>(&mut self, owner: H::Owner, declarations: I) -> Result<(), SubcommandError>
    where
        I: IntoIterator<Item = Declaration<H::Command>>,
    {
        let declarations: Vec<Declaration<H::Command>> = declarations.into_iter().collect();
        for (position, declaration) in declarations.iter().enumerate() {
            self.check_declaration(&declaration.command)?;
            let repeated = declarations[..position]
                .iter()
                .any(|earlier| earlier.command == declaration.command);
            if repeated {
                return Err(SubcommandError::DuplicateSubcommand {
                    command: self.host.command_name(&declaration.command),
                    target: declaration.target.to_string(),
                });
            }
        }

        self.renew_stale();
        let first = self.records.len();
        for declaration in declarations {
            self.records
                .push(SubcommandRecord::new(owner.clone(), declaration));
        }
        let own: Vec<usize> = (first..self.records.len()).collect();
        debug!(owner = %owner, declared = own.len(), "owner loaded");

        let failures = self.resolve_pass();
        self.settle(failures, &own)
    }

    /// Retry every pending record against the host's current groups.
    ///
    /// Returns how many records got attached. Failures (kind mismatches, host
    /// refusals) leave their records pending; the first one is returned after
    /// the whole pass has run.
    pub fn resolve_pending(&mut self) -> Result<usize, SubcommandError> {
        self.renew_stale();
        let before = self.attached_count();
        let failures = self.resolve_pass();
        let attached = self.attached_count() - before;
        let mut first = None;
        for (index, err) in failures {
            self.log_failure(index, &err);
            first.get_or_insert(err);
        }
        match first {
            Some(err) => Err(err),
            None => Ok(attached),
        }
    }

    /// Host notification: a group became available.
    pub fn on_group_registered(&mut self) -> Result<usize, SubcommandError> {
        if !self.listening {
            return Ok(0);
        }
        self.resolve_pending()
    }

    /// Host notification: `owner` is being unloaded.
    ///
    /// Attached subcommands of the owner are detached from their groups; its
    /// pending records are dropped without touching the host.
    pub fn on_owner_removed(&mut self, owner: &H::Owner) {
        if !self.listening {
            return;
        }
        let mut detached = 0usize;
        let mut discarded = 0usize;
        for index in 0..self.records.len() {
            if self.records[index].owner != *owner {
                continue;
            }
            if self.detach(index) {
                detached += 1;
            } else {
                discarded += 1;
            }
        }
        self.records.retain(|record| record.owner != *owner);
        let renewed = self.renew_stale();
        info!(owner = %owner, detached, discarded, renewed, "owner removed");
    }

    /// Dispatch one host event.
    pub fn handle_event(&mut self, event: HostEvent<H::Owner>) -> Result<(), SubcommandError> {
        match event {
            HostEvent::GroupRegistered => self.on_group_registered().map(|_| ()),
            HostEvent::OwnerRemoved(owner) => {
                self.on_owner_removed(&owner);
                Ok(())
            }
        }
    }

    /// Drain the host's event queue and handle every event in order.
    pub fn process_events(&mut self) -> Result<(), SubcommandError> {
        if !self.listening {
            return Ok(());
        }
        let mut first = None;
        for event in self.host.poll_events() {
            if let Err(err) = self.handle_event(event) {
                first.get_or_insert(err);
            }
        }
        match first {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    /// Detach every attached subcommand, forget every record and stop
    /// listening to the host. Calling it again does nothing.
    ///
    /// A removed manager still accepts [`Self::register`], but the new records
    /// are never attached.
    pub fn remove(&mut self) {
        if !self.listening {
            return;
        }
        let mut detached = 0usize;
        for index in 0..self.records.len() {
            if self.detach(index) {
                detached += 1;
            }
        }
        let dropped = self.records.len();
        self.records.clear();
        self.host.unsubscribe();
        self.listening = false;
        info!(detached, dropped, "subcommand manager removed");
    }

    /// Fail with [`SubcommandError::Unresolved`] if any record is still pending.
    ///
    /// Meant for startup validation once every owner should be loaded. Does not
    /// change any state.
    pub fn raise_for_remaining_commands(&self) -> Result<(), SubcommandError> {
        let pending: Vec<&Record<H>> = self
            .records
            .iter()
            .filter(|r| !r.is_attached() || self.is_stale(r))
            .collect();
        if pending.is_empty() {
            return Ok(());
        }

        let groups = resolver::qualified_groups(&self.host);
        let entries = pending
            .into_iter()
            .map(|record| {
                let kind = self.host.command_kind(&record.command);
                let suggestion = if record.mismatch.is_none() {
                    let candidates = groups
                        .iter()
                        .filter(|(_, group)| policy::accepts(self.host.group_kind(group), kind))
                        .map(|(path, _)| path);
                    resolver::suggest(&record.target, candidates)
                } else {
                    None
                };
                UnresolvedSubcommand {
                    command: self.host.command_name(&record.command),
                    kind,
                    is_group: self.host.is_group(&record.command),
                    target: record.target.clone(),
                    owner: record.owner.to_string(),
                    mismatch: record.mismatch,
                    suggestion,
                }
            })
            .collect();
        Err(SubcommandError::Unresolved(entries))
    }

    fn check_declaration(&self, command: &H::Command) -> Result<(), SubcommandError> {
        if let Some(existing) = self.record(command) {
            return Err(SubcommandError::DuplicateSubcommand {
                command: self.host.command_name(command),
                target: existing.target.to_string(),
            });
        }
        if self.host.has_parent(command) {
            return Err(SubcommandError::AlreadySubcommand {
                command: self.host.command_name(command),
            });
        }
        Ok(())
    }

    fn push_record(
        &mut self,
        owner: H::Owner,
        declaration: Declaration<H::Command>,
    ) -> Result<usize, SubcommandError> {
        self.check_declaration(&declaration.command)?;
        debug!(
            command = %self.host.command_name(&declaration.command),
            target = %declaration.target,
            owner = %owner,
            "subcommand declared"
        );
        self.records.push(SubcommandRecord::new(owner, declaration));
        Ok(self.records.len() - 1)
    }

    /// Attach whatever can be attached, repeating until a pass makes no
    /// progress: attaching a nested group can make deeper paths resolvable.
    ///
    /// Returns the last failure per record index. Inert once removed.
    fn resolve_pass(&mut self) -> Vec<(usize, SubcommandError)> {
        let mut failures: Vec<(usize, SubcommandError)> = Vec::new();
        if !self.listening {
            return failures;
        }
        loop {
            let pending: Vec<usize> = (0..self.records.len())
                .filter(|&index| !self.records[index].is_attached())
                .collect();
            let mut progressed = false;
            for index in pending {
                failures.retain(|(failed, _)| *failed != index);
                match self.try_attach(index) {
                    Ok(true) => progressed = true,
                    Ok(false) => {}
                    Err(err) => failures.push((index, err)),
                }
            }
            if !progressed {
                break;
            }
        }
        failures
    }

    /// `Ok(false)` when the target is simply not there (yet).
    fn try_attach(&mut self, index: usize) -> Result<bool, SubcommandError> {
        let command = self.records[index].command.clone();
        let target = self.records[index].target.clone();
        let command_kind = self.host.command_kind(&command);

        let host = &self.host;
        let compatible = resolver::resolve_where(host, &target, |group| {
            policy::accepts(host.group_kind(group), command_kind)
        });

        let Some(group) = compatible else {
            let mismatch = if policy::reports_kind_mismatch(&self.config) {
                resolver::resolve(&self.host, &target).map(|group| KindMismatch {
                    group_kind: self.host.group_kind(&group),
                    command_kind,
                })
            } else {
                None
            };
            self.records[index].mismatch = mismatch;
            return match mismatch {
                Some(mismatch) => Err(SubcommandError::TypeMismatch {
                    command: self.host.command_name(&command),
                    command_kind,
                    group: target.to_string(),
                    group_kind: mismatch.group_kind,
                }),
                None => Ok(false),
            };
        };

        self.attach(index, group)?;
        Ok(true)
    }

    fn attach(&mut self, index: usize, group: H::Group) -> Result<(), SubcommandError> {
        let command = self.records[index].command.clone();
        if self.host.has_parent(&command) {
            return Err(SubcommandError::AlreadySubcommand {
                command: self.host.command_name(&command),
            });
        }

        self.host.add_child(&group, &command)?;
        self.host.remove_top_level(&command);

        let handler = if self.config.copy_group_error_handler {
            self.host.group_error_handler(&group)
        } else {
            None
        };
        let copy = policy::should_copy_error_handler(
            &self.config,
            handler.is_some(),
            self.host.has_error_handler(&command),
        );
        if let (true, Some(handler)) = (copy, handler) {
            self.host.set_error_handler(&command, handler);
        }

        let record = &mut self.records[index];
        debug!(
            command = %self.host.command_name(&command),
            target = %record.target,
            owner = %record.owner,
            copied_error_handler = copy,
            "subcommand attached"
        );
        record.state = RecordState::Attached(group);
        record.mismatch = None;
        Ok(())
    }

    /// Whether `record` is attached to a group that can no longer be reached
    /// at its target path.
    fn is_stale(&self, record: &Record<H>) -> bool {
        match &record.state {
            RecordState::Attached(group) => {
                resolver::resolve_where(&self.host, &record.target, |found| found == group)
                    .is_none()
            }
            RecordState::Pending => false,
        }
    }

    /// Replace every stale record with a fresh pending one for the same
    /// command and owner, releasing the command from the dead group first.
    ///
    /// Returns how many records were renewed. Inert once removed.
    fn renew_stale(&mut self) -> usize {
        if !self.listening {
            return 0;
        }
        let mut renewed = 0usize;
        let mut index = 0;
        while index < self.records.len() {
            if !self.is_stale(&self.records[index]) {
                index += 1;
                continue;
            }
            let SubcommandRecord {
                command,
                target,
                owner,
                state,
                ..
            } = self.records.remove(index);
            if let RecordState::Attached(group) = state {
                if let Err(err) = self.host.remove_child(&group, &command) {
                    debug!(
                        command = %self.host.command_name(&command),
                        target = %target,
                        "stale group kept its child: {}",
                        err
                    );
                }
            }
            info!(
                command = %self.host.command_name(&command),
                target = %target,
                owner = %owner,
                "subcommand group went away, waiting for it again"
            );
            self.records
                .push(SubcommandRecord::new(owner, Declaration { command, target }));
            renewed += 1;
        }
        renewed
    }

    /// Returns whether the record was attached. Host failures are logged.
    fn detach(&mut self, index: usize) -> bool {
        let record = &mut self.records[index];
        let RecordState::Attached(group) = mem::replace(&mut record.state, RecordState::Pending)
        else {
            return false;
        };
        let name = self.host.command_name(&record.command);
        match self.host.remove_child(&group, &record.command) {
            Ok(()) => debug!(command = %name, target = %record.target, "subcommand detached"),
            Err(err) => warn!(
                command = %name,
                target = %record.target,
                "failed to detach subcommand: {}",
                err
            ),
        }
        true
    }

    /// Return the first failure that concerns one of `own`; log the rest.
    fn settle(
        &self,
        failures: Vec<(usize, SubcommandError)>,
        own: &[usize],
    ) -> Result<(), SubcommandError> {
        let mut result = Ok(());
        for (index, err) in failures {
            if own.contains(&index) && result.is_ok() {
                result = Err(err);
                continue;
            }
            self.log_failure(index, &err);
        }
        result
    }

    fn log_failure(&self, index: usize, err: &SubcommandError) {
        let record = &self.records[index];
        warn!(
            command = %self.host.command_name(&record.command),
            target = %record.target,
            owner = %record.owner,
            "subcommand left pending: {}",
            err
        );
    }
}
