//! # subcommands
//!
//! Late binding of subcommands to command groups.
//!
//! A bot (or any command-driven application) declares its command groups in
//! one module and lets other modules contribute children to them without a
//! reference to the group object: a subcommand names its parent only by a
//! qualified path such as `"user utils"`. The [`SubcommandManager`] keeps
//! those declarations, attaches each one as soon as its group exists in the
//! host, and detaches it again when the declaring owner is unloaded.
//!
//! ## Features
//!
//! - **Order independent**: owners can load in any order; pending
//!   subcommands are retried whenever a group appears
//! - **Nested paths**: `"server settings"` resolves through nested groups,
//!   including groups that were themselves attached late
//! - **Owner teardown**: unloading an owner detaches what it contributed
//! - **Opt-in policy**: copy group error handlers, check group/command kinds
//! - **On-demand diagnostics**: [`SubcommandManager::raise_for_remaining_commands`]
//!   lists everything still unattached, with "did you mean" hints
//!
//! ## Usage
//!
//! ```rust
//! use subcommands::memory::MemoryHost;
//! use subcommands::{CommandKind, ManagerConfig, SubcommandManager};
//!
//! let mut manager = SubcommandManager::new(MemoryHost::new(), ManagerConfig::default());
//!
//! // A module declares a subcommand before its group exists.
//! let ban = manager.host_mut().add_command("Moderation", "ban", CommandKind::Prefix);
//! manager.register(ban, "admin", "Moderation".to_string()).unwrap();
//!
//! // Another module registers the group later.
//! let admin = manager.host_mut().add_group("Admin", "admin", CommandKind::Prefix);
//! manager.process_events().unwrap();
//!
//! assert_eq!(manager.host().child_names(admin), vec!["ban"]);
//! manager.raise_for_remaining_commands().unwrap();
//! ```

pub mod config;
pub mod error;
pub mod host;
pub mod kind;
pub mod manager;
pub mod memory;
pub mod name;
pub mod policy;
pub mod record;
pub mod resolver;

pub use config::ManagerConfig;
pub use error::{HostError, KindMismatch, SubcommandError, UnresolvedSubcommand};
pub use host::{CommandHost, GroupTree, HostEvent};
pub use kind::CommandKind;
pub use manager::{Record, SubcommandManager};
pub use name::QualifiedName;
pub use record::{Declaration, DeclarationQueue, RecordState, SubcommandRecord, subcommand};
