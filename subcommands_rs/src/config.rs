//! Manager configuration.
//!
//! Two switches, both off by default. They can be set in code or loaded from
//! a TOML or JSON file:
//!
//! ```toml
//! copy_group_error_handler = true
//! check_group_type = false
//! ```

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Attach-time behaviour of a [`SubcommandManager`](crate::SubcommandManager).
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ManagerConfig {
    /// Copy the group's error handler onto subcommands that have none.
    pub copy_group_error_handler: bool,
    /// Report subcommands whose kind the target group cannot hold, instead of
    /// silently leaving them pending.
    pub check_group_type: bool,
}

impl ManagerConfig {
    pub fn with_copy_group_error_handler(mut self, enabled: bool) -> Self {
        self.copy_group_error_handler = enabled;
        self
    }

    pub fn with_check_group_type(mut self, enabled: bool) -> Self {
        self.check_group_type = enabled;
        self
    }

    /// Load from a `.toml` or `.json` file (format picked by extension).
    /// A missing file yields the defaults.
    pub fn load_from_path(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let data = fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;

        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_ascii_lowercase();

        let cfg = match ext.as_str() {
            "json" => serde_json::from_str(&data)
                .with_context(|| format!("failed to parse json config {}", path.display()))?,
            _ => toml::from_str(&data)
                .with_context(|| format!("failed to parse toml config {}", path.display()))?,
        };
        Ok(cfg)
    }
}
