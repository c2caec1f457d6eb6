//! Qualified group names.
//!
//! A qualified name is the whitespace-separated path that addresses a group,
//! ancestors first: `"server settings"` is the `settings` group nested inside
//! the top-level `server` group.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::SubcommandError;

/// Ordered, non-empty path of group names.
///
/// Segments are compared verbatim (case-sensitive), matching host naming.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QualifiedName {
    segments: Vec<String>,
}

impl QualifiedName {
    /// Split `text` on whitespace and drop empty segments.
    ///
    /// Fails with [`SubcommandError::InvalidTarget`] when nothing is left.
    pub fn parse(text: &str) -> Result<Self, SubcommandError> {
        let segments: Vec<String> = text.split_whitespace().map(str::to_string).collect();
        if segments.is_empty() {
            return Err(SubcommandError::InvalidTarget {
                text: text.to_string(),
            });
        }
        Ok(Self { segments })
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Append a nested segment. Blank segments are ignored.
    pub fn child(&self, segment: &str) -> QualifiedName {
        let mut segments = self.segments.clone();
        segments.extend(segment.split_whitespace().map(str::to_string));
        Self { segments }
    }
}

impl fmt::Display for QualifiedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.segments.join(" "))
    }
}

impl FromStr for QualifiedName {
    type Err = SubcommandError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for QualifiedName {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for QualifiedName {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(serde::de::Error::custom)
    }
}
