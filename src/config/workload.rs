//! Workload definition enums

use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of IO each worker issues
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum OperationKind {
    #[default]
    Read,
    Write,
}

/// Access pattern type
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum AccessPattern {
    #[default]
    Sequential,
    Random,
}

/// How writes reach the device
///
/// `Synchronous` opens the target with O_SYNC, `Direct` with O_DIRECT, and
/// `SynchronousDirect` with both.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum Durability {
    #[default]
    Buffered,
    Synchronous,
    Direct,
    SynchronousDirect,
}

impl Durability {
    /// Whether the target is opened with O_SYNC
    pub fn is_sync(self) -> bool {
        matches!(self, Self::Synchronous | Self::SynchronousDirect)
    }

    /// Whether the target is opened with O_DIRECT
    pub fn is_direct(self) -> bool {
        matches!(self, Self::Direct | Self::SynchronousDirect)
    }
}

/// Format of the report lines written to stdout
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OperationKind::Read => write!(f, "read"),
            OperationKind::Write => write!(f, "write"),
        }
    }
}

impl fmt::Display for AccessPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AccessPattern::Sequential => write!(f, "sequential"),
            AccessPattern::Random => write!(f, "random"),
        }
    }
}

impl fmt::Display for Durability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Durability::Buffered => write!(f, "buffered"),
            Durability::Synchronous => write!(f, "sync"),
            Durability::Direct => write!(f, "direct"),
            Durability::SynchronousDirect => write!(f, "sync+direct"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_durability_flags() {
        assert!(!Durability::Buffered.is_sync());
        assert!(!Durability::Buffered.is_direct());
        assert!(Durability::Synchronous.is_sync());
        assert!(!Durability::Synchronous.is_direct());
        assert!(!Durability::Direct.is_sync());
        assert!(Durability::Direct.is_direct());
        assert!(Durability::SynchronousDirect.is_sync());
        assert!(Durability::SynchronousDirect.is_direct());
    }

    #[test]
    fn test_display() {
        assert_eq!(OperationKind::Write.to_string(), "write");
        assert_eq!(AccessPattern::Random.to_string(), "random");
        assert_eq!(Durability::SynchronousDirect.to_string(), "sync+direct");
    }
}
