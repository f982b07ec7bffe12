//! Record lifecycle shared by every CRUD entity.
//!
//! A record is `active` or `archived`. Purging physically deletes the row and
//! is only allowed while nothing depends on it.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Stored lifecycle status of a record.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordStatus {
    /// Visible in default listings and usable by operations.
    #[default]
    Active,
    /// Hidden from default listings; can be restored.
    Archived,
}

impl RecordStatus {
    /// Returns the lowercase name of the status.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Archived => "archived",
        }
    }
}

/// Lifecycle operation requested on a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleAction {
    /// active -> archived
    Archive,
    /// archived -> active
    Restore,
    /// any -> deleted
    Purge,
}

impl std::fmt::Display for LifecycleAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Archive => write!(f, "archive"),
            Self::Restore => write!(f, "restore"),
            Self::Purge => write!(f, "purge"),
        }
    }
}

/// Errors returned by lifecycle transitions.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LifecycleError {
    /// The record is not in a state the action applies to.
    #[error("Cannot {action} a record that is {}", .from.as_str())]
    InvalidTransition {
        /// Current status.
        from: RecordStatus,
        /// Requested action.
        action: LifecycleAction,
    },

    /// Other records still reference this one.
    #[error("Cannot purge: {0} dependent record(s) still reference it")]
    HasDependents(u64),
}

/// Moves an active record to archived.
///
/// # Errors
///
/// Returns `InvalidTransition` if the record is already archived.
pub const fn archive(status: RecordStatus) -> Result<RecordStatus, LifecycleError> {
    match status {
        RecordStatus::Active => Ok(RecordStatus::Archived),
        RecordStatus::Archived => Err(LifecycleError::InvalidTransition {
            from: status,
            action: LifecycleAction::Archive,
        }),
    }
}

/// Moves an archived record back to active.
///
/// # Errors
///
/// Returns `InvalidTransition` if the record is not archived.
pub const fn restore(status: RecordStatus) -> Result<RecordStatus, LifecycleError> {
    match status {
        RecordStatus::Archived => Ok(RecordStatus::Active),
        RecordStatus::Active => Err(LifecycleError::InvalidTransition {
            from: status,
            action: LifecycleAction::Restore,
        }),
    }
}

/// Checks that a record may be physically deleted.
///
/// # Errors
///
/// Returns `HasDependents` when `dependents` is non-zero.
pub const fn purge(dependents: u64) -> Result<(), LifecycleError> {
    if dependents > 0 {
        return Err(LifecycleError::HasDependents(dependents));
    }
    Ok(())
}
