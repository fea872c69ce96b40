//! Points ledger rules for task status transitions.
//!
//! The ledger is a stateless rule set: given the previously stored
//! status and the new one, it yields at most one balance change.
//! Edge-triggered — re-saving the same status yields nothing. The
//! caller applies the change in the same transaction as the status
//! write.

use crate::models::task::TaskStatus;

/// Fixed penalty debited when a task goes overdue.
pub const OVERDUE_PENALTY: i64 = 5;

/// A single balance change produced by a status transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LedgerEntry {
    /// Add the task's points value to the assignee's balance.
    Credit(i64),
    /// Subtract a penalty from the assignee's balance, floored at zero.
    Debit(i64),
}

impl LedgerEntry {
    /// Signed delta to apply to the balance; the floor at zero is the
    /// persistence layer's job.
    #[must_use]
    pub fn signed_delta(self) -> i64 {
        match self {
            Self::Credit(points) => points,
            Self::Debit(points) => -points,
        }
    }
}

/// Compute the ledger effect of a status change, if any.
///
/// - into `Completed` from any other state: credit of `task_points`;
/// - into `Overdue` from any other state: debit of [`OVERDUE_PENALTY`];
/// - everything else, including `previous == next`: no effect.
#[must_use]
pub fn status_change_entry(
    previous: TaskStatus,
    next: TaskStatus,
    task_points: i64,
) -> Option<LedgerEntry> {
    if previous == next {
        return None;
    }
    match next {
        TaskStatus::Completed => Some(LedgerEntry::Credit(task_points)),
        TaskStatus::Overdue => Some(LedgerEntry::Debit(OVERDUE_PENALTY)),
        TaskStatus::Pending | TaskStatus::InProgress => None,
    }
}
