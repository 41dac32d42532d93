use chrono::NaiveDateTime;
use thiserror::Error;

use crate::task::{Task, TaskId};

/// Where a dated task stands relative to its deadline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeadlineState {
    CompletedOnTime,
    CompletedLate,
    Missed,
    Pending,
}

impl DeadlineState {
    /// Every state, in the order charts present them.
    pub const ALL: [DeadlineState; 4] = [
        DeadlineState::CompletedOnTime,
        DeadlineState::CompletedLate,
        DeadlineState::Missed,
        DeadlineState::Pending,
    ];

    /// Whether the state describes a completed task.
    pub fn is_completed(&self) -> bool {
        matches!(
            self,
            DeadlineState::CompletedOnTime | DeadlineState::CompletedLate
        )
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ClassifyError {
    #[error("Task {0} has no due date and cannot be classified")]
    MissingDueDate(TaskId),
}

/// Classifies a task against its due date.
///
/// Completion exactly at the due date counts as on time. A task that claims to
/// be completed but has no completion time is treated as late.
///
/// Returns [`ClassifyError::MissingDueDate`] for undated tasks; callers are
/// expected to filter those out first.
pub fn classify(task: &Task, now: NaiveDateTime) -> Result<DeadlineState, ClassifyError> {
    let due_date = task.due_date.ok_or(ClassifyError::MissingDueDate(task.id))?;
    Ok(classify_against(task, due_date, now))
}

pub(crate) fn classify_against(
    task: &Task,
    due_date: NaiveDateTime,
    now: NaiveDateTime,
) -> DeadlineState {
    if task.completed {
        match task.completed_at {
            Some(completed_at) if completed_at <= due_date => DeadlineState::CompletedOnTime,
            _ => DeadlineState::CompletedLate,
        }
    } else if due_date < now {
        DeadlineState::Missed
    } else {
        DeadlineState::Pending
    }
}
