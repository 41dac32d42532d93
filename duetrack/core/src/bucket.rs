use chrono::{NaiveDate, NaiveDateTime};

use crate::classify::{DeadlineState, classify_against};
use crate::task::Task;

/// Per-state task counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StateCounts {
    pub completed_on_time: u32,
    pub completed_late: u32,
    pub missed: u32,
    pub pending: u32,
}

impl StateCounts {
    /// Counter for a single state.
    pub fn get(&self, state: DeadlineState) -> u32 {
        match state {
            DeadlineState::CompletedOnTime => self.completed_on_time,
            DeadlineState::CompletedLate => self.completed_late,
            DeadlineState::Missed => self.missed,
            DeadlineState::Pending => self.pending,
        }
    }

    pub fn increment(&mut self, state: DeadlineState) {
        let counter = match state {
            DeadlineState::CompletedOnTime => &mut self.completed_on_time,
            DeadlineState::CompletedLate => &mut self.completed_late,
            DeadlineState::Missed => &mut self.missed,
            DeadlineState::Pending => &mut self.pending,
        };
        *counter += 1;
    }

    pub fn total(&self) -> u32 {
        self.completed_on_time + self.completed_late + self.missed + self.pending
    }
}

/// Aggregated counts for one calendar day.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DayBucket {
    pub day: NaiveDate,
    pub counts: StateCounts,
}

/// Buckets dated tasks by the calendar day of their due date.
///
/// Produces exactly one bucket per day in `[start, end]`, ascending, including
/// days without tasks. Undated tasks and tasks due outside the range are
/// ignored. An inverted range yields no buckets.
pub fn bucketize(
    tasks: &[Task],
    start: NaiveDate,
    end: NaiveDate,
    now: NaiveDateTime,
) -> Vec<DayBucket> {
    let mut buckets: Vec<DayBucket> = start
        .iter_days()
        .take_while(|day| *day <= end)
        .map(|day| DayBucket {
            day,
            counts: StateCounts::default(),
        })
        .collect();

    for task in tasks {
        let Some(due_date) = task.due_date else {
            continue;
        };
        let day = due_date.date();
        if day < start || day > end {
            continue;
        }
        let offset = (day - start).num_days() as usize;
        if let Some(bucket) = buckets.get_mut(offset) {
            bucket.counts.increment(classify_against(task, due_date, now));
        }
    }

    buckets
}
