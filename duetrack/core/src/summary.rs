use chrono::NaiveDateTime;

use crate::bucket::StateCounts;
use crate::classify::{DeadlineState, classify_against};
use crate::task::Task;

/// Overall totals per deadline state for a set of tasks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Summary {
    pub completed_on_time: u32,
    pub completed_late: u32,
    pub missed: u32,
    pub pending: u32,
    pub total_completed: u32,
    pub total_uncompleted: u32,
}

impl From<StateCounts> for Summary {
    fn from(counts: StateCounts) -> Self {
        let (total_completed, total_uncompleted) = DeadlineState::ALL.iter().fold(
            (0, 0),
            |(completed, uncompleted), state| {
                if state.is_completed() {
                    (completed + counts.get(*state), uncompleted)
                } else {
                    (completed, uncompleted + counts.get(*state))
                }
            },
        );
        Summary {
            completed_on_time: counts.completed_on_time,
            completed_late: counts.completed_late,
            missed: counts.missed,
            pending: counts.pending,
            total_completed,
            total_uncompleted,
        }
    }
}

/// Counts every task by deadline state, undated ones included.
///
/// Unlike [`crate::classify`], undated tasks are accepted: an open undated task
/// is pending, and a completed one is late since there is no deadline it can
/// be shown to have met.
pub fn summarize(tasks: &[Task], now: NaiveDateTime) -> Summary {
    let mut counts = StateCounts::default();
    for task in tasks {
        counts.increment(summary_state(task, now));
    }
    Summary::from(counts)
}

fn summary_state(task: &Task, now: NaiveDateTime) -> DeadlineState {
    match task.due_date {
        Some(due_date) => classify_against(task, due_date, now),
        None if task.completed => DeadlineState::CompletedLate,
        None => DeadlineState::Pending,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::TaskType;
    use chrono::NaiveDate;

    fn at(day: u32, hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 6, day)
            .unwrap()
            .and_hms_opt(hour, 0, 0)
            .unwrap()
    }

    fn task(id: i32, due_date: Option<NaiveDateTime>) -> Task {
        Task::new(id, 1, "t", TaskType::Daily, due_date)
    }

    #[test]
    fn can_summarize_empty_set() {
        assert_eq!(summarize(&[], at(1, 0)), Summary::default());
    }

    #[test]
    fn can_summarize_mixed_tasks() {
        let now = at(15, 0);
        let mut on_time = task(1, Some(at(10, 12)));
        on_time.complete(at(10, 12));
        let mut late = task(2, Some(at(10, 12)));
        late.complete(at(11, 0));
        let missed = task(3, Some(at(1, 0)));
        let pending = task(4, Some(at(20, 0)));

        let summary = summarize(&[on_time, late, missed, pending], now);

        assert_eq!(
            summary,
            Summary {
                completed_on_time: 1,
                completed_late: 1,
                missed: 1,
                pending: 1,
                total_completed: 2,
                total_uncompleted: 2,
            }
        );
    }

    #[test]
    fn can_count_undated_tasks() {
        let now = at(15, 0);
        let open = task(1, None);
        let mut done = task(2, None);
        done.complete(at(14, 0));
        let mut done_without_time = task(3, None);
        done_without_time.completed = true;

        let summary = summarize(&[open, done, done_without_time], now);

        assert_eq!(summary.pending, 1);
        assert_eq!(summary.completed_on_time, 0);
        assert_eq!(summary.completed_late, 2);
        assert_eq!(summary.missed, 0);
        assert_eq!(summary.total_completed, 2);
    }

    #[test]
    fn can_count_undated_task_completed_now_as_late() {
        let now = at(15, 0);
        let mut done = task(1, None);
        done.complete(now);

        let summary = summarize(&[done], now);

        assert_eq!(summary.completed_late, 1);
        assert_eq!(summary.completed_on_time, 0);
    }

    #[test]
    fn can_keep_totals_consistent_with_task_count() {
        let now = at(15, 0);
        let mut tasks: Vec<Task> = (1..=9)
            .map(|id| task(id, (id % 3 != 0).then(|| at(id as u32 * 3, 0))))
            .collect();
        tasks[1].complete(at(1, 0));
        tasks[4].complete(at(30, 0));
        tasks[5].complete(at(2, 0));

        let summary = summarize(&tasks, now);

        assert_eq!(
            (summary.total_completed + summary.total_uncompleted) as usize,
            tasks.len()
        );
        assert_eq!(summary, summarize(&tasks, now));
    }
}
