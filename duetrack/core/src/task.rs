use chrono::NaiveDateTime;
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// Identifier of a stored task.
pub type TaskId = i32;

/// Identifier of the user owning a task.
pub type UserId = i32;

/// Kind of a task. Only affects how task lists are ordered and filtered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TaskType {
    #[default]
    Daily,
    Important,
    Other,
}

impl TaskType {
    /// Stored/textual form of the type.
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskType::Daily => "daily",
            TaskType::Important => "important",
            TaskType::Other => "other",
        }
    }

    /// Position of the type in the combined task list. Lower comes first.
    pub fn sort_rank(&self) -> u8 {
        match self {
            TaskType::Important => 0,
            TaskType::Daily => 1,
            TaskType::Other => 2,
        }
    }
}

impl fmt::Display for TaskType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for TaskType {
    /// Unknown values fall back to `Other`.
    fn from(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "daily" => TaskType::Daily,
            "important" => TaskType::Important,
            _ => TaskType::Other,
        }
    }
}

impl FromStr for TaskType {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(TaskType::from(s))
    }
}

/// A task as seen by the analytics core: a plain, detached value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Task {
    pub id: TaskId,
    pub owner_id: UserId,
    pub title: String,
    pub description: Option<String>,
    pub task_type: TaskType,
    pub completed: bool,
    pub completed_at: Option<NaiveDateTime>,
    pub due_date: Option<NaiveDateTime>,
}

impl Task {
    /// Creates a new, incomplete task.
    pub fn new(
        id: TaskId,
        owner_id: UserId,
        title: impl Into<String>,
        task_type: TaskType,
        due_date: Option<NaiveDateTime>,
    ) -> Self {
        Task {
            id,
            owner_id,
            title: title.into(),
            description: None,
            task_type,
            completed: false,
            completed_at: None,
            due_date,
        }
    }

    /// Marks the task as completed at `at`.
    pub fn complete(&mut self, at: NaiveDateTime) {
        self.completed = true;
        self.completed_at = Some(at);
    }

    /// Marks the task as not completed, clearing the completion time.
    pub fn uncomplete(&mut self) {
        self.completed = false;
        self.completed_at = None;
    }
}

/// Ordering used for task lists: open tasks first, then by type rank, then by
/// due date with undated tasks last, then by id.
pub fn listing_order(a: &Task, b: &Task) -> Ordering {
    a.completed
        .cmp(&b.completed)
        .then_with(|| a.task_type.sort_rank().cmp(&b.task_type.sort_rank()))
        .then_with(|| match (a.due_date, b.due_date) {
            (Some(left), Some(right)) => left.cmp(&right),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        })
        .then_with(|| a.id.cmp(&b.id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(day: u32, hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 6, day)
            .unwrap()
            .and_hms_opt(hour, 0, 0)
            .unwrap()
    }

    #[test]
    fn can_parse_task_types() {
        assert_eq!(TaskType::from("daily"), TaskType::Daily);
        assert_eq!(TaskType::from("Important"), TaskType::Important);
        assert_eq!(TaskType::from("weekly"), TaskType::Other);
        assert_eq!("".parse::<TaskType>().unwrap(), TaskType::Other);
    }

    #[test]
    fn can_toggle_completion() {
        let mut task = Task::new(1, 1, "Write report", TaskType::Daily, Some(at(10, 12)));

        task.complete(at(10, 9));
        assert!(task.completed);
        assert_eq!(task.completed_at, Some(at(10, 9)));

        task.uncomplete();
        assert!(!task.completed);
        assert_eq!(task.completed_at, None);
    }

    #[test]
    fn can_order_tasks_for_listing() {
        let undated_important = Task::new(1, 1, "a", TaskType::Important, None);
        let late_important = Task::new(2, 1, "b", TaskType::Important, Some(at(12, 0)));
        let early_important = Task::new(3, 1, "c", TaskType::Important, Some(at(11, 0)));
        let daily = Task::new(4, 1, "d", TaskType::Daily, Some(at(1, 0)));
        let other = Task::new(5, 1, "e", TaskType::Other, Some(at(1, 0)));
        let mut done = Task::new(6, 1, "f", TaskType::Important, Some(at(1, 0)));
        done.complete(at(1, 0));

        let mut tasks = vec![
            done.clone(),
            other.clone(),
            undated_important.clone(),
            daily.clone(),
            late_important.clone(),
            early_important.clone(),
        ];
        tasks.sort_by(listing_order);

        let ids: Vec<TaskId> = tasks.iter().map(|task| task.id).collect();
        assert_eq!(ids, vec![3, 2, 1, 4, 5, 6]);
    }
}
