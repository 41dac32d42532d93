use crate::entities::*;
use async_trait::async_trait;
use chrono::{Days, NaiveDate, NaiveDateTime, NaiveTime};
use duetrack_core::{Task, TaskId, TaskType, UserId, listing_order};
use sea_orm::*;

pub mod api;
pub mod web;

/// Length of the `tasks.title` column.
pub const MAX_TITLE_LEN: usize = 50;

/// Input for creating a task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTask {
    pub title: String,
    pub description: Option<String>,
    pub task_type: TaskType,
    pub due_date: Option<NaiveDateTime>,
}

/// Error type for TaskService operations.
#[derive(Debug, thiserror::Error)]
pub enum TaskServiceError {
    /// The task does not exist or belongs to another user.
    #[error("Task with ID {0} not found")]
    TaskNotFound(TaskId),
    #[error("Task title must not be empty")]
    EmptyTitle,
    #[error("Task title is longer than 50 characters")]
    TitleTooLong,
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),
}

impl From<task::Model> for Task {
    fn from(model: task::Model) -> Self {
        Task {
            id: model.id,
            owner_id: model.owner_id,
            title: model.title,
            description: model.description,
            task_type: TaskType::from(model.task_type.as_str()),
            completed: model.completed,
            completed_at: model.completed_at,
            due_date: model.due_date,
        }
    }
}

/// Read access to a user's tasks, as needed by analytics.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TaskStore: Send + Sync {
    /// All tasks owned by `owner_id`.
    async fn find_by_owner(&self, owner_id: UserId) -> Result<Vec<Task>, TaskServiceError>;

    /// Tasks owned by `owner_id` whose due date falls on a day in `[start, end]`.
    async fn find_by_owner_and_due_range(
        &self,
        owner_id: UserId,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<Task>, TaskServiceError>;
}

/// Owner-scoped task persistence over sea-orm.
pub struct TaskService<'a> {
    db: &'a sea_orm::DatabaseConnection,
}

impl TaskService<'_> {
    pub fn new(db: &sea_orm::DatabaseConnection) -> TaskService<'_> {
        TaskService { db }
    }

    /// Creates a new, incomplete task for `owner_id`.
    ///
    /// # Returns
    ///
    /// The created `Task`, `EmptyTitle` if the title is blank, or
    /// `TitleTooLong` if it does not fit the title column.
    #[tracing::instrument(skip(self))]
    pub async fn create_task(
        &self,
        owner_id: UserId,
        new_task: NewTask,
    ) -> Result<Task, TaskServiceError> {
        let title = new_task.title.trim();
        if title.is_empty() {
            return Err(TaskServiceError::EmptyTitle);
        }
        if title.chars().count() > MAX_TITLE_LEN {
            return Err(TaskServiceError::TitleTooLong);
        }
        let description = new_task
            .description
            .map(|text| text.trim().to_string())
            .filter(|text| !text.is_empty());

        let active_model = task::ActiveModel {
            owner_id: ActiveValue::Set(owner_id),
            title: ActiveValue::Set(title.to_string()),
            description: ActiveValue::Set(description),
            task_type: ActiveValue::Set(new_task.task_type.as_str().to_string()),
            completed: ActiveValue::Set(false),
            completed_at: ActiveValue::Set(None),
            due_date: ActiveValue::Set(new_task.due_date),
            ..Default::default()
        };
        let created_model = active_model.insert(self.db).await?;
        Ok(Task::from(created_model))
    }

    /// Lists the tasks of `owner_id`, optionally restricted to one type, in listing order.
    #[tracing::instrument(skip(self))]
    pub async fn list_tasks(
        &self,
        owner_id: UserId,
        task_type: Option<TaskType>,
    ) -> Result<Vec<Task>, TaskServiceError> {
        let mut query = task::Entity::find().filter(task::Column::OwnerId.eq(owner_id));
        if let Some(task_type) = task_type {
            query = query.filter(task::Column::TaskType.eq(task_type.as_str()));
        }
        let mut tasks: Vec<Task> = query
            .all(self.db)
            .await?
            .into_iter()
            .map(Task::from)
            .collect();
        tasks.sort_by(listing_order);
        Ok(tasks)
    }

    /// Retrieves a single task owned by `owner_id`.
    #[tracing::instrument(skip(self))]
    pub async fn get_task(&self, owner_id: UserId, id: TaskId) -> Result<Task, TaskServiceError> {
        let model = self.find_owned(owner_id, id).await?;
        Ok(Task::from(model))
    }

    /// Marks a task as completed at `now`.
    #[tracing::instrument(skip(self))]
    pub async fn complete_task(
        &self,
        owner_id: UserId,
        id: TaskId,
        now: NaiveDateTime,
    ) -> Result<Task, TaskServiceError> {
        let model = self.find_owned(owner_id, id).await?;
        let mut active_model: task::ActiveModel = model.into();
        active_model.completed = ActiveValue::Set(true);
        active_model.completed_at = ActiveValue::Set(Some(now));
        let updated_model = active_model.update(self.db).await?;
        Ok(Task::from(updated_model))
    }

    /// Marks a task as not completed and clears its completion time.
    #[tracing::instrument(skip(self))]
    pub async fn uncomplete_task(
        &self,
        owner_id: UserId,
        id: TaskId,
    ) -> Result<Task, TaskServiceError> {
        let model = self.find_owned(owner_id, id).await?;
        let mut active_model: task::ActiveModel = model.into();
        active_model.completed = ActiveValue::Set(false);
        active_model.completed_at = ActiveValue::Set(None);
        let updated_model = active_model.update(self.db).await?;
        Ok(Task::from(updated_model))
    }

    /// Permanently deletes a task.
    ///
    /// # Returns
    ///
    /// The deleted `Task`.
    #[tracing::instrument(skip(self))]
    pub async fn delete_task(&self, owner_id: UserId, id: TaskId) -> Result<Task, TaskServiceError> {
        let model = self.find_owned(owner_id, id).await?;
        let deleted = Task::from(model.clone());
        model.delete(self.db).await?;
        Ok(deleted)
    }

    async fn find_owned(&self, owner_id: UserId, id: TaskId) -> Result<task::Model, TaskServiceError> {
        task::Entity::find_by_id(id)
            .filter(task::Column::OwnerId.eq(owner_id))
            .one(self.db)
            .await?
            .ok_or(TaskServiceError::TaskNotFound(id))
    }
}

#[async_trait]
impl TaskStore for TaskService<'_> {
    #[tracing::instrument(skip(self))]
    async fn find_by_owner(&self, owner_id: UserId) -> Result<Vec<Task>, TaskServiceError> {
        self.list_tasks(owner_id, None).await
    }

    #[tracing::instrument(skip(self))]
    async fn find_by_owner_and_due_range(
        &self,
        owner_id: UserId,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<Task>, TaskServiceError> {
        let mut query = task::Entity::find()
            .filter(task::Column::OwnerId.eq(owner_id))
            .filter(task::Column::DueDate.gte(start.and_time(NaiveTime::MIN)));
        query = match end.checked_add_days(Days::new(1)) {
            Some(day_after_end) => {
                query.filter(task::Column::DueDate.lt(day_after_end.and_time(NaiveTime::MIN)))
            }
            None => query.filter(task::Column::DueDate.is_not_null()),
        };
        let tasks = query
            .order_by_asc(task::Column::DueDate)
            .all(self.db)
            .await?
            .into_iter()
            .map(Task::from)
            .collect();
        Ok(tasks)
    }
}
