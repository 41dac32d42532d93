use askama::Template;
use axum::{
    Form, Router,
    extract::{Extension, Path, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
};
use chrono::NaiveDateTime;
use duetrack_core::{Task, TaskId, TaskType};
use serde::Deserialize;
use std::sync::Arc;

use crate::auth::CurrentUser;
use crate::task::{NewTask, TaskService, TaskServiceError};
use crate::web::render_error_page;

const DUE_DATE_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M", "%Y-%m-%dT%H:%M:%S"];

#[derive(Clone, Debug)]
pub struct TaskState {
    pub db: Arc<sea_orm::DatabaseConnection>,
}

#[derive(Debug, Deserialize)]
pub struct CreateTaskForm {
    title: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    due_date: Option<String>,
    #[serde(default)]
    task_type: Option<String>,
}

impl CreateTaskForm {
    fn into_new_task(self) -> Result<NewTask, TaskError> {
        let due_date = self
            .due_date
            .as_deref()
            .map(parse_due_date)
            .transpose()?
            .flatten();
        let task_type = self
            .task_type
            .as_deref()
            .filter(|value| !value.trim().is_empty())
            .map(TaskType::from)
            .unwrap_or_default();
        Ok(NewTask {
            title: self.title,
            description: self.description,
            task_type,
            due_date,
        })
    }
}

/// Parses the value of a `datetime-local` input. An empty value means "no due date".
fn parse_due_date(value: &str) -> Result<Option<NaiveDateTime>, TaskError> {
    let value = value.trim();
    if value.is_empty() {
        return Ok(None);
    }
    DUE_DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
        .map(Some)
        .ok_or_else(|| TaskError::InvalidDueDate(value.to_string()))
}

/// Custom error type for task handler operations.
#[derive(Debug, thiserror::Error)]
pub enum TaskError {
    #[error("Template rendering failed")]
    Template(#[from] askama::Error),
    #[error("Task service error")]
    Service(#[from] TaskServiceError),
    #[error("Invalid due date '{0}'")]
    InvalidDueDate(String),
}

impl IntoResponse for TaskError {
    fn into_response(self) -> Response {
        let (status_code, user_facing_error_message) = match &self {
            TaskError::Service(TaskServiceError::TaskNotFound(_)) => (
                StatusCode::NOT_FOUND,
                "The task was not found or you do not have permission to change it.",
            ),
            TaskError::Service(TaskServiceError::EmptyTitle) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "A task needs a title. Please go back and fill it in.",
            ),
            TaskError::Service(TaskServiceError::TitleTooLong) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "The title is too long. Please keep it to 50 characters.",
            ),
            TaskError::InvalidDueDate(_) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "The due date could not be understood. Please use the date picker.",
            ),
            _ => {
                tracing::error!("Task request failed: {}", self);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An unexpected error occurred while processing your request. Please try again later.",
                )
            }
        };
        render_error_page(status_code, user_facing_error_message)
    }
}

/// A task prepared for display.
#[derive(Debug, Clone)]
pub struct TaskView {
    pub id: TaskId,
    pub title: String,
    pub description: Option<String>,
    pub task_type: &'static str,
    pub completed: bool,
    pub due_label: Option<String>,
    pub completed_label: Option<String>,
    pub overdue: bool,
}

impl TaskView {
    pub fn new(task: &Task, now: NaiveDateTime) -> Self {
        Self {
            id: task.id,
            title: task.title.clone(),
            description: task.description.clone(),
            task_type: task.task_type.as_str(),
            completed: task.completed,
            due_label: task
                .due_date
                .map(|due| due.format("%d.%m.%Y %H:%M").to_string()),
            completed_label: task
                .completed_at
                .map(|at| at.format("%d.%m.%Y %H:%M").to_string()),
            overdue: !task.completed && task.due_date.is_some_and(|due| due < now),
        }
    }
}

#[derive(Template)]
#[template(path = "tasks/list.html")]
struct TaskListTemplate {
    username: Option<String>,
    active_tab: &'static str,
    tasks: Vec<TaskView>,
}

#[derive(Template)]
#[template(path = "tasks/new.html")]
struct NewTaskTemplate {
    username: Option<String>,
}

async fn render_task_list(
    state: &TaskState,
    user: CurrentUser,
    task_type: Option<TaskType>,
    active_tab: &'static str,
) -> Result<Html<String>, TaskError> {
    let task_service = TaskService::new(&state.db);
    let now = crate::local_now();
    let tasks = task_service
        .list_tasks(user.id, task_type)
        .await?
        .iter()
        .map(|task| TaskView::new(task, now))
        .collect();
    let template = TaskListTemplate {
        username: Some(user.username),
        active_tab,
        tasks,
    };
    template.render().map(Html).map_err(TaskError::from)
}

/// Handler for GET /tasks listing every task of the current user.
#[tracing::instrument(skip(state))]
async fn tasks_handler(
    State(state): State<Arc<TaskState>>,
    Extension(user): Extension<CurrentUser>,
) -> Result<Html<String>, TaskError> {
    render_task_list(&state, user, None, "all").await
}

/// Handler for GET /tasks/important.
#[tracing::instrument(skip(state))]
async fn important_tasks_handler(
    State(state): State<Arc<TaskState>>,
    Extension(user): Extension<CurrentUser>,
) -> Result<Html<String>, TaskError> {
    render_task_list(&state, user, Some(TaskType::Important), "important").await
}

/// Handler for GET /tasks/daily.
#[tracing::instrument(skip(state))]
async fn daily_tasks_handler(
    State(state): State<Arc<TaskState>>,
    Extension(user): Extension<CurrentUser>,
) -> Result<Html<String>, TaskError> {
    render_task_list(&state, user, Some(TaskType::Daily), "daily").await
}

/// Handler for serving the new task form.
#[tracing::instrument]
async fn new_task_form_handler(
    Extension(user): Extension<CurrentUser>,
) -> Result<Html<String>, TaskError> {
    let template = NewTaskTemplate {
        username: Some(user.username),
    };
    template.render().map(Html).map_err(TaskError::from)
}

/// Handler for creating a task via POST request.
#[tracing::instrument(skip(state, form))]
async fn create_task_handler(
    State(state): State<Arc<TaskState>>,
    Extension(user): Extension<CurrentUser>,
    Form(form): Form<CreateTaskForm>,
) -> Result<Redirect, TaskError> {
    let new_task = form.into_new_task()?;
    let task_service = TaskService::new(&state.db);
    let task = task_service.create_task(user.id, new_task).await?;
    tracing::info!("User {} created task {}", user.id, task.id);
    Ok(Redirect::to("/tasks"))
}

/// Handler for POST /tasks/{id}/complete.
#[tracing::instrument(skip(state))]
async fn complete_task_handler(
    State(state): State<Arc<TaskState>>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<TaskId>,
) -> Result<Redirect, TaskError> {
    let task_service = TaskService::new(&state.db);
    task_service
        .complete_task(user.id, id, crate::local_now())
        .await?;
    Ok(Redirect::to("/tasks"))
}

/// Handler for POST /tasks/{id}/uncomplete.
#[tracing::instrument(skip(state))]
async fn uncomplete_task_handler(
    State(state): State<Arc<TaskState>>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<TaskId>,
) -> Result<Redirect, TaskError> {
    let task_service = TaskService::new(&state.db);
    task_service.uncomplete_task(user.id, id).await?;
    Ok(Redirect::to("/tasks"))
}

/// Handler for POST /tasks/{id}/delete.
#[tracing::instrument(skip(state))]
async fn delete_task_handler(
    State(state): State<Arc<TaskState>>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<TaskId>,
) -> Result<Redirect, TaskError> {
    let task_service = TaskService::new(&state.db);
    task_service.delete_task(user.id, id).await?;
    tracing::info!("User {} deleted task {}", user.id, id);
    Ok(Redirect::to("/tasks"))
}

/// Creates and returns the task router. Every route expects a `CurrentUser` extension.
pub fn create_task_router(state: Arc<TaskState>) -> Router {
    Router::new()
        .route("/tasks", get(tasks_handler).post(create_task_handler))
        .route("/tasks/new", get(new_task_form_handler))
        .route("/tasks/important", get(important_tasks_handler))
        .route("/tasks/daily", get(daily_tasks_handler))
        .route("/tasks/{id}/complete", post(complete_task_handler))
        .route("/tasks/{id}/uncomplete", post(uncomplete_task_handler))
        .route("/tasks/{id}/delete", post(delete_task_handler))
        .with_state(state)
}
