use crate::auth::CurrentUser;
use crate::task::TaskService;
use crate::task::web::TaskState;
use crate::web::api::v1::ServerErrorResponse;
use axum::{
    Router,
    extract::{Extension, Query, State},
    http::StatusCode,
    response::Json,
    routing::get,
};
use duetrack_core::{Task, TaskId, TaskType};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// JSON representation of a Task for API responses.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct TaskJson {
    /// Unique identifier for the task
    id: TaskId,
    title: String,
    description: Option<String>,
    /// One of `daily`, `important` or `other`
    task_type: String,
    completed: bool,
    /// Local completion time, `YYYY-MM-DDTHH:MM:SS`
    completed_at: Option<String>,
    /// Local due time, `YYYY-MM-DDTHH:MM:SS`
    due_date: Option<String>,
}

impl From<Task> for TaskJson {
    fn from(task: Task) -> Self {
        Self {
            id: task.id,
            title: task.title,
            description: task.description,
            task_type: task.task_type.as_str().to_string(),
            completed: task.completed,
            completed_at: task
                .completed_at
                .map(|at| at.format(TIMESTAMP_FORMAT).to_string()),
            due_date: task
                .due_date
                .map(|at| at.format(TIMESTAMP_FORMAT).to_string()),
        }
    }
}

/// API response for listing tasks.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct TasksResponse {
    tasks: Vec<TaskJson>,
    count: usize,
}

/// Query parameters for filtering tasks by type.
#[derive(Debug, Deserialize, ToSchema)]
pub struct TasksQuery {
    /// Optional task type to filter by
    #[serde(default)]
    task_type: Option<String>,
}

/// Handler for GET /api/v1/tasks - Returns the current user's tasks in listing order.
#[tracing::instrument(skip(state))]
#[utoipa::path(
    get,
    path = "/api/v1/tasks",
    params(
        ("task_type" = Option<String>, Query, description = "Optional task type to filter by")
    ),
    responses(
        (status = 200, description = "Successfully retrieved tasks", body = TasksResponse),
        (status = 401, description = "Authentication required"),
        (status = 500, description = "Internal server error", body = ServerErrorResponse)
    ),
    security(("bearer" = [])),
    tag = "Tasks"
)]
pub async fn get_tasks_handler(
    State(state): State<Arc<TaskState>>,
    Extension(user): Extension<CurrentUser>,
    Query(query): Query<TasksQuery>,
) -> Result<Json<TasksResponse>, (StatusCode, Json<ServerErrorResponse>)> {
    let service = TaskService::new(&state.db);
    let task_type = query.task_type.as_deref().map(TaskType::from);

    match service.list_tasks(user.id, task_type).await {
        Ok(tasks) => {
            let tasks: Vec<TaskJson> = tasks.into_iter().map(TaskJson::from).collect();
            let count = tasks.len();
            Ok(Json(TasksResponse { tasks, count }))
        }
        Err(err) => {
            tracing::error!("Failed to get tasks: {}", err);
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ServerErrorResponse::new(
                    "Failed to retrieve tasks".to_string(),
                )),
            ))
        }
    }
}

/// Creates and returns the tasks API router.
pub fn create_api_router(state: Arc<TaskState>) -> Router {
    Router::new()
        .route("/tasks", get(get_tasks_handler))
        .with_state(state)
}
