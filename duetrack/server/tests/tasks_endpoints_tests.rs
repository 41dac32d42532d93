use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::middleware::from_fn;
use chrono::NaiveDate;
use duetrack_core::{TaskType, UserId};
use duetrack_server::auth::encode_jwt;
use duetrack_server::task::web::{TaskState, create_task_router};
use duetrack_server::task::{NewTask, TaskService};
use duetrack_server::user::UserService;
use duetrack_server::web::create_app;
use sea_orm::DatabaseConnection;
use std::sync::Arc;
use tower::ServiceExt;

mod common;

use common::{TEST_JWT_SECRET, body_text, create_stub_user_middleware, test_config};

struct TestContext {
    db: Arc<DatabaseConnection>,
    user_id: UserId,
}

async fn setup() -> TestContext {
    let db = common::setup_db().await.unwrap();
    let user_id = UserService::new(&db)
        .register("alice", "secret")
        .await
        .unwrap()
        .id();
    TestContext {
        db: Arc::new(db),
        user_id,
    }
}

fn create_test_router(context: &TestContext, user_id: UserId) -> Router {
    create_task_router(Arc::new(TaskState {
        db: context.db.clone(),
    }))
    .layer(from_fn(create_stub_user_middleware(user_id, "alice")))
}

fn form_request(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/x-www-form-urlencoded")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn create_task(context: &TestContext, title: &str, task_type: TaskType) -> i32 {
    TaskService::new(&context.db)
        .create_task(
            context.user_id,
            NewTask {
                title: title.to_string(),
                description: None,
                task_type,
                due_date: None,
            },
        )
        .await
        .unwrap()
        .id
}

#[tokio::test]
async fn can_create_task_from_form() {
    let context = setup().await;
    let app = create_test_router(&context, context.user_id);

    let response = app
        .oneshot(form_request(
            "/tasks",
            "title=Write+report&description=Quarterly&task_type=important&due_date=2024-06-10T12%3A30",
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers().get("location").unwrap(), "/tasks");

    let tasks = TaskService::new(&context.db)
        .list_tasks(context.user_id, None)
        .await
        .unwrap();
    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0].title, "Write report");
    assert_eq!(tasks[0].description.as_deref(), Some("Quarterly"));
    assert_eq!(tasks[0].task_type, TaskType::Important);
    assert_eq!(
        tasks[0].due_date,
        NaiveDate::from_ymd_opt(2024, 6, 10)
            .unwrap()
            .and_hms_opt(12, 30, 0)
    );
}

#[tokio::test]
async fn can_default_task_type_to_daily() {
    let context = setup().await;
    let app = create_test_router(&context, context.user_id);

    let response = app
        .oneshot(form_request("/tasks", "title=Stretch&due_date="))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    let tasks = TaskService::new(&context.db)
        .list_tasks(context.user_id, None)
        .await
        .unwrap();
    assert_eq!(tasks[0].task_type, TaskType::Daily);
    assert_eq!(tasks[0].due_date, None);
}

#[tokio::test]
async fn can_reject_invalid_task_input() {
    let context = setup().await;
    let app = create_test_router(&context, context.user_id);

    let blank_title = app
        .clone()
        .oneshot(form_request("/tasks", "title=+++"))
        .await
        .unwrap();
    assert_eq!(blank_title.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let long_title = app
        .clone()
        .oneshot(form_request("/tasks", &format!("title={}", "x".repeat(51))))
        .await
        .unwrap();
    assert_eq!(long_title.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let bad_date = app
        .oneshot(form_request("/tasks", "title=Report&due_date=tomorrow"))
        .await
        .unwrap();
    assert_eq!(bad_date.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn can_list_tasks_by_tab() {
    let context = setup().await;
    create_task(&context, "Daily chore", TaskType::Daily).await;
    create_task(&context, "Big deadline", TaskType::Important).await;
    let app = create_test_router(&context, context.user_id);

    let all = body_text(
        app.clone()
            .oneshot(Request::builder().uri("/tasks").body(Body::empty()).unwrap())
            .await
            .unwrap(),
    )
    .await;
    assert!(all.contains("Daily chore"));
    assert!(all.contains("Big deadline"));
    assert!(all.find("Big deadline") < all.find("Daily chore"));

    let important = body_text(
        app.oneshot(
            Request::builder()
                .uri("/tasks/important")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap(),
    )
    .await;
    assert!(important.contains("Big deadline"));
    assert!(!important.contains("Daily chore"));
}

#[tokio::test]
async fn can_complete_uncomplete_and_delete_task() {
    let context = setup().await;
    let id = create_task(&context, "Report", TaskType::Daily).await;
    let app = create_test_router(&context, context.user_id);
    let task_service = TaskService::new(&context.db);

    let response = app
        .clone()
        .oneshot(form_request(&format!("/tasks/{}/complete", id), ""))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    let task = task_service.get_task(context.user_id, id).await.unwrap();
    assert!(task.completed);
    assert!(task.completed_at.is_some());

    app.clone()
        .oneshot(form_request(&format!("/tasks/{}/uncomplete", id), ""))
        .await
        .unwrap();
    let task = task_service.get_task(context.user_id, id).await.unwrap();
    assert!(!task.completed);
    assert_eq!(task.completed_at, None);

    app.oneshot(form_request(&format!("/tasks/{}/delete", id), ""))
        .await
        .unwrap();
    assert!(task_service.get_task(context.user_id, id).await.is_err());
}

#[tokio::test]
async fn can_refuse_changes_to_foreign_tasks() {
    let context = setup().await;
    let id = create_task(&context, "Private", TaskType::Daily).await;
    let intruder = UserService::new(&context.db)
        .register("mallory", "secret")
        .await
        .unwrap()
        .id();
    let app = create_test_router(&context, intruder);

    for action in ["complete", "uncomplete", "delete"] {
        let response = app
            .clone()
            .oneshot(form_request(&format!("/tasks/{}/{}", id, action), ""))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND, "{}", action);
    }

    let task = TaskService::new(&context.db)
        .get_task(context.user_id, id)
        .await
        .unwrap();
    assert!(!task.completed);
}

#[tokio::test]
async fn can_list_tasks_through_api() {
    let context = setup().await;
    create_task(&context, "Daily chore", TaskType::Daily).await;
    create_task(&context, "Big deadline", TaskType::Important).await;
    let app = create_app(&test_config(), (*context.db).clone());
    let token = encode_jwt(context.user_id, "alice".to_string(), TEST_JWT_SECRET).unwrap();

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/v1/tasks?task_type=important")
                .header("authorization", format!("Bearer {}", token))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json: serde_json::Value = serde_json::from_str(&body_text(response).await).unwrap();
    assert_eq!(json["count"], 1);
    assert_eq!(json["tasks"][0]["title"], "Big deadline");
    assert_eq!(json["tasks"][0]["task_type"], "important");

    let unauthenticated = app
        .oneshot(
            Request::builder()
                .uri("/api/v1/tasks")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(unauthenticated.status(), StatusCode::UNAUTHORIZED);
}
