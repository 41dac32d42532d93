#![allow(dead_code)]

use axum::extract::Request;
use axum::middleware::Next;
use axum::response::Response;
use duetrack_server::auth::CurrentUser;
use duetrack_server::config::Config;
use migration::MigratorTrait;
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use std::future::Future;
use std::pin::Pin;

pub const TEST_JWT_SECRET: &str = "some_secret";

/// Opens a fresh in-memory SQLite database with every migration applied.
///
/// The pool is capped at one connection because each SQLite memory
/// connection is its own database.
pub async fn setup_db() -> anyhow::Result<DatabaseConnection> {
    // Allow multiple calls to init for tests.
    let _ = tracing_subscriber::fmt().try_init();
    let mut options = ConnectOptions::new("sqlite::memory:");
    options.max_connections(1).sqlx_logging(false);
    let db = Database::connect(options).await?;
    migration::Migrator::up(&db, None).await?;
    Ok(db)
}

pub fn test_config() -> Config {
    Config {
        db_url: "sqlite::memory:".to_string(),
        port: 8080,
        jwt_secret: TEST_JWT_SECRET.to_string(),
    }
}

type MiddlewareFuture = Pin<Box<dyn Future<Output = Response> + Send>>;

/// Creates a middleware that inserts a fixed CurrentUser, standing in for a real session.
pub fn create_stub_user_middleware(
    id: i32,
    username: &str,
) -> impl Fn(Request, Next) -> MiddlewareFuture + Clone + Send + Sync + 'static {
    let username = username.to_string();
    move |mut request: Request, next: Next| -> MiddlewareFuture {
        request
            .extensions_mut()
            .insert(CurrentUser::new(id, username.clone()));
        Box::pin(async move { next.run(request).await })
    }
}

/// Reads a response body as UTF-8 text.
pub async fn body_text(response: Response) -> String {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(body.to_vec()).unwrap()
}
