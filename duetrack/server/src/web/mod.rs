use askama::Template;
use axum::Router;
use axum::extract::Extension;
use axum::http::{Method, StatusCode};
use axum::middleware::{from_fn, from_fn_with_state};
use axum::response::{Html, IntoResponse, Response};
use migration::MigratorTrait;
use sea_orm::Database;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::analytics::web::{AnalyticsState, create_analytics_router};
use crate::auth::{
    AuthState, CurrentUser, FilteredMakeSpan, auth_user_middleware, create_auth_router,
    login_redirect_middleware,
};
use crate::config::Config;
use crate::task::web::{TaskState, create_task_router};

pub mod api;

const GENERIC_ERROR_MESSAGE: &str =
    "An unexpected error occurred while processing your request. Please try again later.";

/// Custom error type for web handler operations.
#[derive(Debug, thiserror::Error)]
pub enum WebError {
    /// Represents an error during template rendering.
    /// The specific `askama::Error` is captured as the source of this error.
    #[error("Template rendering failed")]
    Template(#[from] askama::Error),
}

impl IntoResponse for WebError {
    fn into_response(self) -> Response {
        tracing::error!("Page request failed: {}", self);
        render_error_page(StatusCode::INTERNAL_SERVER_ERROR, GENERIC_ERROR_MESSAGE)
    }
}

#[derive(Template)]
#[template(path = "error.html")]
struct ErrorPageTemplate<'a> {
    username: Option<String>,
    message: &'a str,
}

/// Renders the shared error page with the given status.
/// Falls back to a bare status response if the page itself cannot be rendered.
pub fn render_error_page(status: StatusCode, message: &str) -> Response {
    let template = ErrorPageTemplate {
        username: None,
        message,
    };
    match template.render() {
        Ok(html) => (status, Html(html)).into_response(),
        Err(_) => status.into_response(),
    }
}

/// Builds the complete application router over an already migrated database.
pub fn create_app(config: &Config, db: sea_orm::DatabaseConnection) -> Router {
    let db = Arc::new(db);
    let auth_state = Arc::new(AuthState::new(db.clone(), config));
    let task_state = Arc::new(TaskState { db: db.clone() });
    let analytics_state = Arc::new(AnalyticsState { db });

    let protected_routes = Router::new()
        .merge(create_task_router(task_state.clone()))
        .merge(create_analytics_router(analytics_state.clone()))
        .route("/settings", axum::routing::get(settings_handler))
        .layer(
            ServiceBuilder::new()
                .layer(from_fn_with_state(auth_state.clone(), auth_user_middleware))
                .layer(from_fn(login_redirect_middleware)),
        );

    let public_routes = Router::new()
        .route("/health", axum::routing::get(health_check_handler))
        .route("/", axum::routing::get(welcome_handler))
        .route("/main", axum::routing::get(welcome_handler))
        .route("/about", axum::routing::get(about_handler))
        .route("/support", axum::routing::get(support_handler))
        .merge(create_auth_router(auth_state.clone()))
        .layer(
            ServiceBuilder::new()
                .layer(from_fn_with_state(auth_state.clone(), auth_user_middleware)),
        );

    let api_routes = api::create_api_router(auth_state, task_state, analytics_state);

    Router::new()
        .merge(protected_routes)
        .merge(public_routes)
        .merge(api_routes)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http().make_span_with(FilteredMakeSpan))
                .layer(CorsLayer::new().allow_methods([Method::GET, Method::POST])),
        )
}

#[tracing::instrument(skip(config))]
pub async fn start_web_server(config: Config) -> anyhow::Result<()> {
    let server_address = format!("0.0.0.0:{}", &config.port);
    let listener = tokio::net::TcpListener::bind(&server_address).await?;
    tracing::info!("Web server running on http://{}", server_address);

    let db = Database::connect(&config.db_url).await?;
    migration::Migrator::up(&db, None).await?;
    tracing::info!("Database migrations applied successfully");

    let app = create_app(&config, db);

    axum::serve(listener, app).await?;
    Ok(())
}

#[tracing::instrument]
pub async fn health_check_handler() -> &'static str {
    "OK"
}

#[tracing::instrument]
pub async fn welcome_handler(
    current_user: Option<Extension<CurrentUser>>,
) -> Result<Html<String>, WebError> {
    let template = IndexTemplate {
        username: current_user.map(|Extension(user)| user.username),
    };
    template.render().map(Html).map_err(WebError::from)
}

#[tracing::instrument]
pub async fn about_handler(
    current_user: Option<Extension<CurrentUser>>,
) -> Result<Html<String>, WebError> {
    let template = AboutTemplate {
        username: current_user.map(|Extension(user)| user.username),
    };
    template.render().map(Html).map_err(WebError::from)
}

#[tracing::instrument]
pub async fn support_handler(
    current_user: Option<Extension<CurrentUser>>,
) -> Result<Html<String>, WebError> {
    let template = SupportTemplate {
        username: current_user.map(|Extension(user)| user.username),
    };
    template.render().map(Html).map_err(WebError::from)
}

#[tracing::instrument]
pub async fn settings_handler(
    Extension(user): Extension<CurrentUser>,
) -> Result<Html<String>, WebError> {
    let template = SettingsTemplate {
        username: Some(user.username),
    };
    template.render().map(Html).map_err(WebError::from)
}

#[derive(Template)]
#[template(path = "index.html")]
struct IndexTemplate {
    username: Option<String>,
}

#[derive(Template)]
#[template(path = "about.html")]
struct AboutTemplate {
    username: Option<String>,
}

#[derive(Template)]
#[template(path = "support.html")]
struct SupportTemplate {
    username: Option<String>,
}

#[derive(Template)]
#[template(path = "settings.html")]
struct SettingsTemplate {
    username: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use tower::ServiceExt;

    #[tokio::test]
    async fn can_handle_template_error_with_internal_server_error() {
        let custom_error_message = "Simulated template rendering failure".to_string();
        let template_error = askama::Error::Custom(custom_error_message.into());

        let web_error = WebError::Template(template_error);
        let response = web_error.into_response();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body_text = std::str::from_utf8(&body).unwrap();
        assert!(body_text.contains(GENERIC_ERROR_MESSAGE));
    }

    #[tokio::test]
    async fn can_redirect_anonymous_visitors_from_protected_pages() {
        let config = Config {
            db_url: "sqlite::memory:".to_string(),
            port: 8080,
            jwt_secret: "test_secret".to_string(),
        };
        let db = Database::connect(&config.db_url).await.unwrap();
        let app = create_app(&config, db);

        for uri in ["/tasks", "/tasks/new", "/analytics/week", "/settings"] {
            let response = app
                .clone()
                .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
                .await
                .unwrap();

            assert_eq!(response.status(), StatusCode::SEE_OTHER, "{}", uri);
            assert_eq!(response.headers().get("location").unwrap(), "/login");
        }

        let response = app
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
