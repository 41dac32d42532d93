use std::sync::Arc;

use crate::{
    analytics::web::AnalyticsState,
    auth::{self, AuthState},
    task::web::TaskState,
};

use axum::{
    Router,
    middleware::{from_fn, from_fn_with_state},
};

use tower::ServiceBuilder;

pub mod v1;

/// Creates the API routes for JSON API endpoints.
pub fn create_api_router(
    auth_state: Arc<AuthState>,
    task_state: Arc<TaskState>,
    analytics_state: Arc<AnalyticsState>,
) -> axum::Router {
    let login_router = auth::api::v1::create_api_router(auth_state.clone());
    let tasks_router = crate::task::api::v1::create_api_router(task_state);
    let analytics_router = crate::analytics::api::v1::create_api_router(analytics_state);
    let protected_routes = tasks_router
        .merge(analytics_router)
        .layer(ServiceBuilder::new().layer(from_fn(auth::api::v1::require_auth_middleware)));
    let public_routes = login_router.route("/openapi.json", axum::routing::get(v1::openapi_handler));
    let api_routes = public_routes.merge(protected_routes);
    Router::new()
        .nest("/api/v1", api_routes)
        .layer(ServiceBuilder::new().layer(from_fn_with_state(
            auth_state,
            auth::api::v1::auth_user_middleware,
        )))
}
