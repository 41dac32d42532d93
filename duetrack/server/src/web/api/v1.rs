use axum::response::Json;
use serde::{Deserialize, Serialize};
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi, ToSchema};

use crate::analytics::api::v1::{AnalyticsResponse, PeriodJson, SummaryJson};
use crate::analytics::chart::{ChartData, ChartDataset};
use crate::auth::api::v1::{ErrorResponse, JsonLoginRequest, LoginResponse};
use crate::task::api::v1::{TaskJson, TasksResponse};

/// Error body shared by the JSON endpoints.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ServerErrorResponse {
    error: String,
}

impl ServerErrorResponse {
    pub fn new(error: String) -> Self {
        Self { error }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::auth::api::v1::json_login_handler,
        crate::task::api::v1::get_tasks_handler,
        crate::analytics::api::v1::get_analytics_handler,
    ),
    components(schemas(
        JsonLoginRequest,
        LoginResponse,
        ErrorResponse,
        TaskJson,
        TasksResponse,
        PeriodJson,
        SummaryJson,
        ChartData,
        ChartDataset,
        AnalyticsResponse,
        ServerErrorResponse,
    )),
    modifiers(&SecurityAddon),
    tags(
        (name = "Auth", description = "Token issuing"),
        (name = "Tasks", description = "Task listing"),
        (name = "Analytics", description = "Deadline analytics per week or month")
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

/// Handler for GET /api/v1/openapi.json.
#[tracing::instrument]
pub async fn openapi_handler() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
