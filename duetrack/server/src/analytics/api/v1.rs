use crate::analytics::web::AnalyticsState;
use crate::analytics::{AnalyticsReport, AnalyticsService, ChartData};
use crate::auth::CurrentUser;
use crate::task::TaskService;
use crate::web::api::v1::ServerErrorResponse;
use axum::{
    Router,
    extract::{Extension, Path, State},
    http::StatusCode,
    response::Json,
    routing::get,
};
use duetrack_core::{PeriodKind, Summary};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;

/// JSON representation of a resolved reporting period.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct PeriodJson {
    /// `week` or `month`
    kind: String,
    /// First day, `YYYY-MM-DD`
    start: String,
    /// Last day (inclusive), `YYYY-MM-DD`
    end: String,
    label: String,
}

/// Overall per-state totals for the period.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SummaryJson {
    completed_on_time: u32,
    completed_late: u32,
    missed: u32,
    pending: u32,
    total_completed: u32,
    total_uncompleted: u32,
}

impl From<Summary> for SummaryJson {
    fn from(summary: Summary) -> Self {
        Self {
            completed_on_time: summary.completed_on_time,
            completed_late: summary.completed_late,
            missed: summary.missed,
            pending: summary.pending,
            total_completed: summary.total_completed,
            total_uncompleted: summary.total_uncompleted,
        }
    }
}

/// API response for an analytics period.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AnalyticsResponse {
    period: PeriodJson,
    chart: ChartData,
    summary: SummaryJson,
}

impl From<AnalyticsReport> for AnalyticsResponse {
    fn from(report: AnalyticsReport) -> Self {
        Self {
            period: PeriodJson {
                kind: report.period.kind.to_string(),
                start: report.period.start.format("%Y-%m-%d").to_string(),
                end: report.period.end.format("%Y-%m-%d").to_string(),
                label: report.period.label,
            },
            chart: report.chart,
            summary: SummaryJson::from(report.summary),
        }
    }
}

/// Handler for GET /api/v1/analytics/{period}.
#[tracing::instrument(skip(state))]
#[utoipa::path(
    get,
    path = "/api/v1/analytics/{period}",
    params(
        ("period" = String, Path, description = "Either `week` or `month`")
    ),
    responses(
        (status = 200, description = "Report for the current period", body = AnalyticsResponse),
        (status = 401, description = "Authentication required"),
        (status = 404, description = "Unknown period", body = ServerErrorResponse),
        (status = 500, description = "Internal server error", body = ServerErrorResponse)
    ),
    security(("bearer" = [])),
    tag = "Analytics"
)]
pub async fn get_analytics_handler(
    State(state): State<Arc<AnalyticsState>>,
    Extension(user): Extension<CurrentUser>,
    Path(period): Path<String>,
) -> Result<Json<AnalyticsResponse>, (StatusCode, Json<ServerErrorResponse>)> {
    let kind: PeriodKind = period.parse().map_err(|_| {
        (
            StatusCode::NOT_FOUND,
            Json(ServerErrorResponse::new(format!("Unknown period '{}'", period))),
        )
    })?;

    let task_service = TaskService::new(&state.db);
    match AnalyticsService::new(&task_service)
        .report(user.id, kind, crate::local_now())
        .await
    {
        Ok(report) => Ok(Json(AnalyticsResponse::from(report))),
        Err(err) => {
            tracing::error!("Failed to build analytics report: {}", err);
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ServerErrorResponse::new(
                    "Failed to build analytics report".to_string(),
                )),
            ))
        }
    }
}

/// Creates and returns the analytics API router.
pub fn create_api_router(state: Arc<AnalyticsState>) -> Router {
    Router::new()
        .route("/analytics/{period}", get(get_analytics_handler))
        .with_state(state)
}
