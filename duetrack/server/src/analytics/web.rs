use askama::Template;
use axum::{
    Router,
    extract::{Extension, Path, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
    routing::get,
};
use duetrack_core::{PeriodError, PeriodKind, Summary};
use std::sync::Arc;

use crate::analytics::{AnalyticsService, AnalyticsServiceError};
use crate::auth::CurrentUser;
use crate::task::TaskService;
use crate::web::render_error_page;

#[derive(Clone, Debug)]
pub struct AnalyticsState {
    pub db: Arc<sea_orm::DatabaseConnection>,
}

/// Custom error type for analytics handler operations.
#[derive(Debug, thiserror::Error)]
pub enum AnalyticsError {
    #[error("Template rendering failed")]
    Template(#[from] askama::Error),
    #[error("Chart serialization failed")]
    Serialization(#[from] serde_json::Error),
    #[error("Analytics service error")]
    Service(#[from] AnalyticsServiceError),
}

impl From<PeriodError> for AnalyticsError {
    fn from(err: PeriodError) -> Self {
        AnalyticsError::Service(AnalyticsServiceError::Period(err))
    }
}

impl IntoResponse for AnalyticsError {
    fn into_response(self) -> Response {
        match &self {
            AnalyticsError::Service(AnalyticsServiceError::Period(PeriodError::UnknownKind(_))) => {
                render_error_page(
                    StatusCode::NOT_FOUND,
                    "There is no such analytics period. Choose a week or a month.",
                )
            }
            _ => {
                tracing::error!("Analytics request failed: {}", self);
                render_error_page(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An unexpected error occurred while processing your request. Please try again later.",
                )
            }
        }
    }
}

#[derive(Template)]
#[template(path = "analytics.html")]
struct AnalyticsTemplate {
    username: Option<String>,
    active_tab: &'static str,
    period_label: String,
    chart_json: String,
    summary: Summary,
}

/// Handler for GET /analytics, which defaults to the current week.
#[tracing::instrument]
async fn analytics_index_handler() -> Redirect {
    Redirect::to("/analytics/week")
}

/// Handler for GET /analytics/{period} rendering the chart and summary.
#[tracing::instrument(skip(state))]
async fn analytics_period_handler(
    State(state): State<Arc<AnalyticsState>>,
    Extension(user): Extension<CurrentUser>,
    Path(period): Path<String>,
) -> Result<Html<String>, AnalyticsError> {
    let kind: PeriodKind = period.parse()?;
    let task_service = TaskService::new(&state.db);
    let report = AnalyticsService::new(&task_service)
        .report(user.id, kind, crate::local_now())
        .await?;

    let template = AnalyticsTemplate {
        username: Some(user.username),
        active_tab: kind.as_str(),
        period_label: report.period.label,
        chart_json: serde_json::to_string(&report.chart)?,
        summary: report.summary,
    };
    template.render().map(Html).map_err(AnalyticsError::from)
}

/// Creates and returns the analytics router. Every route expects a `CurrentUser` extension.
pub fn create_analytics_router(state: Arc<AnalyticsState>) -> Router {
    Router::new()
        .route("/analytics", get(analytics_index_handler))
        .route("/analytics/{period}", get(analytics_period_handler))
        .with_state(state)
}
