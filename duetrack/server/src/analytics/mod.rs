use chrono::NaiveDateTime;
use duetrack_core::{
    DayBucket, Period, PeriodError, PeriodKind, Summary, UserId, bucketize, summarize,
};

use crate::task::{TaskServiceError, TaskStore};

pub mod api;
pub mod chart;
pub mod web;

pub use chart::ChartData;

/// Everything shown for one analytics period.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalyticsReport {
    pub period: Period,
    pub buckets: Vec<DayBucket>,
    pub chart: ChartData,
    pub summary: Summary,
}

/// Error type for AnalyticsService operations.
#[derive(Debug, thiserror::Error)]
pub enum AnalyticsServiceError {
    #[error("Period error: {0}")]
    Period(#[from] PeriodError),
    #[error("Task store error: {0}")]
    Store(#[from] TaskServiceError),
}

/// Builds period reports from a task store.
pub struct AnalyticsService<'a> {
    store: &'a dyn TaskStore,
}

impl<'a> AnalyticsService<'a> {
    pub fn new(store: &'a dyn TaskStore) -> Self {
        Self { store }
    }

    /// Builds the report for the period of `kind` containing `now`.
    ///
    /// Tasks are read once; the day buckets and the summary are both computed
    /// from that same snapshot, restricted to tasks due inside the period.
    #[tracing::instrument(skip(self))]
    pub async fn report(
        &self,
        owner_id: UserId,
        kind: PeriodKind,
        now: NaiveDateTime,
    ) -> Result<AnalyticsReport, AnalyticsServiceError> {
        let period = Period::resolve(kind, now.date())?;
        let mut tasks = self
            .store
            .find_by_owner_and_due_range(owner_id, period.start, period.end)
            .await?;
        tasks.retain(|task| task.due_date.is_some_and(|due| period.contains(due.date())));
        tracing::debug!("Building {} report from {} tasks", kind, tasks.len());

        let buckets = bucketize(&tasks, period.start, period.end, now);
        let summary = summarize(&tasks, now);
        let chart = ChartData::from_buckets(&buckets);

        Ok(AnalyticsReport {
            period,
            buckets,
            chart,
            summary,
        })
    }
}
