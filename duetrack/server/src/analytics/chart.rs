//! Chart-ready rendering of analytics buckets.
//!
//! The output maps directly onto a bar chart: one label per day and one
//! dataset per deadline state, always in the same order and colors.
use duetrack_core::{DayBucket, DeadlineState};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// One series of the chart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ChartDataset {
    pub label: String,
    pub data: Vec<u32>,
    #[serde(rename = "backgroundColor")]
    pub background_color: String,
}

/// Parallel arrays of day labels and per-state counts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ChartData {
    pub labels: Vec<String>,
    pub datasets: Vec<ChartDataset>,
}

impl ChartData {
    /// Builds chart data from buckets already in ascending day order.
    pub fn from_buckets(buckets: &[DayBucket]) -> Self {
        let labels = buckets
            .iter()
            .map(|bucket| bucket.day.format("%d.%m").to_string())
            .collect();
        let datasets = DeadlineState::ALL
            .iter()
            .map(|state| ChartDataset {
                label: series_label(*state).to_string(),
                data: buckets
                    .iter()
                    .map(|bucket| bucket.counts.get(*state))
                    .collect(),
                background_color: series_color(*state).to_string(),
            })
            .collect();
        ChartData { labels, datasets }
    }
}

/// Display label of the series for a state.
pub fn series_label(state: DeadlineState) -> &'static str {
    match state {
        DeadlineState::CompletedOnTime => "Completed on time",
        DeadlineState::CompletedLate => "Completed late",
        DeadlineState::Missed => "Missed",
        DeadlineState::Pending => "Can still be done on time",
    }
}

/// Bar color of the series for a state.
pub fn series_color(state: DeadlineState) -> &'static str {
    match state {
        DeadlineState::CompletedOnTime => "#28a745", // green
        DeadlineState::CompletedLate => "#ffc107",   // yellow
        DeadlineState::Missed => "#dc3545",          // red
        DeadlineState::Pending => "#17a2b8",         // teal
    }
}
