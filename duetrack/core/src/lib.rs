//! Core domain model and deadline analytics for Duetrack.
//!
//! Everything in this crate is a pure function of its inputs: tasks are plain
//! values, and the caller supplies "now" and "today" explicitly.
pub mod bucket;
pub mod classify;
pub mod period;
pub mod summary;
pub mod task;

pub use bucket::{DayBucket, StateCounts, bucketize};
pub use classify::{ClassifyError, DeadlineState, classify};
pub use period::{Period, PeriodError, PeriodKind};
pub use summary::{Summary, summarize};
pub use task::{Task, TaskId, TaskType, UserId, listing_order};
