//! Analytics engine.
//!
//! `aggregator` holds the pure snapshot computation; `worker` wraps it in
//! a cancellable repeating refresh task for watch mode.

pub mod aggregator;
pub mod worker;

pub use aggregator::{collect_records, compute_snapshot, refresh};
pub use worker::{AnalyticsWorker, WorkerOptions};
