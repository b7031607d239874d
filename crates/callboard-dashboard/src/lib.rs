//! Call store and derivation pipeline for the callboard dashboard
//!
//! [`CallStore`] owns the fetched list and the selected call. The pure
//! functions in [`pipeline`] and [`charts`] derive statistics, the filtered
//! list and chart series from it, and [`DashboardView`] memoizes them against
//! the store version and the filter inputs.

#![forbid(unsafe_code)]
#![warn(
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    missing_docs,
    rust_2018_idioms
)]

pub mod charts;
pub mod filter;
pub mod pipeline;
pub mod store;
pub mod view;

#[cfg(test)]
pub(crate) mod test_support;

pub use charts::{ChartSeries, StatusSplit, TrendBucket, VolumeTrend, chart_series};
pub use filter::{ALL_STATUSES, StatusFilter};
pub use pipeline::{CallStats, compute_stats, filter_calls};
pub use store::{CallSnapshot, CallStore, LoadState, StoreState};
pub use view::{DashboardSnapshot, DashboardView, FilterInputs, FilteredCalls};
