//! Analysis modules.
//!
//! The aggregator computes statistics, the snapshot bundles them for a
//! report, and the advisor turns them into suggestions.

pub mod advisor;
pub mod aggregator;
pub mod snapshot;

pub use advisor::{advise, Advice};
pub use aggregator::*;
pub use snapshot::AnalyticsReport;
