//! # Aggregation Engine
//!
//! Executes the grouped aggregate reads behind every dashboard operation.
//! Each aggregation shape is one typed query-spec struct with a
//! `run(&Snapshot)` method; there are no ad-hoc query strings. All shapes
//! are deterministic over an unchanged snapshot: grouping uses ordered
//! keys or arena-order iteration, and rankings use stable sorts so ties
//! keep their arena order.

pub mod overview;
pub mod spread;
pub mod trend;

pub use overview::{
    CategoryDistributionQuery, CategoryDistributionRow, OverviewStats, SourceCredibilityQuery,
    SourceCredibilityRow,
};
pub use spread::{
    BehaviorRow, SpreaderRow, TopSpreadersQuery, UserBehaviorQuery, ViralContentQuery, ViralRow,
};
pub use trend::{
    CategoryPerfRow, CategoryPerformanceQuery, DailyTrendQuery, DailyTrendRow, SourceMonthRow,
    SourceTimelineQuery, MIN_TIMELINE_SAMPLES,
};
