//! Day schedule: cache, fetching and background refresh.

pub mod cache;
pub mod loader;
pub mod refresh;

pub use cache::{DependentView, RefreshHold, ScheduleCache, ScheduleKey, ScheduleState};
pub use loader::{ProfileError, ScheduleError, fetch_grid, fetch_schedule};
pub use refresh::{RefreshHandle, ScheduleRefresher};
