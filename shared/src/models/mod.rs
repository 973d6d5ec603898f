//! Data models
//!
//! Client-side projections of the backend entities the table schedule
//! works with. All IDs are `i64`.

pub mod dining_table;
pub mod reservation;
pub mod restaurant;
pub mod schedule;

// Re-exports
pub use dining_table::*;
pub use reservation::*;
pub use restaurant::*;
pub use schedule::*;
