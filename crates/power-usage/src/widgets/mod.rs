//! TUI widget modules

pub mod breakdown;
pub mod calendar;
pub mod day_detail;
pub mod header;
pub mod series;
pub mod shortcuts;
pub mod statistics;

pub use breakdown::*;
pub use calendar::*;
pub use day_detail::*;
pub use header::*;
pub use series::*;
pub use shortcuts::*;
pub use statistics::*;
