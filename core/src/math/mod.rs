pub mod grid;
pub mod stats;

pub use grid::{GeoBounds, HeatGrid};
pub use stats::StatsHelper;
