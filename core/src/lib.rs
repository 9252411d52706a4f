//! Data aggregation, scaling and view-state core for the transit ridership
//! heat-map.
//!
//! Raw station records flow through a type filter, a mode-dependent
//! aggregation stage and a threshold stage; a scale calculator runs beside
//! them. The view-state reconciler keeps filter-driven refreshes from
//! clobbering the user's camera.

pub mod math;
pub mod prelude;
pub mod processing;
pub mod records;
pub mod session;
pub mod telemetry;
pub mod view_state;

pub use prelude::{FilterState, HourSelection, TimeMode};
pub use records::{LoadError, RecordStore, StationRecord, TransportType};
pub use session::{MapStyle, RenderFrame, Session, SessionConfig, LAST_HOUR};
