pub mod station;
pub mod store;

pub use station::{render_order, StationKey, StationRecord, TransportType};
pub use store::{LoadError, LoadResult, RecordStore};
