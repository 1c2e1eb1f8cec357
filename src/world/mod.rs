//! World state: the persisted snapshot and everything inside it

pub mod events;
pub mod import;
pub mod poi;
pub mod snapshot;

pub use events::{Channel, EventCategory, EventLog, EventLogEntry};
pub use import::import_character;
pub use poi::{PoiKind, PointOfInterest};
pub use snapshot::{WorldMetrics, WorldSnapshot, WORLD_ID};
