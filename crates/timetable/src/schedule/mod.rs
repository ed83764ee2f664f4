//! Selection-and-conflict engine.
//!
//! Leaves first: the [`timeslot`] codec decodes per-course time encodings,
//! [`conflict`] detects slot overlaps, [`selection`] owns the conflict-free
//! selection set, and [`snapshot`] persists it. [`export`] renders the
//! selection as a CSV matrix.

pub mod conflict;
mod error;
pub mod export;
pub mod selection;
pub mod snapshot;
pub mod timeslot;

pub use conflict::find_conflict;
pub use error::{ConflictError, ExportError};
pub use export::timetable_csv;
pub use selection::{
    BulkAddSummary, ColorToken, CreditStatus, SelectionEntry, SelectionSet, Toggled,
};
pub use snapshot::{SnapshotStore, SNAPSHOT_KEY};
pub use timeslot::{course_slots, decode, extract_time_encoding, Period, TimeSlot};
