// file: src/models/mod.rs

pub mod catalog;
pub mod date_range;
pub mod event;
pub mod occurrence;
pub mod settings;

// Flattened so callers can write `crate::models::CalendarEvent`.
pub use catalog::Catalog;
pub use date_range::DateRange;
pub use event::{CalendarEvent, EventKind, EventPatch, NewEvent, Recurrence};
pub use occurrence::{Occurrence, OccurrenceKey};
pub use settings::{
    FirstDayOfWeek, Setting, Settings, TimeFormat, MAX_FETCH_MARGIN_MONTHS, MAX_VISIBLE_WEEKS,
};
