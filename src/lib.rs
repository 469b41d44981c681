// weekplan library
// Recurrence expansion and range resolution for a personal calendar

pub mod calendar;
pub mod config;
pub mod database;
pub mod error;
pub mod models;
pub mod store;
pub mod sync;
pub mod ui_state;
pub mod utils;

// Re-export commonly used types
pub use calendar::{occurrences_in_range, recurs_on, resolve, resolve_for_day};
pub use database::Database;
pub use error::{AppError, AppResult};
pub use models::*;
pub use store::{EventStore, MemoryStore};
pub use sync::{LoadOutcome, SyncSettings, Synchronizer};
pub use ui_state::Selection;
