//! Persistence boundary for calendar events.
//!
//! The synchronizer only ever talks to an `EventStore`. Any backend that can
//! fetch by anchor date and do id-keyed writes with `NotFound` semantics
//! will do: the SQLite `Database`, the in-process `MemoryStore`, or a remote
//! service.

use crate::error::AppResult;
use crate::models::{CalendarEvent, DateRange, NewEvent};
use async_trait::async_trait;

pub mod memory;

pub use memory::MemoryStore;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EventStore: Send + Sync {
    /// Events whose anchor date lies in `range`. Recurring events anchored
    /// earlier are not returned; callers widen the window themselves.
    async fn fetch_by_range(&self, range: DateRange) -> AppResult<Vec<CalendarEvent>>;

    async fn get(&self, id: &str) -> AppResult<Option<CalendarEvent>>;

    /// Store a new event and return it with its assigned id.
    async fn insert(&self, event: NewEvent) -> AppResult<CalendarEvent>;

    /// Overwrite an existing event. `NotFound` if `id` is unknown.
    async fn replace(&self, id: &str, event: CalendarEvent) -> AppResult<CalendarEvent>;

    /// `NotFound` if `id` is unknown.
    async fn remove(&self, id: &str) -> AppResult<()>;
}

pub fn new_event_id() -> String {
    uuid::Uuid::new_v4().to_string()
}
