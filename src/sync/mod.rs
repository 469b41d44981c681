//! Event store synchronizer.
//!
//! Owns the authoritative catalog for one consumer, mediates every write
//! through the persistence collaborator and keeps the resolved occurrence
//! list for the displayed range.
//!
//! Every catalog mutation triggers a full re-resolution of the displayed
//! range rather than patching the occurrence list in place. Recurring
//! events interleave with everything else, so recomputing from the catalog
//! is the only approach that keeps keys unique and order correct.
//!
//! Loads and re-resolutions are stamped with a request version. A result
//! whose version is no longer current is dropped instead of applied.

use crate::calendar::{date_utils, recurs_on, resolver};
use crate::error::{AppError, AppResult};
use crate::models::{CalendarEvent, Catalog, DateRange, EventPatch, NewEvent, Occurrence, Settings};
use crate::store::EventStore;
use crate::ui_state::Selection;
use crate::utils::logging::{log_persistence_failure, log_resolution};
use crate::utils::{normalize_title, retry_with_exponential_backoff, RetryConfig};
use chrono::NaiveDate;
use log::{debug, info, warn};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::RwLock;

#[derive(Debug, Clone)]
pub struct SyncSettings {
    /// Months added on each side of a requested range when fetching, so
    /// recurring events anchored before the range are still seen.
    pub fetch_margin_months: u32,
    pub retry: RetryConfig,
}

impl Default for SyncSettings {
    fn default() -> Self {
        Self {
            fetch_margin_months: 6,
            retry: RetryConfig::default(),
        }
    }
}

impl SyncSettings {
    pub fn from_settings(settings: &Settings, retry: RetryConfig) -> Self {
        Self {
            fetch_margin_months: settings.fetch_margin_months,
            retry,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOutcome {
    /// The load completed and its result is now the displayed view.
    Resolved(Vec<Occurrence>),
    /// Another load was already running; this call did nothing.
    AlreadyLoading,
    /// A newer load or write finished first; this result was discarded.
    Superseded,
}

impl LoadOutcome {
    pub fn occurrences(&self) -> Option<&[Occurrence]> {
        match self {
            LoadOutcome::Resolved(occurrences) => Some(occurrences),
            _ => None,
        }
    }

    pub fn is_resolved(&self) -> bool {
        matches!(self, LoadOutcome::Resolved(_))
    }
}

#[derive(Debug, Default)]
struct SyncState {
    catalog: Catalog,
    range: Option<DateRange>,
    occurrences: Vec<Occurrence>,
    version: u64,
    selection: Selection,
}

impl SyncState {
    fn next_version(&mut self) -> u64 {
        self.version += 1;
        self.version
    }

    fn apply(&mut self, catalog: Catalog, range: DateRange) -> Vec<Occurrence> {
        let started = Instant::now();
        let occurrences = resolver::resolve(&catalog, range);
        log_resolution(
            &range,
            catalog.len(),
            occurrences.len(),
            started.elapsed().as_millis() as u64,
        );
        self.catalog = catalog;
        self.occurrences = occurrences.clone();
        occurrences
    }
}

/// Resets the in-flight flag however the load exits.
struct LoadingGuard<'a>(&'a AtomicBool);

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

pub struct Synchronizer {
    store: Arc<dyn EventStore>,
    settings: SyncSettings,
    state: RwLock<SyncState>,
    loading: AtomicBool,
}

impl Synchronizer {
    pub fn new(store: Arc<dyn EventStore>, settings: SyncSettings) -> Self {
        Self {
            store,
            settings,
            state: RwLock::new(SyncState::default()),
            loading: AtomicBool::new(false),
        }
    }

    /// Fetch and resolve `range`, making it the displayed range.
    ///
    /// A fetch failure is logged and resolves to an empty view. While a load
    /// is in flight further loads return `AlreadyLoading` immediately.
    pub async fn load(&self, range: DateRange) -> LoadOutcome {
        if self.loading.swap(true, Ordering::SeqCst) {
            debug!("Load of {} dropped: another load is in flight", range);
            return LoadOutcome::AlreadyLoading;
        }
        let _guard = LoadingGuard(&self.loading);

        let version = {
            let mut state = self.state.write().await;
            state.range = Some(range);
            state.next_version()
        };

        let catalog = match self.fetch_catalog(range).await {
            Ok(catalog) => catalog,
            Err(e) => {
                log_persistence_failure("load", &e);
                Catalog::new()
            }
        };

        let mut state = self.state.write().await;
        if state.version != version {
            debug!("Discarding stale load of {} (version {} < {})", range, version, state.version);
            return LoadOutcome::Superseded;
        }
        LoadOutcome::Resolved(state.apply(catalog, range))
    }

    /// Reload the displayed range, or the months around today if nothing has
    /// been displayed yet.
    pub async fn refresh(&self) -> LoadOutcome {
        let range = self
            .current_range()
            .await
            .unwrap_or_else(|| DateRange::around_month(date_utils::today()));
        self.load(range).await
    }

    pub async fn create(&self, input: NewEvent) -> AppResult<CalendarEvent> {
        let input = NewEvent {
            title: normalize_title(&input.title),
            ..input
        };
        input.validate()?;

        let created = self.store.insert(input).await.map_err(|e| {
            log_persistence_failure("create", &e);
            e
        })?;
        info!("Created event {} on {}", created.id, created.date);

        self.state.write().await.catalog.upsert(created.clone());
        self.reresolve().await;
        Ok(created)
    }

    pub async fn update(&self, id: &str, patch: EventPatch) -> AppResult<CalendarEvent> {
        let current = self
            .store
            .get(id)
            .await
            .map_err(|e| {
                log_persistence_failure("update", &e);
                e
            })?
            .ok_or_else(|| AppError::not_found(format!("event {}", id)))?;

        let patch = EventPatch {
            title: patch.title.as_deref().map(normalize_title),
            ..patch
        };
        let merged = patch.apply(&current)?;

        let stored = self.store.replace(id, merged).await.map_err(|e| {
            log_persistence_failure("update", &e);
            e
        })?;
        info!("Updated event {}", id);

        {
            let mut state = self.state.write().await;
            state.catalog.upsert(stored.clone());
            let stale_selection = state
                .selection
                .occurrence
                .as_ref()
                .filter(|o| o.event_id() == id)
                .map(|o| o.date);
            if let Some(date) = stale_selection {
                if recurs_on(&stored, date) {
                    state.selection.occurrence = Some(Occurrence::new(stored.clone(), date));
                } else {
                    state.selection.forget_event(id);
                }
            }
        }
        self.reresolve().await;
        Ok(stored)
    }

    pub async fn remove(&self, id: &str) -> AppResult<()> {
        self.store.remove(id).await.map_err(|e| {
            log_persistence_failure("remove", &e);
            e
        })?;
        info!("Removed event {}", id);

        {
            let mut state = self.state.write().await;
            state.catalog.remove(id);
            if state.selection.forget_event(id) {
                debug!("Cleared selection of removed event {}", id);
            }
        }
        self.reresolve().await;
        Ok(())
    }

    pub async fn occurrences(&self) -> Vec<Occurrence> {
        self.state.read().await.occurrences.clone()
    }

    pub async fn catalog(&self) -> Catalog {
        self.state.read().await.catalog.clone()
    }

    pub async fn current_range(&self) -> Option<DateRange> {
        self.state.read().await.range
    }

    pub fn is_loading(&self) -> bool {
        self.loading.load(Ordering::SeqCst)
    }

    /// Resolve any range against the catalog currently held.
    pub async fn resolve(&self, range: DateRange) -> Vec<Occurrence> {
        resolver::resolve(&self.state.read().await.catalog, range)
    }

    pub async fn resolve_for_day(&self, date: NaiveDate) -> Vec<Occurrence> {
        resolver::resolve_for_day(&self.state.read().await.catalog, date)
    }

    pub async fn selection(&self) -> Selection {
        self.state.read().await.selection.clone()
    }

    pub async fn select_date(&self, date: Option<NaiveDate>) {
        self.state.write().await.selection.select_date(date);
    }

    pub async fn select_occurrence(&self, occurrence: Option<Occurrence>) {
        self.state.write().await.selection.select_occurrence(occurrence);
    }

    async fn fetch_catalog(&self, range: DateRange) -> AppResult<Catalog> {
        let window = range.expand_months(self.settings.fetch_margin_months);
        let events = retry_with_exponential_backoff(&self.settings.retry, || {
            self.store.fetch_by_range(window)
        })
        .await?;
        Ok(Catalog::from_events(events))
    }

    /// Re-fetch and re-resolve the displayed range after a write. A failed
    /// re-fetch falls back to the locally patched catalog; the write itself
    /// has already succeeded.
    async fn reresolve(&self) {
        let (version, range) = {
            let mut state = self.state.write().await;
            (state.next_version(), state.range)
        };
        let Some(range) = range else {
            return;
        };

        let fetched = self.fetch_catalog(range).await;

        let mut state = self.state.write().await;
        if state.version != version {
            debug!("Skipping superseded re-resolution (version {})", version);
            return;
        }
        let catalog = match fetched {
            Ok(catalog) => catalog,
            Err(e) => {
                warn!("Re-fetch after write failed, resolving from local catalog: {}", e);
                state.catalog.clone()
            }
        };
        state.apply(catalog, range);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Recurrence;
    use crate::store::MockEventStore;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn settings() -> SyncSettings {
        SyncSettings {
            fetch_margin_months: 6,
            retry: RetryConfig::none(),
        }
    }

    fn weekly(id: &str) -> CalendarEvent {
        NewEvent::new("Weekly", d(2024, 1, 1))
            .with_recurrence(Recurrence::Weekly)
            .into_event(id.to_string())
    }

    #[tokio::test]
    async fn test_load_fetches_expanded_window_but_resolves_requested_range() {
        let mut store = MockEventStore::new();
        store
            .expect_fetch_by_range()
            .withf(|window| window.start() == d(2023, 7, 1) && window.end() == d(2024, 7, 31))
            .times(1)
            .returning(|_| Ok(vec![weekly("a")]));

        let sync = Synchronizer::new(Arc::new(store), settings());
        let range = DateRange::new(d(2024, 1, 1), d(2024, 1, 31)).unwrap();
        let outcome = sync.load(range).await;

        let occurrences = outcome.occurrences().unwrap();
        assert_eq!(occurrences.len(), 5);
        assert!(occurrences.iter().all(|o| range.contains(o.date)));
        assert!(!sync.is_loading());
    }

    #[tokio::test]
    async fn test_load_failure_degrades_to_empty() {
        let mut store = MockEventStore::new();
        store
            .expect_fetch_by_range()
            .returning(|_| Err(AppError::persistence("connection refused")));

        let sync = Synchronizer::new(Arc::new(store), settings());
        let range = DateRange::new(d(2024, 1, 1), d(2024, 1, 31)).unwrap();

        assert_eq!(sync.load(range).await, LoadOutcome::Resolved(vec![]));
        assert!(sync.catalog().await.is_empty());
        assert_eq!(sync.current_range().await, Some(range));
    }

    #[tokio::test]
    async fn test_create_failure_is_surfaced() {
        let mut store = MockEventStore::new();
        store
            .expect_insert()
            .returning(|_| Err(AppError::persistence("disk full")));

        let sync = Synchronizer::new(Arc::new(store), settings());
        let result = sync.create(NewEvent::new("Lost", d(2024, 1, 1))).await;

        assert!(matches!(result, Err(AppError::PersistenceUnavailable(_))));
        assert!(sync.catalog().await.is_empty());
    }

    #[tokio::test]
    async fn test_create_rejects_blank_title_without_touching_store() {
        let store = MockEventStore::new();
        let sync = Synchronizer::new(Arc::new(store), settings());

        let result = sync.create(NewEvent::new("  ", d(2024, 1, 1))).await;
        assert!(matches!(result, Err(AppError::InvalidInput(_))));
    }

    #[tokio::test]
    async fn test_update_missing_is_not_found() {
        let mut store = MockEventStore::new();
        store.expect_get().returning(|_| Ok(None));
        store.expect_replace().never();

        let sync = Synchronizer::new(Arc::new(store), settings());
        let result = sync.update("ghost", EventPatch::default()).await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_update_lookup_failure_is_surfaced() {
        let mut store = MockEventStore::new();
        store
            .expect_get()
            .times(1)
            .returning(|_| Err(AppError::persistence("database is locked")));
        store.expect_replace().never();

        let sync = Synchronizer::new(Arc::new(store), settings());
        let patch = EventPatch {
            title: Some("Renamed".to_string()),
            ..EventPatch::default()
        };
        let result = sync.update("weekly-1", patch).await;

        assert!(matches!(result, Err(AppError::PersistenceUnavailable(_))));
        assert!(sync.catalog().await.is_empty());
    }

    #[tokio::test]
    async fn test_remove_missing_is_not_found() {
        let mut store = MockEventStore::new();
        store
            .expect_remove()
            .returning(|id| Err(AppError::not_found(format!("event {}", id))));

        let sync = Synchronizer::new(Arc::new(store), settings());
        assert!(matches!(sync.remove("ghost").await, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_write_survives_failed_refetch() {
        let mut store = MockEventStore::new();
        let mut calls = 0;
        store.expect_fetch_by_range().returning(move |_| {
            calls += 1;
            if calls == 1 {
                Ok(vec![])
            } else {
                Err(AppError::persistence("timeout"))
            }
        });
        store
            .expect_insert()
            .returning(|input| Ok(input.into_event("new".to_string())));

        let sync = Synchronizer::new(Arc::new(store), settings());
        let range = DateRange::new(d(2024, 1, 1), d(2024, 1, 7)).unwrap();
        sync.load(range).await;

        sync.create(NewEvent::new("Kept", d(2024, 1, 3))).await.unwrap();

        let occurrences = sync.occurrences().await;
        assert_eq!(occurrences.len(), 1);
        assert_eq!(occurrences[0].event.id, "new");
    }

    #[test]
    fn test_resolve_for_day_without_load_is_empty() {
        let sync = Synchronizer::new(Arc::new(MockEventStore::new()), settings());
        let occurrences = tokio_test::block_on(sync.resolve_for_day(d(2024, 1, 1)));
        assert!(occurrences.is_empty());
    }
}
