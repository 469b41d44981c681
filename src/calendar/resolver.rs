//! Range resolution: catalog + window -> sorted, deduplicated occurrences.
//!
//! Resolution walks the window one day at a time and asks every event
//! whether it recurs on that day. The cost is O(days x events), which is
//! fine for a few weeks of a personal calendar and keeps the anchor-day
//! case uniform with every other day.

use super::recurrence::recurs_on;
use crate::models::{Catalog, DateRange, Occurrence};
use chrono::NaiveDate;
use std::collections::{BTreeMap, HashSet};

pub fn resolve(catalog: &Catalog, range: DateRange) -> Vec<Occurrence> {
    let mut emitted = Vec::new();
    for day in range.days() {
        for event in catalog {
            if recurs_on(event, day) {
                emitted.push(Occurrence::new(event.clone(), day));
            }
        }
    }
    finalize(emitted)
}

/// Exactly `resolve` over a single-day range.
pub fn resolve_for_day(catalog: &Catalog, date: NaiveDate) -> Vec<Occurrence> {
    resolve(catalog, DateRange::single(date))
}

/// Combine partial resolutions. Only same-id, same-date duplicates collapse;
/// the first copy wins.
pub fn merge<I>(parts: I) -> Vec<Occurrence>
where
    I: IntoIterator<Item = Vec<Occurrence>>,
{
    finalize(parts.into_iter().flatten().collect())
}

/// Bucket a resolved list by day. Every day of `range` gets an entry.
pub fn group_by_day(
    occurrences: &[Occurrence],
    range: DateRange,
) -> BTreeMap<NaiveDate, Vec<Occurrence>> {
    let mut days: BTreeMap<NaiveDate, Vec<Occurrence>> =
        range.days().map(|day| (day, Vec::new())).collect();
    for occurrence in occurrences {
        if let Some(bucket) = days.get_mut(&occurrence.date) {
            bucket.push(occurrence.clone());
        }
    }
    days
}

fn finalize(emitted: Vec<Occurrence>) -> Vec<Occurrence> {
    let mut seen = HashSet::with_capacity(emitted.len());
    let mut unique: Vec<Occurrence> = emitted
        .into_iter()
        .filter(|occurrence| seen.insert(occurrence.key()))
        .collect();
    // stable: ties keep catalog order
    unique.sort_by_key(|occurrence| (occurrence.date, occurrence.sort_time()));
    unique
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CalendarEvent, NewEvent, Recurrence};
    use chrono::NaiveTime;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn t(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    fn event(id: &str, date: NaiveDate, recurrence: Recurrence, time: Option<NaiveTime>) -> CalendarEvent {
        let mut input = NewEvent::new(format!("Event {}", id), date).with_recurrence(recurrence);
        input.time = time;
        input.into_event(id.to_string())
    }

    fn keys(occurrences: &[Occurrence]) -> Vec<(String, NaiveDate)> {
        occurrences
            .iter()
            .map(|o| (o.event.id.clone(), o.date))
            .collect()
    }

    #[test]
    fn test_weekly_mondays_scenario() {
        let catalog = Catalog::from_events(vec![event("a", d(2024, 1, 1), Recurrence::Weekly, None)]);
        let range = DateRange::new(d(2024, 1, 1), d(2024, 1, 22)).unwrap();

        let resolved = resolve(&catalog, range);
        assert_eq!(
            keys(&resolved),
            vec![
                ("a".to_string(), d(2024, 1, 1)),
                ("a".to_string(), d(2024, 1, 8)),
                ("a".to_string(), d(2024, 1, 15)),
                ("a".to_string(), d(2024, 1, 22)),
            ]
        );
    }

    #[test]
    fn test_non_recurring_appears_once() {
        let catalog = Catalog::from_events(vec![
            event("once", d(2024, 1, 10), Recurrence::None, None),
            event("daily", d(2024, 1, 1), Recurrence::Daily, None),
        ]);

        let on_day = resolve_for_day(&catalog, d(2024, 1, 10));
        assert_eq!(on_day.iter().filter(|o| o.event.id == "once").count(), 1);

        for day in [d(2024, 1, 9), d(2024, 1, 11), d(2024, 2, 10)] {
            assert!(resolve_for_day(&catalog, day).iter().all(|o| o.event.id != "once"));
        }
    }

    #[test]
    fn test_sorted_by_date_then_time() {
        let catalog = Catalog::from_events(vec![
            event("late", d(2024, 1, 1), Recurrence::Daily, Some(t(18, 0))),
            event("early", d(2024, 1, 1), Recurrence::Daily, Some(t(7, 30))),
            event("allday", d(2024, 1, 2), Recurrence::None, None),
        ]);
        let range = DateRange::new(d(2024, 1, 1), d(2024, 1, 3)).unwrap();
        let resolved = resolve(&catalog, range);

        for pair in resolved.windows(2) {
            assert!((pair[0].date, pair[0].sort_time()) <= (pair[1].date, pair[1].sort_time()));
        }
        let jan2: Vec<_> = resolved.iter().filter(|o| o.date == d(2024, 1, 2)).map(|o| o.event.id.as_str()).collect();
        assert_eq!(jan2, vec!["allday", "early", "late"]);
    }

    #[test]
    fn test_ties_keep_catalog_order() {
        let catalog = Catalog::from_events(vec![
            event("second", d(2024, 1, 1), Recurrence::None, Some(t(9, 0))),
            event("first", d(2024, 1, 1), Recurrence::None, Some(t(9, 0))),
        ]);
        let resolved = resolve_for_day(&catalog, d(2024, 1, 1));
        assert_eq!(resolved[0].event.id, "second");
        assert_eq!(resolved[1].event.id, "first");
    }

    #[test]
    fn test_idempotent_and_unique() {
        let catalog = Catalog::from_events(vec![
            event("a", d(2024, 1, 1), Recurrence::Daily, Some(t(8, 0))),
            event("b", d(2024, 1, 3), Recurrence::Weekly, None),
            event("c", d(2024, 1, 31), Recurrence::Monthly, None),
            event("d", d(2024, 2, 14), Recurrence::None, Some(t(20, 0))),
        ]);
        let range = DateRange::new(d(2024, 1, 1), d(2024, 3, 31)).unwrap();

        let first = resolve(&catalog, range);
        let second = resolve(&catalog, range);
        assert_eq!(first, second);

        let unique: HashSet<_> = first.iter().map(|o| o.key()).collect();
        assert_eq!(unique.len(), first.len());
    }

    #[test]
    fn test_day_lookup_agrees_with_range() {
        let catalog = Catalog::from_events(vec![
            event("a", d(2024, 1, 1), Recurrence::Weekly, None),
            event("b", d(2024, 1, 5), Recurrence::Daily, Some(t(12, 0))),
            event("c", d(2024, 1, 9), Recurrence::None, None),
        ]);
        let range = DateRange::new(d(2024, 1, 1), d(2024, 1, 21)).unwrap();
        let resolved = resolve(&catalog, range);

        for day in range.days() {
            let from_range: Vec<_> = resolved.iter().filter(|o| o.date == day).cloned().collect();
            assert_eq!(resolve_for_day(&catalog, day), from_range, "drift on {}", day);
        }
    }

    #[test]
    fn test_merge_dedups_same_id_only() {
        let catalog = Catalog::from_events(vec![
            event("a", d(2024, 1, 1), Recurrence::Weekly, None),
            event("b", d(2024, 1, 8), Recurrence::None, None),
        ]);
        let left = resolve(&catalog, DateRange::new(d(2024, 1, 1), d(2024, 1, 8)).unwrap());
        let right = resolve(&catalog, DateRange::new(d(2024, 1, 8), d(2024, 1, 15)).unwrap());

        let merged = merge(vec![left, right]);
        assert_eq!(
            keys(&merged),
            vec![
                ("a".to_string(), d(2024, 1, 1)),
                ("a".to_string(), d(2024, 1, 8)),
                ("b".to_string(), d(2024, 1, 8)),
                ("a".to_string(), d(2024, 1, 15)),
            ]
        );
    }

    #[test]
    fn test_group_by_day_fills_empty_days() {
        let catalog = Catalog::from_events(vec![event("a", d(2024, 1, 2), Recurrence::None, None)]);
        let range = DateRange::new(d(2024, 1, 1), d(2024, 1, 3)).unwrap();
        let grouped = group_by_day(&resolve(&catalog, range), range);

        assert_eq!(grouped.len(), 3);
        assert!(grouped[&d(2024, 1, 1)].is_empty());
        assert_eq!(grouped[&d(2024, 1, 2)].len(), 1);
    }

    #[test]
    fn test_empty_catalog() {
        let range = DateRange::new(d(2024, 1, 1), d(2024, 1, 31)).unwrap();
        assert!(resolve(&Catalog::new(), range).is_empty());
    }
}
