// file: src/database/events.rs
use crate::calendar::date_utils::{format_date, DATE_FORMAT, TIME_FORMAT};
use crate::error::{AppError, AppResult};
use crate::models::{CalendarEvent, Catalog, DateRange, EventKind, NewEvent, Recurrence};
use crate::store::new_event_id;
use chrono::{NaiveDate, NaiveTime};
use sqlx::{FromRow, SqlitePool};

/// Row as stored. Dates, times and enums are text and are only trusted after
/// `CalendarEvent::try_from`.
#[derive(Debug, Clone, FromRow)]
pub struct EventRow {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub date: String,
    pub time: Option<String>,
    pub recurrence: String,
    pub kind: String,
}

impl TryFrom<EventRow> for CalendarEvent {
    type Error = AppError;

    fn try_from(row: EventRow) -> Result<Self, Self::Error> {
        let date = NaiveDate::parse_from_str(&row.date, DATE_FORMAT).map_err(|_| {
            AppError::invalid_recurrence(format!("event {} has malformed anchor date '{}'", row.id, row.date))
        })?;
        let time = match row.time.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(raw) => Some(NaiveTime::parse_from_str(raw, TIME_FORMAT).map_err(|_| {
                AppError::invalid_recurrence(format!("event {} has malformed time '{}'", row.id, raw))
            })?),
        };
        let recurrence: Recurrence = row.recurrence.parse().map_err(|_| {
            AppError::invalid_recurrence(format!(
                "event {} has unrecognized recurrence '{}'",
                row.id, row.recurrence
            ))
        })?;
        let kind: EventKind = row.kind.parse().map_err(|_| {
            AppError::invalid_recurrence(format!("event {} has unrecognized type '{}'", row.id, row.kind))
        })?;

        Ok(CalendarEvent {
            id: row.id,
            title: row.title,
            description: row.description,
            date,
            time,
            recurrence,
            kind,
        })
    }
}

fn format_time(time: Option<NaiveTime>) -> Option<String> {
    time.map(|t| t.format(TIME_FORMAT).to_string())
}

pub async fn get_by_range(pool: &SqlitePool, range: DateRange) -> AppResult<Vec<CalendarEvent>> {
    let rows = sqlx::query_as::<_, EventRow>(
        r#"
        SELECT id, title, description, date, time, recurrence, kind
        FROM events
        WHERE date >= ?
            AND date <= ?
        ORDER BY date ASC, time ASC, rowid ASC
        "#,
    )
    .bind(format_date(range.start()))
    .bind(format_date(range.end()))
    .fetch_all(pool)
    .await?;

    let catalog = Catalog::from_decoded(rows.into_iter().map(CalendarEvent::try_from));
    Ok(catalog.into_events())
}

pub async fn get(pool: &SqlitePool, id: &str) -> AppResult<Option<CalendarEvent>> {
    let row = sqlx::query_as::<_, EventRow>(
        "SELECT id, title, description, date, time, recurrence, kind FROM events WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    row.map(CalendarEvent::try_from).transpose()
}

pub async fn insert(pool: &SqlitePool, event: NewEvent) -> AppResult<CalendarEvent> {
    let event = event.into_event(new_event_id());

    sqlx::query(
        "INSERT INTO events (id, title, description, date, time, recurrence, kind) VALUES (?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(&event.id)
    .bind(&event.title)
    .bind(&event.description)
    .bind(format_date(event.date))
    .bind(format_time(event.time))
    .bind(event.recurrence.as_str())
    .bind(event.kind.as_str())
    .execute(pool)
    .await?;

    Ok(event)
}

pub async fn replace(pool: &SqlitePool, id: &str, event: CalendarEvent) -> AppResult<CalendarEvent> {
    let result = sqlx::query(
        r#"
        UPDATE events
        SET title = ?, description = ?, date = ?, time = ?, recurrence = ?, kind = ?
        WHERE id = ?
        "#,
    )
    .bind(&event.title)
    .bind(&event.description)
    .bind(format_date(event.date))
    .bind(format_time(event.time))
    .bind(event.recurrence.as_str())
    .bind(event.kind.as_str())
    .bind(id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::not_found(format!("event {}", id)));
    }

    Ok(CalendarEvent { id: id.to_string(), ..event })
}

pub async fn delete(pool: &SqlitePool, id: &str) -> AppResult<()> {
    let result = sqlx::query("DELETE FROM events WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::not_found(format!("event {}", id)));
    }

    Ok(())
}
