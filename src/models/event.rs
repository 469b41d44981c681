// file: src/models/event.rs
use crate::error::{AppError, AppResult};
use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Recurrence {
    #[default]
    None,
    Daily,
    Weekly,
    Monthly,
}

impl Recurrence {
    pub fn as_str(&self) -> &'static str {
        match self {
            Recurrence::None => "none",
            Recurrence::Daily => "daily",
            Recurrence::Weekly => "weekly",
            Recurrence::Monthly => "monthly",
        }
    }

    pub fn is_recurring(&self) -> bool {
        !matches!(self, Recurrence::None)
    }
}

impl fmt::Display for Recurrence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Recurrence {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "" | "none" => Ok(Recurrence::None),
            "daily" => Ok(Recurrence::Daily),
            "weekly" => Ok(Recurrence::Weekly),
            "monthly" => Ok(Recurrence::Monthly),
            other => Err(AppError::invalid_recurrence(format!(
                "unrecognized recurrence '{}'",
                other
            ))),
        }
    }
}

/// Display classification. Has no effect on scheduling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    #[default]
    Event,
    Task,
}

impl EventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::Event => "event",
            EventKind::Task => "task",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventKind {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "event" => Ok(EventKind::Event),
            "task" => Ok(EventKind::Task),
            other => Err(AppError::invalid_input(format!(
                "unrecognized entry type '{}'",
                other
            ))),
        }
    }
}

/// A stored calendar entry. `date` is the anchor: the only day a
/// non-recurring entry appears on, and the first day a recurring one can.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarEvent {
    pub id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none", with = "hhmm_opt")]
    pub time: Option<NaiveTime>,
    #[serde(default)]
    pub recurrence: Recurrence,
    #[serde(rename = "type", default)]
    pub kind: EventKind,
}

impl CalendarEvent {
    pub fn is_all_day(&self) -> bool {
        self.time.is_none()
    }

    pub fn is_recurring(&self) -> bool {
        self.recurrence.is_recurring()
    }
}

/// Input for creating an entry; the persistence layer assigns the id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewEvent {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none", with = "hhmm_opt")]
    pub time: Option<NaiveTime>,
    #[serde(default)]
    pub recurrence: Recurrence,
    #[serde(rename = "type", default)]
    pub kind: EventKind,
}

impl NewEvent {
    pub fn new<S: Into<String>>(title: S, date: NaiveDate) -> Self {
        Self {
            title: title.into(),
            description: None,
            date,
            time: None,
            recurrence: Recurrence::None,
            kind: EventKind::Event,
        }
    }

    pub fn with_time(mut self, time: NaiveTime) -> Self {
        self.time = Some(time);
        self
    }

    pub fn with_recurrence(mut self, recurrence: Recurrence) -> Self {
        self.recurrence = recurrence;
        self
    }

    pub fn with_kind(mut self, kind: EventKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn with_description<S: Into<String>>(mut self, description: S) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn validate(&self) -> AppResult<()> {
        validate_title(&self.title)
    }

    pub fn into_event(self, id: String) -> CalendarEvent {
        CalendarEvent {
            id,
            title: self.title,
            description: self.description,
            date: self.date,
            time: self.time,
            recurrence: self.recurrence,
            kind: self.kind,
        }
    }
}

/// Partial update. `description` and `time` are doubly optional so a patch
/// can clear them (`Some(None)`) as well as leave them alone (`None`).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventPatch {
    pub title: Option<String>,
    pub description: Option<Option<String>>,
    pub date: Option<NaiveDate>,
    pub time: Option<Option<NaiveTime>>,
    pub recurrence: Option<Recurrence>,
    pub kind: Option<EventKind>,
}

impl EventPatch {
    pub fn is_empty(&self) -> bool {
        *self == EventPatch::default()
    }

    /// Merge onto `event`. The id is never touched.
    pub fn apply(&self, event: &CalendarEvent) -> AppResult<CalendarEvent> {
        let mut merged = event.clone();
        if let Some(title) = &self.title {
            merged.title = title.clone();
        }
        if let Some(description) = &self.description {
            merged.description = description.clone();
        }
        if let Some(date) = self.date {
            merged.date = date;
        }
        if let Some(time) = self.time {
            merged.time = time;
        }
        if let Some(recurrence) = self.recurrence {
            merged.recurrence = recurrence;
        }
        if let Some(kind) = self.kind {
            merged.kind = kind;
        }
        validate_title(&merged.title)?;
        Ok(merged)
    }
}

fn validate_title(title: &str) -> AppResult<()> {
    if title.trim().is_empty() {
        return Err(AppError::invalid_input("title cannot be empty"));
    }
    Ok(())
}

mod hhmm_opt {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(time: &Option<NaiveTime>, s: S) -> Result<S::Ok, S::Error> {
        match time {
            Some(t) => s.serialize_str(&t.format("%H:%M").to_string()),
            None => s.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<NaiveTime>, D::Error> {
        let raw: Option<String> = Option::deserialize(d)?;
        match raw.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(s) => NaiveTime::parse_from_str(s, "%H:%M")
                .map(Some)
                .map_err(serde::de::Error::custom),
        }
    }
}
