//! Selection state shared with the presentation layer.
//!
//! Not scheduling state, but the synchronizer owns it so that deleting an
//! event can clear a selection that points at it.

use crate::models::Occurrence;
use chrono::NaiveDate;
use serde::Serialize;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Selection {
    /// Day the user is looking at
    pub date: Option<NaiveDate>,

    /// Occurrence opened for detail or editing
    pub occurrence: Option<Occurrence>,
}

impl Selection {
    /// Selecting a day drops any selected occurrence.
    pub fn select_date(&mut self, date: Option<NaiveDate>) {
        self.date = date;
        self.occurrence = None;
    }

    /// Selecting an occurrence also selects its day.
    pub fn select_occurrence(&mut self, occurrence: Option<Occurrence>) {
        self.date = occurrence.as_ref().map(|o| o.date);
        self.occurrence = occurrence;
    }

    /// Clear the selected occurrence if it belongs to `event_id`. Returns
    /// whether anything was cleared.
    pub fn forget_event(&mut self, event_id: &str) -> bool {
        match &self.occurrence {
            Some(selected) if selected.event_id() == event_id => {
                self.occurrence = None;
                true
            }
            _ => false,
        }
    }
}
