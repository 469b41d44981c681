// Calendar engine
// Date helpers, week math, recurrence expansion and range resolution.
// Everything here is pure and synchronous.

pub mod date_utils;
pub mod math;
pub mod recurrence;
pub mod resolver;
pub mod time_format;

pub use recurrence::{occurrences_in_range, recurs_on};
pub use resolver::{group_by_day, merge, resolve, resolve_for_day};
