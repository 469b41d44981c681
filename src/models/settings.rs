// file: src/models/settings.rs
use crate::error::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Setting {
    pub key: String,
    pub value: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FirstDayOfWeek {
    Sunday,
    #[default]
    Monday,
}

impl FirstDayOfWeek {
    pub fn as_str(&self) -> &'static str {
        match self {
            FirstDayOfWeek::Sunday => "sunday",
            FirstDayOfWeek::Monday => "monday",
        }
    }
}

impl fmt::Display for FirstDayOfWeek {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FirstDayOfWeek {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "sunday" | "sun" | "0" => Ok(FirstDayOfWeek::Sunday),
            "monday" | "mon" | "1" => Ok(FirstDayOfWeek::Monday),
            other => Err(AppError::invalid_input(format!("unknown first day of week '{}'", other))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TimeFormat {
    #[serde(rename = "12h")]
    TwelveHour,
    #[default]
    #[serde(rename = "24h")]
    TwentyFourHour,
}

impl TimeFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            TimeFormat::TwelveHour => "12h",
            TimeFormat::TwentyFourHour => "24h",
        }
    }
}

impl fmt::Display for TimeFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TimeFormat {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "12h" | "12-hour" | "12" => Ok(TimeFormat::TwelveHour),
            "24h" | "24-hour" | "24" => Ok(TimeFormat::TwentyFourHour),
            other => Err(AppError::invalid_input(format!("unknown time format '{}'", other))),
        }
    }
}

pub const MAX_VISIBLE_WEEKS: u32 = 52;
pub const MAX_FETCH_MARGIN_MONTHS: u32 = 60;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    pub first_day_of_week: FirstDayOfWeek,
    pub time_format: TimeFormat,
    pub visible_weeks: u32,
    pub fetch_margin_months: u32, // each direction
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            first_day_of_week: FirstDayOfWeek::Monday,
            time_format: TimeFormat::TwentyFourHour,
            visible_weeks: 4,
            fetch_margin_months: 6,
        }
    }
}

impl Settings {
    pub fn validate(&self) -> AppResult<()> {
        if !(1..=MAX_VISIBLE_WEEKS).contains(&self.visible_weeks) {
            return Err(AppError::invalid_input(format!(
                "visible_weeks must be between 1 and {}",
                MAX_VISIBLE_WEEKS
            )));
        }
        if self.fetch_margin_months > MAX_FETCH_MARGIN_MONTHS {
            return Err(AppError::invalid_input(format!(
                "fetch_margin_months must be at most {}",
                MAX_FETCH_MARGIN_MONTHS
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settings_default() {
        let settings = Settings::default();
        assert_eq!(settings.first_day_of_week, FirstDayOfWeek::Monday);
        assert_eq!(settings.time_format, TimeFormat::TwentyFourHour);
        assert_eq!(settings.visible_weeks, 4);
        assert_eq!(settings.fetch_margin_months, 6);
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_parse_preferences() {
        assert_eq!("Sunday".parse::<FirstDayOfWeek>().unwrap(), FirstDayOfWeek::Sunday);
        assert_eq!("12-hour".parse::<TimeFormat>().unwrap(), TimeFormat::TwelveHour);
        assert!("tuesday".parse::<FirstDayOfWeek>().is_err());
    }

    #[test]
    fn test_zero_visible_weeks_rejected() {
        let settings = Settings { visible_weeks: 0, ..Settings::default() };
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_window_bounds() {
        let widest = Settings {
            visible_weeks: MAX_VISIBLE_WEEKS,
            fetch_margin_months: MAX_FETCH_MARGIN_MONTHS,
            ..Settings::default()
        };
        assert!(widest.validate().is_ok());

        let huge_window = Settings { visible_weeks: u32::MAX, ..Settings::default() };
        assert!(matches!(huge_window.validate(), Err(AppError::InvalidInput(_))));

        let huge_margin = Settings { fetch_margin_months: MAX_FETCH_MARGIN_MONTHS + 1, ..Settings::default() };
        assert!(matches!(huge_margin.validate(), Err(AppError::InvalidInput(_))));
    }
}
