// file: src/database/settings.rs
use crate::error::AppResult;
use crate::models::{MAX_FETCH_MARGIN_MONTHS, MAX_VISIBLE_WEEKS};
use log::warn;
use sqlx::SqlitePool;

pub async fn get(pool: &SqlitePool) -> AppResult<crate::models::Settings> {
    let settings = sqlx::query_as::<_, crate::models::Setting>("SELECT key, value FROM settings")
        .fetch_all(pool)
        .await?;

    let mut app_settings = crate::models::Settings::default();
    for setting in settings {
        match setting.key.as_str() {
            "first_day_of_week" => match setting.value.parse() {
                Ok(value) => app_settings.first_day_of_week = value,
                Err(e) => warn!("Ignoring stored first_day_of_week: {}", e),
            },
            "time_format" => match setting.value.parse() {
                Ok(value) => app_settings.time_format = value,
                Err(e) => warn!("Ignoring stored time_format: {}", e),
            },
            "visible_weeks" => {
                app_settings.visible_weeks =
                    setting.value.parse::<u32>().unwrap_or(4).clamp(1, MAX_VISIBLE_WEEKS)
            }
            "fetch_margin_months" => {
                app_settings.fetch_margin_months =
                    setting.value.parse::<u32>().unwrap_or(6).min(MAX_FETCH_MARGIN_MONTHS)
            }
            _ => {}
        }
    }

    Ok(app_settings)
}

pub async fn update(pool: &SqlitePool, settings: &crate::models::Settings) -> AppResult<()> {
    settings.validate()?;

    let visible_weeks_str = settings.visible_weeks.to_string();
    let fetch_margin_str = settings.fetch_margin_months.to_string();

    let updates = vec![
        ("first_day_of_week", settings.first_day_of_week.as_str()),
        ("time_format", settings.time_format.as_str()),
        ("visible_weeks", visible_weeks_str.as_str()),
        ("fetch_margin_months", fetch_margin_str.as_str()),
    ];

    for (key, value) in updates {
        sqlx::query("INSERT INTO settings (key, value) VALUES (?, ?) ON CONFLICT(key) DO UPDATE SET value = excluded.value")
            .bind(key)
            .bind(value)
            .execute(pool)
            .await?;
    }

    Ok(())
}
