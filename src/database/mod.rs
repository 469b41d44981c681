// file: src/database/mod.rs

use crate::error::AppResult;
use crate::models::{CalendarEvent, DateRange, NewEvent, Settings};
use crate::store::EventStore;
use crate::utils::logging::log_database_operation;
use anyhow::{Context, Result};
use async_trait::async_trait;
use log::info;
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::{migrate::MigrateDatabase, sqlite::SqlitePool, Sqlite};
use std::path::Path;
use std::time::Instant;

pub mod events;
pub mod settings;

#[derive(Clone)]
pub struct Database {
    pub pool: SqlitePool,
}

impl Database {
    /// Open (creating if needed) the database file at `path` and apply the schema.
    pub async fn new(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create {}", parent.display()))?;
            }
        }
        let db_url = format!("sqlite:{}?mode=rwc", path.display());

        let db_exists = Sqlite::database_exists(&db_url)
            .await
            .context("Failed to check if database exists")?;
        if !db_exists {
            info!("Creating database at {}", path.display());
            Sqlite::create_database(&db_url)
                .await
                .context("Failed to create database")?;
        }

        let pool = SqlitePool::connect(&db_url)
            .await
            .context("Failed to connect to database")?;

        Self::from_pool(pool).await
    }

    /// Private in-memory database. One connection, so every query sees the
    /// same data.
    pub async fn in_memory() -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .context("Failed to open in-memory database")?;

        Self::from_pool(pool).await
    }

    async fn from_pool(pool: SqlitePool) -> Result<Self> {
        run_schema(&pool).await.context("Failed to run database schema")?;

        info!("Database initialized successfully");
        Ok(Database { pool })
    }

    // --- Settings Delegates ---

    pub async fn get_settings(&self) -> AppResult<Settings> {
        settings::get(&self.pool).await
    }

    pub async fn update_settings(&self, settings: &Settings) -> AppResult<()> {
        settings::update(&self.pool, settings).await
    }
}

#[async_trait]
impl EventStore for Database {
    async fn fetch_by_range(&self, range: DateRange) -> AppResult<Vec<CalendarEvent>> {
        let started = Instant::now();
        let events = events::get_by_range(&self.pool, range).await?;
        log_database_operation("SELECT range", "events", started.elapsed().as_millis() as u64);
        Ok(events)
    }

    async fn get(&self, id: &str) -> AppResult<Option<CalendarEvent>> {
        events::get(&self.pool, id).await
    }

    async fn insert(&self, event: NewEvent) -> AppResult<CalendarEvent> {
        let started = Instant::now();
        let event = events::insert(&self.pool, event).await?;
        log_database_operation("INSERT", "events", started.elapsed().as_millis() as u64);
        Ok(event)
    }

    async fn replace(&self, id: &str, event: CalendarEvent) -> AppResult<CalendarEvent> {
        let started = Instant::now();
        let event = events::replace(&self.pool, id, event).await?;
        log_database_operation("UPDATE", "events", started.elapsed().as_millis() as u64);
        Ok(event)
    }

    async fn remove(&self, id: &str) -> AppResult<()> {
        let started = Instant::now();
        events::delete(&self.pool, id).await?;
        log_database_operation("DELETE", "events", started.elapsed().as_millis() as u64);
        Ok(())
    }
}

pub(crate) async fn run_schema(pool: &SqlitePool) -> Result<()> {
    let schema = include_str!("schema.sql");

    let mut current_statement = String::new();
    let mut in_trigger = false;

    for line in schema.lines() {
        let trimmed = line.trim();
        if trimmed.starts_with("--") || trimmed.is_empty() {
            continue;
        }

        if trimmed.to_uppercase().starts_with("CREATE TRIGGER") {
            in_trigger = true;
        }

        current_statement.push_str(line);
        current_statement.push('\n');

        if trimmed.ends_with(';') {
            if in_trigger {
                if trimmed.to_uppercase() == "END;" {
                    in_trigger = false;
                    sqlx::query(&current_statement).execute(pool).await?;
                    current_statement.clear();
                }
            } else {
                sqlx::query(&current_statement).execute(pool).await?;
                current_statement.clear();
            }
        }
    }
    Ok(())
}
