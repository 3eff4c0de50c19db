use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool};
use thiserror::Error;

use super::pagination::{Paginated, effective_page_number, effective_page_size};

/// Default page size for run listings.
pub const DEFAULT_PAGE_SIZE: i64 = 25;

#[derive(Debug, Error)]
pub enum RunError {
    #[error("run with run number {0} does not exist")]
    NotFound(i64),
    #[error("run with run number {0} already exists")]
    AlreadyExists(i64),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// An experiment/process record referenced by logs and tags. The run number
/// is assigned by the data-taking system, so creation takes it as input
/// instead of generating one.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct Run {
    pub run_number: i64,
    pub run_type: String,
    pub run_quality: Option<String>,
    pub time_start: Option<DateTime<Utc>>,
    pub time_end: Option<DateTime<Utc>>,
    pub creation_time: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct CreateRun {
    pub run_number: i64,
    pub run_type: String,
    pub run_quality: Option<String>,
    pub time_start: Option<DateTime<Utc>>,
    pub time_end: Option<DateTime<Utc>>,
}

#[derive(Debug, Default, Deserialize)]
pub struct RunQuery {
    pub page_number: Option<i64>,
    pub page_size: Option<i64>,
}

impl Run {
    pub async fn create(pool: &SqlitePool, data: &CreateRun) -> Result<Self, RunError> {
        let existing: Option<i64> =
            sqlx::query_scalar("SELECT run_number FROM runs WHERE run_number = $1")
                .bind(data.run_number)
                .fetch_optional(pool)
                .await?;
        if existing.is_some() {
            return Err(RunError::AlreadyExists(data.run_number));
        }

        let run = sqlx::query_as::<_, Run>(
            "INSERT INTO runs (run_number, run_type, run_quality, time_start, time_end, creation_time)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING run_number, run_type, run_quality, time_start, time_end, creation_time",
        )
        .bind(data.run_number)
        .bind(&data.run_type)
        .bind(&data.run_quality)
        .bind(data.time_start)
        .bind(data.time_end)
        .bind(Utc::now())
        .fetch_one(pool)
        .await?;

        Ok(run)
    }

    pub async fn find_by_number(
        pool: &SqlitePool,
        run_number: i64,
    ) -> Result<Option<Self>, RunError> {
        let run = sqlx::query_as::<_, Run>(
            "SELECT run_number, run_type, run_quality, time_start, time_end, creation_time
             FROM runs
             WHERE run_number = $1",
        )
        .bind(run_number)
        .fetch_optional(pool)
        .await?;

        Ok(run)
    }

    pub async fn list(pool: &SqlitePool, query: &RunQuery) -> Result<Paginated<Self>, RunError> {
        let page_number = effective_page_number(query.page_number);
        let page_size = effective_page_size(query.page_size, DEFAULT_PAGE_SIZE);

        let total_count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM runs")
            .fetch_one(pool)
            .await?;

        let records = sqlx::query_as::<_, Run>(
            "SELECT run_number, run_type, run_quality, time_start, time_end, creation_time
             FROM runs
             ORDER BY run_number ASC
             LIMIT $1 OFFSET $2",
        )
        .bind(page_size)
        .bind((page_number - 1) * page_size)
        .fetch_all(pool)
        .await?;

        Ok(Paginated {
            records,
            total_count,
            page_number,
            page_size,
        })
    }
}
