use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool};
use thiserror::Error;

use super::run::Run;

#[derive(Debug, Error)]
pub enum TagError {
    #[error("tag with tag id {0} does not exist")]
    TagNotFound(i64),
    #[error("run with run number {0} does not exist")]
    RunNotFound(i64),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// A free-form label attachable to runs.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct Tag {
    pub tag_id: i64,
    pub tag_text: String,
}

#[derive(Debug, Deserialize)]
pub struct CreateTag {
    pub tag_text: String,
}

/// A tag with its associated runs eagerly loaded.
#[derive(Debug, Serialize)]
pub struct TagDetail {
    #[serde(flatten)]
    pub tag: Tag,
    pub runs: Vec<Run>,
}

impl Tag {
    pub async fn create(pool: &SqlitePool, data: &CreateTag) -> Result<Self, TagError> {
        let tag = sqlx::query_as::<_, Tag>(
            "INSERT INTO tags (tag_text)
             VALUES ($1)
             RETURNING tag_id, tag_text",
        )
        .bind(&data.tag_text)
        .fetch_one(pool)
        .await?;

        Ok(tag)
    }

    pub async fn list(pool: &SqlitePool) -> Result<Vec<Self>, TagError> {
        let tags = sqlx::query_as::<_, Tag>(
            "SELECT tag_id, tag_text FROM tags ORDER BY tag_text ASC",
        )
        .fetch_all(pool)
        .await?;

        Ok(tags)
    }

    /// Fetch a single tag with its runs populated.
    pub async fn find_by_id(pool: &SqlitePool, tag_id: i64) -> Result<Option<TagDetail>, TagError> {
        let tag = sqlx::query_as::<_, Tag>("SELECT tag_id, tag_text FROM tags WHERE tag_id = $1")
            .bind(tag_id)
            .fetch_optional(pool)
            .await?;

        let Some(tag) = tag else {
            return Ok(None);
        };

        let runs = sqlx::query_as::<_, Run>(
            "SELECT r.run_number, r.run_type, r.run_quality, r.time_start, r.time_end, r.creation_time
             FROM runs r
             INNER JOIN run_tags rt ON rt.run_number = r.run_number
             WHERE rt.tag_id = $1
             ORDER BY r.run_number ASC",
        )
        .bind(tag_id)
        .fetch_all(pool)
        .await?;

        Ok(Some(TagDetail { tag, runs }))
    }

    /// Associate a run with a tag. Both sides must exist; re-linking an
    /// existing pair is a no-op (composite PK on run_tags).
    pub async fn link_run(pool: &SqlitePool, tag_id: i64, run_number: i64) -> Result<(), TagError> {
        let tag_exists: Option<i64> = sqlx::query_scalar("SELECT tag_id FROM tags WHERE tag_id = $1")
            .bind(tag_id)
            .fetch_optional(pool)
            .await?;
        if tag_exists.is_none() {
            return Err(TagError::TagNotFound(tag_id));
        }

        let run_exists: Option<i64> =
            sqlx::query_scalar("SELECT run_number FROM runs WHERE run_number = $1")
                .bind(run_number)
                .fetch_optional(pool)
                .await?;
        if run_exists.is_none() {
            return Err(TagError::RunNotFound(run_number));
        }

        sqlx::query("INSERT OR IGNORE INTO run_tags (run_number, tag_id) VALUES ($1, $2)")
            .bind(run_number)
            .bind(tag_id)
            .execute(pool)
            .await?;

        Ok(())
    }
}
