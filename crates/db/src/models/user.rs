use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum UserError {
    #[error("user with user id {0} does not exist")]
    NotFound(i64),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// The author of a log entry. `external_id` is the identifier assigned by the
/// upstream identity provider.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct User {
    pub user_id: i64,
    pub external_id: i64,
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct CreateUser {
    pub external_id: i64,
    pub name: String,
}

impl User {
    pub async fn create(pool: &SqlitePool, data: &CreateUser) -> Result<Self, UserError> {
        let user = sqlx::query_as::<_, User>(
            "INSERT INTO users (external_id, name)
             VALUES ($1, $2)
             RETURNING user_id, external_id, name",
        )
        .bind(data.external_id)
        .bind(&data.name)
        .fetch_one(pool)
        .await?;

        Ok(user)
    }

    pub async fn find_by_id(pool: &SqlitePool, user_id: i64) -> Result<Option<Self>, UserError> {
        let user = sqlx::query_as::<_, User>(
            "SELECT user_id, external_id, name FROM users WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_optional(pool)
        .await?;

        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::create_test_pool;

    #[tokio::test]
    async fn test_create_and_find_user() {
        let (pool, _temp_dir) = create_test_pool().await;

        let created = User::create(
            &pool,
            &CreateUser {
                external_id: 4711,
                name: "Anna".to_string(),
            },
        )
        .await
        .unwrap();

        assert_eq!(created.external_id, 4711);
        assert_eq!(created.name, "Anna");

        let found = User::find_by_id(&pool, created.user_id).await.unwrap();
        assert_eq!(found, Some(created));
    }

    #[tokio::test]
    async fn test_find_missing_user() {
        let (pool, _temp_dir) = create_test_pool().await;

        let found = User::find_by_id(&pool, 999).await.unwrap();
        assert!(found.is_none());
    }
}
