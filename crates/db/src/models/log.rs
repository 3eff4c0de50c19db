use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, QueryBuilder, Sqlite, SqlitePool};
use thiserror::Error;

use super::pagination::{
    OrderDirection, Paginated, effective_page_number, effective_page_size,
};
use super::run::Run;
use super::user::User;

/// Default page size for the global log listing.
pub const DEFAULT_PAGE_SIZE: i64 = 25;
/// Default page size for the per-user log listing.
pub const DEFAULT_USER_PAGE_SIZE: i64 = 16;

/// Columns the listing may be ordered by. Anything else is rejected before
/// the query is built; only these static names are ever spliced into SQL.
const SORTABLE_COLUMNS: &[&str] = &["log_id", "title", "subtype", "origin", "creation_time"];

const LOG_SELECT: &str = "SELECT l.log_id, l.title, l.subtype, l.origin, l.body, l.creation_time, \
     l.comment_fk_parent_log_id, l.comment_fk_root_log_id, \
     u.user_id, u.external_id, u.name AS user_name \
     FROM logs l \
     LEFT JOIN users u ON u.user_id = l.fk_user_id";

#[derive(Debug, Error)]
pub enum LogError {
    #[error("log with log id {0} does not exist")]
    LogNotFound(i64),
    #[error("run with run number {0} does not exist")]
    RunNotFound(i64),
    #[error("cannot order logs by unknown column `{0}`")]
    InvalidOrderBy(String),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// A logbook entry. The comment FK columns point at the entry itself right
/// after creation (every log roots its own comment thread).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Log {
    pub log_id: i64,
    pub title: String,
    pub subtype: String,
    pub origin: String,
    pub body: String,
    pub creation_time: DateTime<Utc>,
    pub comment_fk_parent_log_id: Option<i64>,
    pub comment_fk_root_log_id: Option<i64>,
    pub user: Option<User>,
}

// Raw row for the user-joined listing queries
#[derive(Debug, FromRow)]
struct LogRow {
    log_id: i64,
    title: String,
    subtype: String,
    origin: String,
    body: String,
    creation_time: DateTime<Utc>,
    comment_fk_parent_log_id: Option<i64>,
    comment_fk_root_log_id: Option<i64>,
    user_id: Option<i64>,
    external_id: Option<i64>,
    user_name: Option<String>,
}

impl From<LogRow> for Log {
    fn from(row: LogRow) -> Self {
        let user = match (row.user_id, row.external_id, row.user_name) {
            (Some(user_id), Some(external_id), Some(name)) => Some(User {
                user_id,
                external_id,
                name,
            }),
            _ => None,
        };
        Log {
            log_id: row.log_id,
            title: row.title,
            subtype: row.subtype,
            origin: row.origin,
            body: row.body,
            creation_time: row.creation_time,
            comment_fk_parent_log_id: row.comment_fk_parent_log_id,
            comment_fk_root_log_id: row.comment_fk_root_log_id,
            user,
        }
    }
}

/// An attachment owned by exactly one log; it inherits the log's creation
/// timestamp.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize)]
pub struct Attachment {
    pub file_id: i64,
    pub title: String,
    pub file_name: String,
    pub file_mime: String,
    pub file_data: String,
    pub creation_time: DateTime<Utc>,
    pub fk_log_id: i64,
}

impl Attachment {
    pub async fn for_log(pool: &SqlitePool, log_id: i64) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Attachment>(
            "SELECT file_id, title, file_name, file_mime, file_data, creation_time, fk_log_id
             FROM attachments
             WHERE fk_log_id = $1
             ORDER BY file_id ASC",
        )
        .bind(log_id)
        .fetch_all(pool)
        .await
    }
}

/// A log with its runs and attachments eagerly loaded. The listing path
/// never loads these; fetch the single record when they are needed.
#[derive(Debug, Serialize)]
pub struct LogDetail {
    #[serde(flatten)]
    pub log: Log,
    pub runs: Vec<Run>,
    pub attachments: Vec<Attachment>,
}

/// Request to create a new log entry.
#[derive(Debug, Deserialize)]
pub struct CreateLog {
    pub title: String,
    pub subtype: String,
    pub origin: String,
    #[serde(default)]
    pub body: String,
    /// Owning user id, if the entry is authored
    pub user: Option<i64>,
    /// Run number to associate at creation time
    pub run: Option<i64>,
    #[serde(default)]
    pub attachments: Vec<CreateAttachment>,
}

#[derive(Debug, Deserialize)]
pub struct CreateAttachment {
    pub title: String,
    pub file_name: String,
    pub file_mime: String,
    /// base64-encoded content
    pub file_data: String,
}

/// Filter/sort/page descriptor for log listings. Every field is optional;
/// an absent filter matches all records.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LogQuery {
    pub search_term: Option<String>,
    pub subtype: Option<String>,
    pub origin: Option<String>,
    pub start_creation_time: Option<DateTime<Utc>>,
    pub end_creation_time: Option<DateTime<Utc>>,
    pub log_id: Option<i64>,
    pub order_by: Option<String>,
    pub order_direction: Option<OrderDirection>,
    pub page_number: Option<i64>,
    pub page_size: Option<i64>,
}

fn push_filters(builder: &mut QueryBuilder<'_, Sqlite>, query: &LogQuery) {
    // Absent text filters collapse to a match-all wildcard
    builder.push(" WHERE l.title LIKE ");
    builder.push_bind(match &query.search_term {
        Some(term) => format!("%{term}%"),
        None => "%".to_string(),
    });
    builder.push(" AND l.subtype LIKE ");
    builder.push_bind(query.subtype.clone().unwrap_or_else(|| "%".to_string()));
    builder.push(" AND l.origin LIKE ");
    builder.push_bind(query.origin.clone().unwrap_or_else(|| "%".to_string()));
    if let Some(start) = query.start_creation_time {
        builder.push(" AND l.creation_time >= ");
        builder.push_bind(start);
    }
    if let Some(end) = query.end_creation_time {
        builder.push(" AND l.creation_time <= ");
        builder.push_bind(end);
    }
    if let Some(log_id) = query.log_id {
        builder.push(" AND l.log_id = ");
        builder.push_bind(log_id);
    }
}

fn push_order_and_page(
    builder: &mut QueryBuilder<'_, Sqlite>,
    order: Option<&'static str>,
    direction: OrderDirection,
    page_number: i64,
    page_size: i64,
) {
    // Stable fallback ordering keeps page slices deterministic
    let column = order.unwrap_or("log_id");
    builder.push(" ORDER BY l.");
    builder.push(column);
    builder.push(" ");
    builder.push(direction.as_sql());
    builder.push(" LIMIT ");
    builder.push_bind(page_size);
    builder.push(" OFFSET ");
    builder.push_bind((page_number - 1) * page_size);
}

impl Log {
    fn order_column(query: &LogQuery) -> Result<Option<&'static str>, LogError> {
        match query.order_by.as_deref() {
            None => Ok(None),
            Some(requested) => SORTABLE_COLUMNS
                .iter()
                .find(|column| **column == requested)
                .copied()
                .map(Some)
                .ok_or_else(|| LogError::InvalidOrderBy(requested.to_string())),
        }
    }

    /// Create a log entry. All writes happen in a single transaction: the
    /// insert, the comment-thread-root backfill (the generated id is needed
    /// for the self-referential columns), the attachment rows, and the
    /// optional run edge. A payload naming an unknown run persists nothing.
    pub async fn create(pool: &SqlitePool, data: &CreateLog) -> Result<LogDetail, LogError> {
        let creation_time = Utc::now();
        let mut tx = pool.begin().await?;

        if let Some(run_number) = data.run {
            let run_exists: Option<i64> =
                sqlx::query_scalar("SELECT run_number FROM runs WHERE run_number = $1")
                    .bind(run_number)
                    .fetch_optional(&mut *tx)
                    .await?;
            if run_exists.is_none() {
                return Err(LogError::RunNotFound(run_number));
            }
        }

        let log_id: i64 = sqlx::query_scalar(
            "INSERT INTO logs (title, subtype, origin, body, creation_time, fk_user_id)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING log_id",
        )
        .bind(&data.title)
        .bind(&data.subtype)
        .bind(&data.origin)
        .bind(&data.body)
        .bind(creation_time)
        .bind(data.user)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query(
            "UPDATE logs
             SET comment_fk_parent_log_id = $1, comment_fk_root_log_id = $1
             WHERE log_id = $1",
        )
        .bind(log_id)
        .execute(&mut *tx)
        .await?;

        for attachment in &data.attachments {
            sqlx::query(
                "INSERT INTO attachments (title, file_name, file_mime, file_data, creation_time, fk_log_id)
                 VALUES ($1, $2, $3, $4, $5, $6)",
            )
            .bind(&attachment.title)
            .bind(&attachment.file_name)
            .bind(&attachment.file_mime)
            .bind(&attachment.file_data)
            .bind(creation_time)
            .bind(log_id)
            .execute(&mut *tx)
            .await?;
        }

        if let Some(run_number) = data.run {
            sqlx::query("INSERT INTO run_logs (run_number, log_id) VALUES ($1, $2)")
                .bind(run_number)
                .bind(log_id)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;

        Self::find_by_id(pool, log_id)
            .await?
            .ok_or(LogError::Database(sqlx::Error::RowNotFound))
    }

    /// Fetch one log with its runs, attachments, and owning user populated.
    pub async fn find_by_id(pool: &SqlitePool, log_id: i64) -> Result<Option<LogDetail>, LogError> {
        let sql = format!("{LOG_SELECT} WHERE l.log_id = $1");
        let row: Option<LogRow> = sqlx::query_as(&sql)
            .bind(log_id)
            .fetch_optional(pool)
            .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let runs = sqlx::query_as::<_, Run>(
            "SELECT r.run_number, r.run_type, r.run_quality, r.time_start, r.time_end, r.creation_time
             FROM runs r
             INNER JOIN run_logs rl ON rl.run_number = r.run_number
             WHERE rl.log_id = $1
             ORDER BY r.run_number ASC",
        )
        .bind(log_id)
        .fetch_all(pool)
        .await?;

        let attachments = Attachment::for_log(pool, log_id).await?;

        Ok(Some(LogDetail {
            log: Log::from(row),
            runs,
            attachments,
        }))
    }

    /// Page through logs matching the filter. Returns the page plus the
    /// total match count independent of pagination. The owning user is
    /// loaded inline; runs are not.
    pub async fn list(pool: &SqlitePool, query: &LogQuery) -> Result<Paginated<Log>, LogError> {
        let order = Self::order_column(query)?;
        let direction = query.order_direction.unwrap_or_default();
        let page_number = effective_page_number(query.page_number);
        let page_size = effective_page_size(query.page_size, DEFAULT_PAGE_SIZE);

        let mut count = QueryBuilder::<Sqlite>::new("SELECT COUNT(*) FROM logs l");
        push_filters(&mut count, query);
        let total_count: i64 = count.build_query_scalar().fetch_one(pool).await?;

        let mut builder = QueryBuilder::<Sqlite>::new(LOG_SELECT);
        push_filters(&mut builder, query);
        push_order_and_page(&mut builder, order, direction, page_number, page_size);
        let rows: Vec<LogRow> = builder.build_query_as().fetch_all(pool).await?;

        Ok(Paginated {
            records: rows.into_iter().map(Log::from).collect(),
            total_count,
            page_number,
            page_size,
        })
    }

    /// Page through one user's logs. Sort and pagination behave exactly as in
    /// [`Log::list`]; the filter fields of the descriptor are not applied.
    pub async fn list_by_user(
        pool: &SqlitePool,
        user_id: i64,
        query: &LogQuery,
    ) -> Result<Paginated<Log>, LogError> {
        let order = Self::order_column(query)?;
        let direction = query.order_direction.unwrap_or_default();
        let page_number = effective_page_number(query.page_number);
        let page_size = effective_page_size(query.page_size, DEFAULT_USER_PAGE_SIZE);

        let total_count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM logs WHERE fk_user_id = $1")
                .bind(user_id)
                .fetch_one(pool)
                .await?;

        let mut builder = QueryBuilder::<Sqlite>::new(LOG_SELECT);
        builder.push(" WHERE l.fk_user_id = ");
        builder.push_bind(user_id);
        push_order_and_page(&mut builder, order, direction, page_number, page_size);
        let rows: Vec<LogRow> = builder.build_query_as().fetch_all(pool).await?;

        Ok(Paginated {
            records: rows.into_iter().map(Log::from).collect(),
            total_count,
            page_number,
            page_size,
        })
    }

    /// Associate a run with an existing log. Both sides must exist;
    /// re-linking an existing pair is a no-op (composite PK on run_logs).
    pub async fn link_run(pool: &SqlitePool, log_id: i64, run_number: i64) -> Result<(), LogError> {
        let log_exists: Option<i64> =
            sqlx::query_scalar("SELECT log_id FROM logs WHERE log_id = $1")
                .bind(log_id)
                .fetch_optional(pool)
                .await?;
        if log_exists.is_none() {
            return Err(LogError::LogNotFound(log_id));
        }

        let run_exists: Option<i64> =
            sqlx::query_scalar("SELECT run_number FROM runs WHERE run_number = $1")
                .bind(run_number)
                .fetch_optional(pool)
                .await?;
        if run_exists.is_none() {
            return Err(LogError::RunNotFound(run_number));
        }

        sqlx::query("INSERT OR IGNORE INTO run_logs (run_number, log_id) VALUES ($1, $2)")
            .bind(run_number)
            .bind(log_id)
            .execute(pool)
            .await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::run::CreateRun;
    use crate::models::user::CreateUser;
    use crate::test_utils::create_test_pool;

    async fn seed_run(pool: &SqlitePool, run_number: i64) -> Run {
        Run::create(
            pool,
            &CreateRun {
                run_number,
                run_type: "physics".to_string(),
                run_quality: None,
                time_start: None,
                time_end: None,
            },
        )
        .await
        .unwrap()
    }

    async fn seed_user(pool: &SqlitePool, name: &str) -> User {
        User::create(
            pool,
            &CreateUser {
                external_id: 1,
                name: name.to_string(),
            },
        )
        .await
        .unwrap()
    }

    fn new_log(title: &str) -> CreateLog {
        CreateLog {
            title: title.to_string(),
            subtype: "run".to_string(),
            origin: "human".to_string(),
            body: String::new(),
            user: None,
            run: None,
            attachments: Vec::new(),
        }
    }

    async fn count_rows(pool: &SqlitePool, table: &str) -> i64 {
        let sql = format!("SELECT COUNT(*) FROM {table}");
        sqlx::query_scalar(&sql).fetch_one(pool).await.unwrap()
    }

    #[tokio::test]
    async fn test_create_roots_own_comment_thread() {
        let (pool, _temp_dir) = create_test_pool().await;

        let detail = Log::create(&pool, &new_log("End of fill")).await.unwrap();

        assert_eq!(detail.log.comment_fk_parent_log_id, Some(detail.log.log_id));
        assert_eq!(detail.log.comment_fk_root_log_id, Some(detail.log.log_id));
    }

    #[tokio::test]
    async fn test_create_with_valid_run_links_exactly_that_run() {
        let (pool, _temp_dir) = create_test_pool().await;

        let run = seed_run(&pool, 42).await;
        let mut data = new_log("Calibration run");
        data.run = Some(42);

        let detail = Log::create(&pool, &data).await.unwrap();
        assert_eq!(detail.runs, vec![run]);
    }

    #[tokio::test]
    async fn test_create_with_unknown_run_persists_nothing() {
        let (pool, _temp_dir) = create_test_pool().await;

        let mut data = new_log("Calibration run");
        data.run = Some(42);
        data.attachments.push(CreateAttachment {
            title: "plot".to_string(),
            file_name: "plot.png".to_string(),
            file_mime: "image/png".to_string(),
            file_data: "aGVsbG8=".to_string(),
        });

        let err = Log::create(&pool, &data).await.unwrap_err();
        assert!(matches!(err, LogError::RunNotFound(42)));
        assert!(err.to_string().contains("42"));

        assert_eq!(count_rows(&pool, "logs").await, 0);
        assert_eq!(count_rows(&pool, "attachments").await, 0);
        assert_eq!(count_rows(&pool, "run_logs").await, 0);
    }

    #[tokio::test]
    async fn test_create_stamps_attachments_with_log_creation_time() {
        let (pool, _temp_dir) = create_test_pool().await;

        let mut data = new_log("Quench analysis");
        data.attachments.push(CreateAttachment {
            title: "trace".to_string(),
            file_name: "trace.csv".to_string(),
            file_mime: "text/csv".to_string(),
            file_data: "MSwyLDM=".to_string(),
        });
        data.attachments.push(CreateAttachment {
            title: "summary".to_string(),
            file_name: "summary.txt".to_string(),
            file_mime: "text/plain".to_string(),
            file_data: "b2s=".to_string(),
        });

        let detail = Log::create(&pool, &data).await.unwrap();
        assert_eq!(detail.attachments.len(), 2);
        for attachment in &detail.attachments {
            assert_eq!(attachment.creation_time, detail.log.creation_time);
            assert_eq!(attachment.fk_log_id, detail.log.log_id);
        }
    }

    #[tokio::test]
    async fn test_create_with_user_populates_owner() {
        let (pool, _temp_dir) = create_test_pool().await;

        let user = seed_user(&pool, "Anna").await;
        let mut data = new_log("Shift summary");
        data.user = Some(user.user_id);

        let detail = Log::create(&pool, &data).await.unwrap();
        assert_eq!(detail.log.user, Some(user));
    }

    #[tokio::test]
    async fn test_find_by_id_loads_runs_and_user() {
        let (pool, _temp_dir) = create_test_pool().await;

        let user = seed_user(&pool, "Anna").await;
        let run = seed_run(&pool, 7).await;
        let mut data = new_log("Detector note");
        data.user = Some(user.user_id);
        data.run = Some(7);
        let created = Log::create(&pool, &data).await.unwrap();

        let detail = Log::find_by_id(&pool, created.log.log_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(detail.log.user, Some(user));
        assert_eq!(detail.runs, vec![run]);

        assert!(Log::find_by_id(&pool, 9999).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_list_without_filters_returns_everything() {
        let (pool, _temp_dir) = create_test_pool().await;

        for title in ["one", "two", "three"] {
            Log::create(&pool, &new_log(title)).await.unwrap();
        }

        let page = Log::list(&pool, &LogQuery::default()).await.unwrap();
        assert_eq!(page.records.len(), 3);
        assert_eq!(page.total_count, 3);
        assert_eq!(page.page_number, 1);
        assert_eq!(page.page_size, DEFAULT_PAGE_SIZE);
    }

    #[tokio::test]
    async fn test_list_title_substring_filter() {
        let (pool, _temp_dir) = create_test_pool().await;

        Log::create(&pool, &new_log("Calibration run")).await.unwrap();
        Log::create(&pool, &new_log("Cosmics")).await.unwrap();
        Log::create(&pool, &new_log("Recalibration")).await.unwrap();

        let query = LogQuery {
            search_term: Some("alib".to_string()),
            ..Default::default()
        };
        let page = Log::list(&pool, &query).await.unwrap();
        let titles: Vec<&str> = page.records.iter().map(|l| l.title.as_str()).collect();
        assert_eq!(titles, vec!["Calibration run", "Recalibration"]);
        assert_eq!(page.total_count, 2);
    }

    #[tokio::test]
    async fn test_list_subtype_and_origin_filters() {
        let (pool, _temp_dir) = create_test_pool().await;

        let mut announcement = new_log("Beam dump");
        announcement.subtype = "announcement".to_string();
        announcement.origin = "process".to_string();
        Log::create(&pool, &announcement).await.unwrap();

        let mut human_announcement = new_log("Magnet swap");
        human_announcement.subtype = "announcement".to_string();
        Log::create(&pool, &human_announcement).await.unwrap();

        Log::create(&pool, &new_log("Plain run note")).await.unwrap();

        // subtype alone: origin differences never exclude
        let query = LogQuery {
            subtype: Some("announcement".to_string()),
            ..Default::default()
        };
        let page = Log::list(&pool, &query).await.unwrap();
        assert_eq!(page.total_count, 2);

        // both filters conjoin
        let query = LogQuery {
            subtype: Some("announcement".to_string()),
            origin: Some("process".to_string()),
            ..Default::default()
        };
        let page = Log::list(&pool, &query).await.unwrap();
        assert_eq!(page.total_count, 1);
        assert_eq!(page.records[0].title, "Beam dump");
    }

    #[tokio::test]
    async fn test_list_creation_time_range_is_inclusive() {
        let (pool, _temp_dir) = create_test_pool().await;

        let mut times = Vec::new();
        for title in ["first", "second", "third"] {
            let detail = Log::create(&pool, &new_log(title)).await.unwrap();
            times.push(detail.log.creation_time);
            tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        }

        let query = LogQuery {
            start_creation_time: Some(times[1]),
            ..Default::default()
        };
        let page = Log::list(&pool, &query).await.unwrap();
        let titles: Vec<&str> = page.records.iter().map(|l| l.title.as_str()).collect();
        assert_eq!(titles, vec!["second", "third"]);

        let query = LogQuery {
            end_creation_time: Some(times[1]),
            ..Default::default()
        };
        let page = Log::list(&pool, &query).await.unwrap();
        let titles: Vec<&str> = page.records.iter().map(|l| l.title.as_str()).collect();
        assert_eq!(titles, vec!["first", "second"]);

        let query = LogQuery {
            start_creation_time: Some(times[1]),
            end_creation_time: Some(times[1]),
            ..Default::default()
        };
        let page = Log::list(&pool, &query).await.unwrap();
        assert_eq!(page.total_count, 1);
        assert_eq!(page.records[0].title, "second");
    }

    #[tokio::test]
    async fn test_list_log_id_filter_restricts_to_one() {
        let (pool, _temp_dir) = create_test_pool().await;

        let first = Log::create(&pool, &new_log("first")).await.unwrap();
        Log::create(&pool, &new_log("second")).await.unwrap();

        let query = LogQuery {
            log_id: Some(first.log.log_id),
            ..Default::default()
        };
        let page = Log::list(&pool, &query).await.unwrap();
        assert_eq!(page.total_count, 1);
        assert_eq!(page.records[0].log_id, first.log.log_id);
    }

    #[tokio::test]
    async fn test_list_pagination_slices_and_total_invariant() {
        let (pool, _temp_dir) = create_test_pool().await;

        for i in 1..=5 {
            Log::create(&pool, &new_log(&format!("entry {i}"))).await.unwrap();
        }

        let query = LogQuery {
            order_by: Some("log_id".to_string()),
            page_number: Some(2),
            page_size: Some(2),
            ..Default::default()
        };
        let page = Log::list(&pool, &query).await.unwrap();
        let titles: Vec<&str> = page.records.iter().map(|l| l.title.as_str()).collect();
        assert_eq!(titles, vec!["entry 3", "entry 4"]);
        assert_eq!(page.total_count, 5);
        assert_eq!(page.page_number, 2);
        assert_eq!(page.page_size, 2);

        // last, partial page; total stays invariant
        let query = LogQuery {
            order_by: Some("log_id".to_string()),
            page_number: Some(3),
            page_size: Some(2),
            ..Default::default()
        };
        let page = Log::list(&pool, &query).await.unwrap();
        assert_eq!(page.records.len(), 1);
        assert_eq!(page.total_count, 5);
    }

    #[tokio::test]
    async fn test_list_second_page_of_filtered_matches() {
        let (pool, _temp_dir) = create_test_pool().await;

        Log::create(&pool, &new_log("Calibration run")).await.unwrap();
        Log::create(&pool, &new_log("Cosmics")).await.unwrap();
        let second_match = Log::create(&pool, &new_log("Calibration check"))
            .await
            .unwrap();

        let query = LogQuery {
            search_term: Some("Calib".to_string()),
            order_by: Some("log_id".to_string()),
            page_number: Some(2),
            page_size: Some(1),
            ..Default::default()
        };
        let page = Log::list(&pool, &query).await.unwrap();
        assert_eq!(page.records.len(), 1);
        assert_eq!(page.records[0].log_id, second_match.log.log_id);
        assert_eq!(page.total_count, 2);
    }

    #[tokio::test]
    async fn test_list_orders_descending_on_request() {
        let (pool, _temp_dir) = create_test_pool().await;

        for title in ["bravo", "alpha", "charlie"] {
            Log::create(&pool, &new_log(title)).await.unwrap();
        }

        let query = LogQuery {
            order_by: Some("title".to_string()),
            order_direction: Some(OrderDirection::Desc),
            ..Default::default()
        };
        let page = Log::list(&pool, &query).await.unwrap();
        let titles: Vec<&str> = page.records.iter().map(|l| l.title.as_str()).collect();
        assert_eq!(titles, vec!["charlie", "bravo", "alpha"]);
    }

    #[tokio::test]
    async fn test_list_rejects_unknown_order_column() {
        let (pool, _temp_dir) = create_test_pool().await;

        let query = LogQuery {
            order_by: Some("file_data; DROP TABLE logs".to_string()),
            ..Default::default()
        };
        let err = Log::list(&pool, &query).await.unwrap_err();
        assert!(matches!(err, LogError::InvalidOrderBy(_)));
    }

    #[tokio::test]
    async fn test_list_by_user_scopes_and_defaults_page_size() {
        let (pool, _temp_dir) = create_test_pool().await;

        let anna = seed_user(&pool, "Anna").await;
        let boris = seed_user(&pool, "Boris").await;

        for title in ["a1", "a2", "a3"] {
            let mut data = new_log(title);
            data.user = Some(anna.user_id);
            Log::create(&pool, &data).await.unwrap();
        }
        let mut data = new_log("b1");
        data.user = Some(boris.user_id);
        Log::create(&pool, &data).await.unwrap();
        Log::create(&pool, &new_log("anonymous")).await.unwrap();

        let page = Log::list_by_user(&pool, anna.user_id, &LogQuery::default())
            .await
            .unwrap();
        assert_eq!(page.records.len(), 3);
        assert_eq!(page.total_count, 3);
        assert_eq!(page.page_size, DEFAULT_USER_PAGE_SIZE);
        assert!(page.records.iter().all(|l| l.user.as_ref() == Some(&anna)));
    }

    #[tokio::test]
    async fn test_link_run_appends_preserving_existing() {
        let (pool, _temp_dir) = create_test_pool().await;

        let first = seed_run(&pool, 1).await;
        let second = seed_run(&pool, 2).await;
        let mut data = new_log("multi-run study");
        data.run = Some(1);
        let created = Log::create(&pool, &data).await.unwrap();

        Log::link_run(&pool, created.log.log_id, 2).await.unwrap();

        let detail = Log::find_by_id(&pool, created.log.log_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(detail.runs, vec![first, second]);
    }

    #[tokio::test]
    async fn test_link_run_twice_keeps_one_edge() {
        let (pool, _temp_dir) = create_test_pool().await;

        seed_run(&pool, 1).await;
        let created = Log::create(&pool, &new_log("note")).await.unwrap();

        Log::link_run(&pool, created.log.log_id, 1).await.unwrap();
        Log::link_run(&pool, created.log.log_id, 1).await.unwrap();

        assert_eq!(count_rows(&pool, "run_logs").await, 1);
    }

    #[tokio::test]
    async fn test_link_run_missing_sides_leave_storage_unchanged() {
        let (pool, _temp_dir) = create_test_pool().await;

        let err = Log::link_run(&pool, 5, 1).await.unwrap_err();
        assert!(matches!(err, LogError::LogNotFound(5)));
        assert!(err.to_string().contains("5"));

        let created = Log::create(&pool, &new_log("note")).await.unwrap();
        let err = Log::link_run(&pool, created.log.log_id, 42).await.unwrap_err();
        assert!(matches!(err, LogError::RunNotFound(42)));
        assert!(err.to_string().contains("42"));

        assert_eq!(count_rows(&pool, "run_logs").await, 0);
    }
}
