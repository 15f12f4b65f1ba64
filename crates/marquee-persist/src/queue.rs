//! Durable job store backed by SQLite
//!
//! The claim is a single conditional `UPDATE ... RETURNING`. SQLite
//! serializes writers, so two concurrent claims can never return the same
//! row.

use async_trait::async_trait;
use chrono::{NaiveDateTime, Utc};
use serde_json::Value;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

use marquee_queue::job::{Job, JobId, JobStatus};
use marquee_queue::store::{JobStore, QueueError};

const JOB_COLUMNS: &str =
    "id, job_type, payload, status, attempts, last_error, created_at, updated_at, processed_at";

pub struct SqliteJobStore {
    pool: SqlitePool,
}

impl SqliteJobStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    async fn ensure_exists(&self, id: JobId) -> Result<(), QueueError> {
        let row = sqlx::query("SELECT 1 FROM jobs WHERE id = ?")
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(unavailable)?;
        if row.is_none() {
            return Err(QueueError::NotFound);
        }
        Ok(())
    }
}

fn unavailable(e: sqlx::Error) -> QueueError {
    QueueError::Unavailable(e.to_string())
}

fn job_from_row(row: &SqliteRow) -> Result<Job, QueueError> {
    let id_str: String = row.try_get("id").map_err(unavailable)?;
    let id = Uuid::parse_str(&id_str)
        .map_err(|_| QueueError::Unavailable("invalid job id in store".into()))?;
    let job_type: String = row.try_get("job_type").map_err(unavailable)?;
    let payload: Value = row.try_get("payload").map_err(unavailable)?;
    let status_str: String = row.try_get("status").map_err(unavailable)?;
    let status = JobStatus::parse(&status_str).ok_or_else(|| {
        QueueError::Unavailable(format!("invalid status '{status_str}' in store"))
    })?;
    let attempts: i64 = row.try_get("attempts").unwrap_or(0);
    let last_error = row.try_get::<Option<String>, _>("last_error").ok().flatten();
    let created_at: NaiveDateTime = row.try_get("created_at").map_err(unavailable)?;
    let updated_at: NaiveDateTime = row.try_get("updated_at").map_err(unavailable)?;
    let processed_at = row
        .try_get::<Option<NaiveDateTime>, _>("processed_at")
        .ok()
        .flatten();

    Ok(Job {
        id,
        job_type,
        payload,
        status,
        attempts: attempts as u32,
        last_error,
        created_at: created_at.and_utc(),
        updated_at: updated_at.and_utc(),
        processed_at: processed_at.map(|t| t.and_utc()),
    })
}

#[async_trait]
impl JobStore for SqliteJobStore {
    async fn enqueue(&self, job_type: &str, payload: Value) -> Result<JobId, QueueError> {
        let id = Uuid::new_v4();
        // Bound timestamps carry sub-second precision; CURRENT_TIMESTAMP
        // would truncate to seconds and break oldest-first ordering.
        let now = Utc::now();

        sqlx::query(
            "INSERT INTO jobs (id, job_type, payload, status, attempts, created_at, updated_at) \
             VALUES (?, ?, ?, 'pending', 0, ?, ?)",
        )
        .bind(id.to_string())
        .bind(job_type)
        .bind(payload)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(unavailable)?;

        Ok(id)
    }

    async fn claim_next(&self) -> Result<Option<Job>, QueueError> {
        let sql = format!(
            "UPDATE jobs \
             SET status = 'processing', updated_at = ? \
             WHERE id = ( \
                 SELECT id FROM jobs \
                 WHERE status = 'pending' \
                 ORDER BY created_at ASC, id ASC \
                 LIMIT 1 \
             ) \
             RETURNING {JOB_COLUMNS}"
        );

        let row = sqlx::query(&sql)
            .bind(Utc::now())
            .fetch_optional(&self.pool)
            .await
            .map_err(unavailable)?;

        row.as_ref().map(job_from_row).transpose()
    }

    async fn mark_completed(&self, id: JobId) -> Result<(), QueueError> {
        let now = Utc::now();
        let result = sqlx::query(
            "UPDATE jobs SET status = 'completed', processed_at = ?, updated_at = ? \
             WHERE id = ? AND status = 'processing'",
        )
        .bind(now)
        .bind(now)
        .bind(id.to_string())
        .execute(&self.pool)
        .await
        .map_err(unavailable)?;

        // Zero rows means the guard held (terminal or unclaimed job) or the
        // id is unknown; only the latter is an error.
        if result.rows_affected() == 0 {
            self.ensure_exists(id).await?;
        }
        Ok(())
    }

    async fn mark_failed(&self, id: JobId, error: &str) -> Result<(), QueueError> {
        let result = sqlx::query(
            "UPDATE jobs \
             SET status = 'failed', attempts = attempts + 1, last_error = ?, updated_at = ? \
             WHERE id = ? AND status = 'processing'",
        )
        .bind(error)
        .bind(Utc::now())
        .bind(id.to_string())
        .execute(&self.pool)
        .await
        .map_err(unavailable)?;

        if result.rows_affected() == 0 {
            self.ensure_exists(id).await?;
        }
        Ok(())
    }

    async fn get(&self, id: JobId) -> Result<Job, QueueError> {
        let sql = format!("SELECT {JOB_COLUMNS} FROM jobs WHERE id = ?");
        let row = sqlx::query(&sql)
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(unavailable)?
            .ok_or(QueueError::NotFound)?;

        job_from_row(&row)
    }
}
