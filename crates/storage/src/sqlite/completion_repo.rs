use chrono::{DateTime, Utc};
use oceanos_core::model::{Completion, UserProfile};

use super::SqliteRepository;
use super::mapping::map_completion_row;
use super::profile_repo::upsert_profile;
use crate::repository::{CompletionRow, ProgressStore, StorageError};

const COMPLETION_COLUMNS: &str = r"
    id, session_id, kind, source_id, correct, total, points, timed_out, completed_at
";

#[async_trait::async_trait]
impl ProgressStore for SqliteRepository {
    async fn get_profile(&self) -> Result<UserProfile, StorageError> {
        self.load_profile().await
    }

    async fn save_profile(&self, profile: &UserProfile) -> Result<(), StorageError> {
        self.store_profile(profile).await
    }

    async fn append_completion(&self, completion: &Completion) -> Result<i64, StorageError> {
        insert_completion(&self.pool, completion).await
    }

    async fn record_progress(
        &self,
        completions: &[Completion],
        profile: &UserProfile,
    ) -> Result<Vec<i64>, StorageError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| StorageError::Connection(e.to_string()))?;

        let mut ids = Vec::with_capacity(completions.len());
        for completion in completions {
            ids.push(insert_completion(&mut *tx, completion).await?);
        }
        upsert_profile(&mut *tx, profile).await?;

        tx.commit()
            .await
            .map_err(|e| StorageError::Connection(e.to_string()))?;

        Ok(ids)
    }

    async fn list_completions(&self, limit: u32) -> Result<Vec<CompletionRow>, StorageError> {
        let sql = format!(
            "SELECT {COMPLETION_COLUMNS} FROM quiz_completions \
             ORDER BY completed_at DESC, id DESC LIMIT ?1"
        );
        let rows = sqlx::query(&sql)
            .bind(i64::from(limit))
            .fetch_all(&self.pool)
            .await
            .map_err(|e| StorageError::Connection(e.to_string()))?;

        rows.iter().map(map_completion_row).collect()
    }

    async fn completions_since(
        &self,
        from: DateTime<Utc>,
    ) -> Result<Vec<CompletionRow>, StorageError> {
        let sql = format!(
            "SELECT {COMPLETION_COLUMNS} FROM quiz_completions \
             WHERE completed_at >= ?1 ORDER BY completed_at ASC, id ASC"
        );
        let rows = sqlx::query(&sql)
            .bind(from)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| StorageError::Connection(e.to_string()))?;

        rows.iter().map(map_completion_row).collect()
    }
}

async fn insert_completion<'e, E>(
    executor: E,
    completion: &Completion,
) -> Result<i64, StorageError>
where
    E: sqlx::SqliteExecutor<'e>,
{
    let res = sqlx::query(
        r"
            INSERT INTO quiz_completions (
                session_id, kind, source_id, correct, total,
                points, timed_out, completed_at
            )
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
        ",
    )
    .bind(completion.session_id.to_string())
    .bind(completion.source.kind())
    .bind(completion.source.source_id())
    .bind(i64::from(completion.score.correct_count))
    .bind(i64::from(completion.score.total_questions))
    .bind(i64::from(completion.score.points_awarded))
    .bind(completion.timed_out)
    .bind(completion.completed_at)
    .execute(executor)
    .await
    .map_err(|e| match e {
        sqlx::Error::Database(db) if db.is_unique_violation() => StorageError::Conflict,
        other => StorageError::Connection(other.to_string()),
    })?;

    Ok(res.last_insert_rowid())
}
