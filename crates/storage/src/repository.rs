use async_trait::async_trait;
use chrono::{DateTime, Utc};
use oceanos_core::model::{Completion, UserProfile};
use std::sync::{Arc, Mutex};
use thiserror::Error;

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("not found")]
    NotFound,

    #[error("conflict")]
    Conflict,

    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// A completion as stored in the append-only log, with its row id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionRow {
    pub id: i64,
    pub completion: Completion,
}

impl CompletionRow {
    #[must_use]
    pub fn new(id: i64, completion: Completion) -> Self {
        Self { id, completion }
    }
}

/// Persistence contract for the learner's progress.
#[async_trait]
pub trait ProgressStore: Send + Sync {
    /// Fetch the profile, or the default profile if none was saved yet.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the profile cannot be read.
    async fn get_profile(&self) -> Result<UserProfile, StorageError>;

    /// Replace the stored profile.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the profile cannot be stored.
    async fn save_profile(&self, profile: &UserProfile) -> Result<(), StorageError>;

    /// Append a completion to the log and return its row id.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Conflict` if the session was already recorded.
    async fn append_completion(&self, completion: &Completion) -> Result<i64, StorageError>;

    /// Append `completions` and replace the profile as one unit. Either every
    /// row and the profile are stored, or nothing is.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Conflict` if any session was already recorded.
    async fn record_progress(
        &self,
        completions: &[Completion],
        profile: &UserProfile,
    ) -> Result<Vec<i64>, StorageError>;

    /// Most recent completions first.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the log cannot be read.
    async fn list_completions(&self, limit: u32) -> Result<Vec<CompletionRow>, StorageError>;

    /// Completions at or after `from`, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the log cannot be read.
    async fn completions_since(
        &self,
        from: DateTime<Utc>,
    ) -> Result<Vec<CompletionRow>, StorageError>;
}

/// Simple in-memory store for testing and `--db memory`.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    profile: Arc<Mutex<Option<UserProfile>>>,
    completions: Arc<Mutex<Vec<CompletionRow>>>,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ProgressStore for InMemoryRepository {
    async fn get_profile(&self) -> Result<UserProfile, StorageError> {
        let guard = self
            .profile
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard.clone().unwrap_or_default())
    }

    async fn save_profile(&self, profile: &UserProfile) -> Result<(), StorageError> {
        let mut guard = self
            .profile
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        *guard = Some(profile.clone());
        Ok(())
    }

    async fn append_completion(&self, completion: &Completion) -> Result<i64, StorageError> {
        let mut guard = self
            .completions
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        if guard
            .iter()
            .any(|row| row.completion.session_id == completion.session_id)
        {
            return Err(StorageError::Conflict);
        }
        let id = i64::try_from(guard.len() + 1)
            .map_err(|_| StorageError::Serialization("completion id overflow".into()))?;
        guard.push(CompletionRow::new(id, completion.clone()));
        Ok(id)
    }

    async fn record_progress(
        &self,
        completions: &[Completion],
        profile: &UserProfile,
    ) -> Result<Vec<i64>, StorageError> {
        let mut rows = self
            .completions
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        let mut stored = self
            .profile
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;

        for (i, completion) in completions.iter().enumerate() {
            let seen = rows
                .iter()
                .map(|row| &row.completion)
                .chain(&completions[..i])
                .any(|c| c.session_id == completion.session_id);
            if seen {
                return Err(StorageError::Conflict);
            }
        }

        let mut ids = Vec::with_capacity(completions.len());
        for completion in completions {
            let id = i64::try_from(rows.len() + 1)
                .map_err(|_| StorageError::Serialization("completion id overflow".into()))?;
            rows.push(CompletionRow::new(id, completion.clone()));
            ids.push(id);
        }
        *stored = Some(profile.clone());
        Ok(ids)
    }

    async fn list_completions(&self, limit: u32) -> Result<Vec<CompletionRow>, StorageError> {
        let guard = self
            .completions
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        let mut rows: Vec<_> = guard.iter().cloned().collect();
        rows.sort_by(|a, b| {
            b.completion
                .completed_at
                .cmp(&a.completion.completed_at)
                .then(b.id.cmp(&a.id))
        });
        rows.truncate(limit as usize);
        Ok(rows)
    }

    async fn completions_since(
        &self,
        from: DateTime<Utc>,
    ) -> Result<Vec<CompletionRow>, StorageError> {
        let guard = self
            .completions
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        let mut rows: Vec<_> = guard
            .iter()
            .filter(|row| row.completion.completed_at >= from)
            .cloned()
            .collect();
        rows.sort_by(|a, b| {
            a.completion
                .completed_at
                .cmp(&b.completion.completed_at)
                .then(a.id.cmp(&b.id))
        });
        Ok(rows)
    }
}

/// Aggregates the progress store behind a trait object for easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub progress: Arc<dyn ProgressStore>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        let progress: Arc<dyn ProgressStore> = Arc::new(InMemoryRepository::new());
        Self { progress }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use oceanos_core::model::{CompletionSource, SessionId};
    use oceanos_core::scoring::ScoreResult;
    use oceanos_core::time::fixed_now;

    fn daily(points: u32, at: DateTime<Utc>) -> Completion {
        Completion {
            session_id: SessionId::generate(),
            source: CompletionSource::DailyQuiz,
            score: ScoreResult {
                correct_count: points / 8,
                total_questions: 5,
                points_awarded: points,
            },
            timed_out: false,
            completed_at: at,
        }
    }

    #[tokio::test]
    async fn missing_profile_reads_as_default() {
        let repo = InMemoryRepository::new();
        assert_eq!(repo.get_profile().await.unwrap(), UserProfile::default());

        let mut profile = UserProfile::default();
        profile.points = 165;
        repo.save_profile(&profile).await.unwrap();
        assert_eq!(repo.get_profile().await.unwrap().points, 165);
    }

    #[tokio::test]
    async fn completions_list_newest_first() {
        let repo = InMemoryRepository::new();
        let t0 = fixed_now();
        repo.append_completion(&daily(8, t0)).await.unwrap();
        repo.append_completion(&daily(16, t0 + Duration::hours(1)))
            .await
            .unwrap();
        repo.append_completion(&daily(24, t0 + Duration::hours(2)))
            .await
            .unwrap();

        let rows = repo.list_completions(2).await.unwrap();
        let points: Vec<_> = rows.iter().map(|r| r.completion.points()).collect();
        assert_eq!(points, [24, 16]);

        let since = repo
            .completions_since(t0 + Duration::minutes(30))
            .await
            .unwrap();
        let points: Vec<_> = since.iter().map(|r| r.completion.points()).collect();
        assert_eq!(points, [16, 24]);
    }

    #[tokio::test]
    async fn same_session_cannot_be_recorded_twice() {
        let repo = InMemoryRepository::new();
        let completion = daily(24, fixed_now());
        repo.append_completion(&completion).await.unwrap();
        assert!(matches!(
            repo.append_completion(&completion).await,
            Err(StorageError::Conflict)
        ));
    }

    #[tokio::test]
    async fn conflicting_batch_stores_nothing() {
        let repo = InMemoryRepository::new();
        let first = daily(24, fixed_now());
        repo.append_completion(&first).await.unwrap();

        let profile = UserProfile {
            points: 999,
            ..UserProfile::default()
        };
        let batch = [daily(40, fixed_now()), first];
        assert!(matches!(
            repo.record_progress(&batch, &profile).await,
            Err(StorageError::Conflict)
        ));
        assert_eq!(repo.list_completions(10).await.unwrap().len(), 1);
        assert_eq!(repo.get_profile().await.unwrap(), UserProfile::default());

        let ok = [daily(40, fixed_now()), daily(16, fixed_now())];
        let ids = repo.record_progress(&ok, &profile).await.unwrap();
        assert_eq!(ids, [2, 3]);
        assert_eq!(repo.get_profile().await.unwrap().points, 999);
    }
}
