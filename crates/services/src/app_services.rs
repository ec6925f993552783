use std::sync::Arc;

use oceanos_core::model::QuizSettings;
use storage::content::ContentRepository;
use storage::repository::Storage;

use crate::Clock;
use crate::challenge_service::ChallengeService;
use crate::error::AppServicesError;
use crate::progress_service::{ProgressService, ProgressSink};
use crate::quiz_service::QuizService;

/// Database URL that selects the in-memory store.
pub const MEMORY_DB: &str = "memory";

/// Assembles app-facing services over one storage backend.
#[derive(Clone)]
pub struct AppServices {
    content: Arc<dyn ContentRepository>,
    progress: Arc<ProgressService>,
    quizzes: Arc<QuizService>,
    challenges: Arc<ChallengeService>,
}

impl AppServices {
    /// Build services backed by `SQLite`, or by memory when `db_url` is
    /// [`MEMORY_DB`].
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if storage initialization or progress
    /// replay fails.
    pub async fn open(
        db_url: &str,
        clock: Clock,
        settings: QuizSettings,
        content: Arc<dyn ContentRepository>,
        seed: Option<u64>,
    ) -> Result<Self, AppServicesError> {
        let storage = if db_url == MEMORY_DB {
            Storage::in_memory()
        } else {
            Storage::sqlite(db_url).await?
        };
        Self::from_storage(&storage, clock, settings, content, seed).await
    }

    /// # Errors
    ///
    /// Returns `AppServicesError` if the goal board cannot be rebuilt.
    pub async fn from_storage(
        storage: &Storage,
        clock: Clock,
        settings: QuizSettings,
        content: Arc<dyn ContentRepository>,
        seed: Option<u64>,
    ) -> Result<Self, AppServicesError> {
        let progress = Arc::new(
            ProgressService::load(clock, Arc::clone(&storage.progress), Arc::clone(&content))
                .await?,
        );
        let sink: Arc<dyn ProgressSink> = Arc::clone(&progress) as Arc<dyn ProgressSink>;

        let challenges = Arc::new(ChallengeService::new(
            clock,
            &settings,
            Arc::clone(&content),
            Arc::clone(&sink),
        ));
        let quizzes = QuizService::new(clock, settings, Arc::clone(&content), sink);
        let quizzes = Arc::new(match seed {
            Some(seed) => quizzes.with_seed(seed),
            None => quizzes,
        });

        Ok(Self {
            content,
            progress,
            quizzes,
            challenges,
        })
    }

    #[must_use]
    pub fn content(&self) -> Arc<dyn ContentRepository> {
        Arc::clone(&self.content)
    }

    #[must_use]
    pub fn progress(&self) -> Arc<ProgressService> {
        Arc::clone(&self.progress)
    }

    #[must_use]
    pub fn quizzes(&self) -> Arc<QuizService> {
        Arc::clone(&self.quizzes)
    }

    #[must_use]
    pub fn challenges(&self) -> Arc<ChallengeService> {
        Arc::clone(&self.challenges)
    }
}
