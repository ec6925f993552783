//! Shared error types for the services crate.

use thiserror::Error;

use oceanos_core::daily::DailyQuizError;
use oceanos_core::model::LessonId;
use oceanos_core::quiz::QuizError;
use oceanos_core::weekly::WeeklyChallengeError;
use storage::content::ContentError;
use storage::repository::StorageError;
use storage::sqlite::SqliteInitError;

/// Errors emitted by `ProgressService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ProgressError {
    #[error("progress state lock poisoned")]
    Poisoned,
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by quiz and challenge services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum QuizServiceError {
    #[error("unknown lesson {0}")]
    UnknownLesson(LessonId),
    #[error("lesson {0} has no quiz")]
    NoQuiz(LessonId),
    #[error("quiz session lock poisoned")]
    Poisoned,
    #[error(transparent)]
    Quiz(#[from] QuizError),
    #[error(transparent)]
    DailyQuiz(#[from] DailyQuizError),
    #[error(transparent)]
    WeeklyChallenge(#[from] WeeklyChallengeError),
    #[error(transparent)]
    Progress(#[from] ProgressError),
}

/// Errors emitted while bootstrapping app services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppServicesError {
    #[error(transparent)]
    Sqlite(#[from] SqliteInitError),
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Content(#[from] ContentError),
    #[error(transparent)]
    Progress(#[from] ProgressError),
}
