use thiserror::Error;

use crate::daily::DailyQuizError;
use crate::model::{ChallengeError, LessonError, LevelError, QuestionError, SettingsError};
use crate::quiz::QuizError;
use crate::weekly::WeeklyChallengeError;

/// Any error raised by the domain layer.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    #[error(transparent)]
    Question(#[from] QuestionError),
    #[error(transparent)]
    Lesson(#[from] LessonError),
    #[error(transparent)]
    Challenge(#[from] ChallengeError),
    #[error(transparent)]
    Settings(#[from] SettingsError),
    #[error(transparent)]
    Level(#[from] LevelError),
    #[error(transparent)]
    Quiz(#[from] QuizError),
    #[error(transparent)]
    DailyQuiz(#[from] DailyQuizError),
    #[error(transparent)]
    WeeklyChallenge(#[from] WeeklyChallengeError),
}
