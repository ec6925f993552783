use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::ids::{ChallengeId, LessonId, SessionId};
use crate::scoring::ScoreResult;

/// Where a batch of points came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum CompletionSource {
    LessonRead(LessonId),
    LessonQuiz(LessonId),
    DailyQuiz,
    WeeklyChallenge(ChallengeId),
    Goal(String),
}

impl CompletionSource {
    /// Stable tag used by the completion log.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            CompletionSource::LessonRead(_) => "lesson_read",
            CompletionSource::LessonQuiz(_) => "lesson_quiz",
            CompletionSource::DailyQuiz => "daily_quiz",
            CompletionSource::WeeklyChallenge(_) => "weekly_challenge",
            CompletionSource::Goal(_) => "goal",
        }
    }

    #[must_use]
    pub fn source_id(&self) -> Option<&str> {
        match self {
            CompletionSource::LessonRead(id) | CompletionSource::LessonQuiz(id) => {
                Some(id.as_str())
            }
            CompletionSource::WeeklyChallenge(id) => Some(id.as_str()),
            CompletionSource::Goal(id) => Some(id.as_str()),
            CompletionSource::DailyQuiz => None,
        }
    }

    /// Whether this completion counts as a finished quiz for progress counters.
    #[must_use]
    pub fn is_quiz(&self) -> bool {
        matches!(
            self,
            CompletionSource::LessonQuiz(_) | CompletionSource::DailyQuiz
        )
    }

    /// Whether this completion finishes a lesson (read or quizzed).
    #[must_use]
    pub fn is_lesson(&self) -> bool {
        matches!(
            self,
            CompletionSource::LessonRead(_) | CompletionSource::LessonQuiz(_)
        )
    }
}

/// The hand-off record passed to the progress sink: one per finished session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Completion {
    pub session_id: SessionId,
    pub source: CompletionSource,
    pub score: ScoreResult,
    pub timed_out: bool,
    pub completed_at: DateTime<Utc>,
}

impl Completion {
    #[must_use]
    pub fn points(&self) -> u32 {
        self.score.points_awarded
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_and_ids() {
        let lesson = LessonId::new("mares").unwrap();
        let quiz = CompletionSource::LessonQuiz(lesson.clone());
        assert_eq!(quiz.kind(), "lesson_quiz");
        assert_eq!(quiz.source_id(), Some("mares"));
        assert!(quiz.is_quiz());
        assert!(quiz.is_lesson());

        let daily = CompletionSource::DailyQuiz;
        assert_eq!(daily.source_id(), None);
        assert!(daily.is_quiz());
        assert!(!daily.is_lesson());

        let read = CompletionSource::LessonRead(lesson);
        assert!(!read.is_quiz());
        assert!(read.is_lesson());
    }
}
