use oceanos_core::model::{
    ChallengeId, Completion, CompletionSource, LessonId, SessionId, UserProfile,
};
use oceanos_core::scoring::ScoreResult;
use sqlx::Row;
use uuid::Uuid;

use crate::repository::{CompletionRow, StorageError};

pub(crate) fn ser<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Serialization(e.to_string())
}

pub(crate) fn u32_from_i64(field: &'static str, v: i64) -> Result<u32, StorageError> {
    u32::try_from(v).map_err(|_| StorageError::Serialization(format!("invalid {field}: {v}")))
}

fn required_id(kind: &str, source_id: Option<String>) -> Result<String, StorageError> {
    source_id.ok_or_else(|| StorageError::Serialization(format!("{kind} row without source_id")))
}

/// Rebuild a `CompletionSource` from its `kind` tag and optional id column.
pub(crate) fn source_from_columns(
    kind: &str,
    source_id: Option<String>,
) -> Result<CompletionSource, StorageError> {
    match kind {
        "lesson_read" => Ok(CompletionSource::LessonRead(
            LessonId::new(required_id(kind, source_id)?).map_err(ser)?,
        )),
        "lesson_quiz" => Ok(CompletionSource::LessonQuiz(
            LessonId::new(required_id(kind, source_id)?).map_err(ser)?,
        )),
        "daily_quiz" => Ok(CompletionSource::DailyQuiz),
        "weekly_challenge" => Ok(CompletionSource::WeeklyChallenge(
            ChallengeId::new(required_id(kind, source_id)?).map_err(ser)?,
        )),
        "goal" => Ok(CompletionSource::Goal(required_id(kind, source_id)?)),
        other => Err(StorageError::Serialization(format!(
            "unknown completion kind: {other}"
        ))),
    }
}

pub(crate) fn map_completion_row(row: &sqlx::sqlite::SqliteRow) -> Result<CompletionRow, StorageError> {
    let id: i64 = row.try_get("id").map_err(ser)?;
    let session_id: String = row.try_get("session_id").map_err(ser)?;
    let session_id = SessionId::from_uuid(Uuid::parse_str(&session_id).map_err(ser)?);
    let kind: String = row.try_get("kind").map_err(ser)?;
    let source_id: Option<String> = row.try_get("source_id").map_err(ser)?;
    let correct = u32_from_i64("correct", row.try_get::<i64, _>("correct").map_err(ser)?)?;
    let total = u32_from_i64("total", row.try_get::<i64, _>("total").map_err(ser)?)?;
    let points = u32_from_i64("points", row.try_get::<i64, _>("points").map_err(ser)?)?;
    let timed_out: bool = row.try_get("timed_out").map_err(ser)?;
    let completed_at = row.try_get("completed_at").map_err(ser)?;

    Ok(CompletionRow::new(
        id,
        Completion {
            session_id,
            source: source_from_columns(&kind, source_id)?,
            score: ScoreResult {
                correct_count: correct,
                total_questions: total,
                points_awarded: points,
            },
            timed_out,
            completed_at,
        },
    ))
}

pub(crate) fn map_profile_row(row: &sqlx::sqlite::SqliteRow) -> Result<UserProfile, StorageError> {
    Ok(UserProfile {
        name: row.try_get("name").map_err(ser)?,
        university: row.try_get("university").map_err(ser)?,
        course: row.try_get("course").map_err(ser)?,
        points: u32_from_i64("points", row.try_get::<i64, _>("points").map_err(ser)?)?,
        lessons_completed: u32_from_i64(
            "lessons_completed",
            row.try_get::<i64, _>("lessons_completed").map_err(ser)?,
        )?,
        quizzes_completed: u32_from_i64(
            "quizzes_completed",
            row.try_get::<i64, _>("quizzes_completed").map_err(ser)?,
        )?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sources_rebuild_from_columns() {
        assert_eq!(
            source_from_columns("daily_quiz", None).unwrap(),
            CompletionSource::DailyQuiz
        );
        assert_eq!(
            source_from_columns("lesson_quiz", Some("mares".into())).unwrap(),
            CompletionSource::LessonQuiz(LessonId::new("mares").unwrap())
        );
        assert!(source_from_columns("lesson_quiz", None).is_err());
        assert!(source_from_columns("forum_post", Some("x".into())).is_err());
    }
}
