use oceanos_core::model::UserProfile;

use super::SqliteRepository;
use super::mapping::map_profile_row;
use crate::repository::StorageError;

impl SqliteRepository {
    pub(crate) async fn load_profile(&self) -> Result<UserProfile, StorageError> {
        let row = sqlx::query(
            r"
                SELECT name, university, course, points, lessons_completed, quizzes_completed
                FROM user_profile
                WHERE id = 1
            ",
        )
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        match row {
            Some(row) => map_profile_row(&row),
            None => Ok(UserProfile::default()),
        }
    }

    pub(crate) async fn store_profile(&self, profile: &UserProfile) -> Result<(), StorageError> {
        upsert_profile(&self.pool, profile).await
    }
}

pub(crate) async fn upsert_profile<'e, E>(
    executor: E,
    profile: &UserProfile,
) -> Result<(), StorageError>
where
    E: sqlx::SqliteExecutor<'e>,
{
    sqlx::query(
        r"
            INSERT INTO user_profile (
                id, name, university, course, points,
                lessons_completed, quizzes_completed, updated_at
            )
            VALUES (1, ?1, ?2, ?3, ?4, ?5, ?6, ?7)
            ON CONFLICT(id) DO UPDATE SET
                name = excluded.name,
                university = excluded.university,
                course = excluded.course,
                points = excluded.points,
                lessons_completed = excluded.lessons_completed,
                quizzes_completed = excluded.quizzes_completed,
                updated_at = excluded.updated_at
        ",
    )
    .bind(&profile.name)
    .bind(&profile.university)
    .bind(&profile.course)
    .bind(i64::from(profile.points))
    .bind(i64::from(profile.lessons_completed))
    .bind(i64::from(profile.quizzes_completed))
    .bind(chrono::Utc::now())
    .execute(executor)
    .await
    .map_err(|e| StorageError::Connection(e.to_string()))?;

    Ok(())
}
