use chrono::Duration;
use thiserror::Error;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SettingsError {
    #[error("quiz duration must be between 10 and 3600 seconds")]
    InvalidQuizDuration,

    #[error("timeout grace must be at most 30 seconds")]
    InvalidTimeoutGrace,

    #[error("daily quiz size must be > 0")]
    InvalidDailyQuizSize,

    #[error("weekly completion threshold must be between 1 and 100 percent")]
    InvalidWeeklyThreshold,
}

//
// ─── SETTINGS ──────────────────────────────────────────────────────────────────
//

/// Tunables for quiz sessions and reward schedules.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizSettings {
    quiz_duration_secs: u32,
    timeout_grace_secs: u32,
    daily_quiz_size: usize,
    lesson_points_per_correct: u32,
    daily_points_per_correct: u32,
    weekly_threshold_percent: u32,
}

impl Default for QuizSettings {
    /// - 5 minute timer for lesson and daily quizzes
    /// - 2 second pause on "time's up" before the session closes
    /// - 5 daily questions worth 8 points each
    /// - 5 points per correct lesson answer on top of the lesson's own points
    /// - weekly checklist submittable at 80%
    fn default() -> Self {
        Self {
            quiz_duration_secs: 300,
            timeout_grace_secs: 2,
            daily_quiz_size: 5,
            lesson_points_per_correct: 5,
            daily_points_per_correct: 8,
            weekly_threshold_percent: 80,
        }
    }
}

impl QuizSettings {
    /// Creates custom quiz settings.
    ///
    /// # Errors
    ///
    /// Returns `SettingsError` if a value is outside its accepted range.
    pub fn new(
        quiz_duration_secs: u32,
        timeout_grace_secs: u32,
        daily_quiz_size: usize,
        lesson_points_per_correct: u32,
        daily_points_per_correct: u32,
        weekly_threshold_percent: u32,
    ) -> Result<Self, SettingsError> {
        if !(10..=3600).contains(&quiz_duration_secs) {
            return Err(SettingsError::InvalidQuizDuration);
        }
        if timeout_grace_secs > 30 {
            return Err(SettingsError::InvalidTimeoutGrace);
        }
        if daily_quiz_size == 0 {
            return Err(SettingsError::InvalidDailyQuizSize);
        }
        if !(1..=100).contains(&weekly_threshold_percent) {
            return Err(SettingsError::InvalidWeeklyThreshold);
        }

        Ok(Self {
            quiz_duration_secs,
            timeout_grace_secs,
            daily_quiz_size,
            lesson_points_per_correct,
            daily_points_per_correct,
            weekly_threshold_percent,
        })
    }

    #[must_use]
    pub fn quiz_duration_secs(&self) -> u32 {
        self.quiz_duration_secs
    }

    #[must_use]
    pub fn timeout_grace_secs(&self) -> u32 {
        self.timeout_grace_secs
    }

    #[must_use]
    pub fn timeout_grace(&self) -> Duration {
        Duration::seconds(i64::from(self.timeout_grace_secs))
    }

    #[must_use]
    pub fn daily_quiz_size(&self) -> usize {
        self.daily_quiz_size
    }

    #[must_use]
    pub fn lesson_points_per_correct(&self) -> u32 {
        self.lesson_points_per_correct
    }

    #[must_use]
    pub fn daily_points_per_correct(&self) -> u32 {
        self.daily_points_per_correct
    }

    #[must_use]
    pub fn weekly_threshold_percent(&self) -> u32 {
        self.weekly_threshold_percent
    }
}
