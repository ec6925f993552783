//! Reward schedules and score tallying.

use serde::{Deserialize, Serialize};

use crate::model::QuizSettings;

/// How a finished attempt turns into points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "schedule", rename_all = "snake_case")]
pub enum RewardSchedule {
    /// Lesson quiz: the lesson's own points plus a bonus per correct answer.
    Lesson { base_points: u32, per_correct: u32 },
    /// Daily quiz: only correct answers count.
    Daily { per_correct: u32 },
}

impl RewardSchedule {
    #[must_use]
    pub fn lesson(base_points: u32, settings: &QuizSettings) -> Self {
        Self::Lesson {
            base_points,
            per_correct: settings.lesson_points_per_correct(),
        }
    }

    #[must_use]
    pub fn daily(settings: &QuizSettings) -> Self {
        Self::Daily {
            per_correct: settings.daily_points_per_correct(),
        }
    }

    #[must_use]
    pub fn points_for(&self, correct_count: u32) -> u32 {
        match *self {
            RewardSchedule::Lesson {
                base_points,
                per_correct,
            } => base_points.saturating_add(per_correct.saturating_mul(correct_count)),
            RewardSchedule::Daily { per_correct } => per_correct.saturating_mul(correct_count),
        }
    }
}

/// Final tally shown on the completion screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreResult {
    pub correct_count: u32,
    pub total_questions: u32,
    pub points_awarded: u32,
}

impl ScoreResult {
    /// Whole-number percentage of correct answers (0 when there were no questions).
    #[must_use]
    pub fn percentage(&self) -> u32 {
        if self.total_questions == 0 {
            return 0;
        }
        let pct = f64::from(self.correct_count) * 100.0 / f64::from(self.total_questions);
        // Rounded like the completion screen; bounded by 100.
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let pct = pct.round() as u32;
        pct
    }

    #[must_use]
    pub fn is_perfect(&self) -> bool {
        self.total_questions > 0 && self.correct_count == self.total_questions
    }
}

/// Running tally of per-question correctness for one session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoreAccumulator {
    schedule: RewardSchedule,
    results: Vec<bool>,
}

impl ScoreAccumulator {
    #[must_use]
    pub fn new(schedule: RewardSchedule) -> Self {
        Self {
            schedule,
            results: Vec::new(),
        }
    }

    pub fn record(&mut self, correct: bool) {
        self.results.push(correct);
    }

    /// Marks every question past the answered ones as incorrect so the result
    /// list covers the whole session.
    pub fn pad_unanswered(&mut self, total_questions: usize) {
        if self.results.len() < total_questions {
            self.results.resize(total_questions, false);
        }
    }

    #[must_use]
    pub fn results(&self) -> &[bool] {
        &self.results
    }

    #[must_use]
    pub fn schedule(&self) -> RewardSchedule {
        self.schedule
    }

    #[must_use]
    pub fn correct_count(&self) -> u32 {
        let count = self.results.iter().filter(|r| **r).count();
        u32::try_from(count).unwrap_or(u32::MAX)
    }

    #[must_use]
    pub fn finish(&self, total_questions: usize) -> ScoreResult {
        let correct_count = self.correct_count();
        ScoreResult {
            correct_count,
            total_questions: u32::try_from(total_questions).unwrap_or(u32::MAX),
            points_awarded: self.schedule.points_for(correct_count),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lesson_schedule_adds_base_points() {
        let schedule = RewardSchedule::lesson(15, &QuizSettings::default());
        assert_eq!(schedule.points_for(0), 15);
        assert_eq!(schedule.points_for(2), 25);
    }

    #[test]
    fn daily_schedule_is_eight_per_correct() {
        let schedule = RewardSchedule::daily(&QuizSettings::default());
        assert_eq!(schedule.points_for(3), 24);
    }

    #[test]
    fn accumulator_counts_and_pads() {
        let mut acc = ScoreAccumulator::new(RewardSchedule::daily(&QuizSettings::default()));
        acc.record(true);
        acc.record(false);
        acc.record(true);
        acc.pad_unanswered(5);
        assert_eq!(acc.results(), [true, false, true, false, false]);

        let score = acc.finish(5);
        assert_eq!(score.correct_count, 2);
        assert_eq!(score.total_questions, 5);
        assert_eq!(score.points_awarded, 16);
        assert_eq!(score.percentage(), 40);
        assert!(!score.is_perfect());
    }

    #[test]
    fn pad_never_truncates() {
        let mut acc = ScoreAccumulator::new(RewardSchedule::Daily { per_correct: 1 });
        acc.record(true);
        acc.record(true);
        acc.pad_unanswered(1);
        assert_eq!(acc.results().len(), 2);
    }

    #[test]
    fn percentage_of_empty_score_is_zero() {
        let score = ScoreResult {
            correct_count: 0,
            total_questions: 0,
            points_awarded: 0,
        };
        assert_eq!(score.percentage(), 0);
        assert!(!score.is_perfect());
    }
}
