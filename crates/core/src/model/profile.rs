use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::completion::Completion;

//
// ─── PROFILE ───────────────────────────────────────────────────────────────────
//

/// The learner's persisted progress.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub name: String,
    pub university: String,
    pub course: String,
    pub points: u32,
    pub lessons_completed: u32,
    pub quizzes_completed: u32,
}

impl Default for UserProfile {
    fn default() -> Self {
        Self {
            name: "Estudante".into(),
            university: "UEM - ESCMC".into(),
            course: "Oceanografia".into(),
            points: 0,
            lessons_completed: 0,
            quizzes_completed: 0,
        }
    }
}

impl UserProfile {
    /// Fold one completion into the counters.
    pub fn apply(&mut self, completion: &Completion) {
        self.points = self.points.saturating_add(completion.points());
        if completion.source.is_lesson() {
            self.lessons_completed = self.lessons_completed.saturating_add(1);
        }
        if completion.source.is_quiz() {
            self.quizzes_completed = self.quizzes_completed.saturating_add(1);
        }
    }
}

//
// ─── LEVELS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum LevelError {
    #[error("level ladder cannot be empty")]
    Empty,

    #[error("first level must start at 0 points")]
    FirstLevelNotZero,

    #[error("level thresholds must strictly increase (at {label})")]
    NotIncreasing { label: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Level {
    pub label: String,
    pub min_points: u32,
}

/// Where a points total sits on the ladder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LevelStatus {
    /// 1-based level number.
    pub number: u32,
    pub label: String,
    pub next_label: Option<String>,
    pub points_to_next: Option<u32>,
}

/// Ordered `(label, min_points)` thresholds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LevelLadder {
    levels: Vec<Level>,
}

impl Default for LevelLadder {
    fn default() -> Self {
        let levels = [
            ("Aprendiz do Mar", 0),
            ("Guardião Costeiro", 250),
            ("Navegador Oceânico", 600),
            ("Mestre dos Oceanos", 1200),
        ]
        .into_iter()
        .map(|(label, min_points)| Level {
            label: label.into(),
            min_points,
        })
        .collect();
        Self { levels }
    }
}

impl LevelLadder {
    /// # Errors
    ///
    /// Returns `LevelError` if the ladder is empty, does not start at zero,
    /// or has thresholds that do not strictly increase.
    pub fn new(levels: Vec<Level>) -> Result<Self, LevelError> {
        let first = levels.first().ok_or(LevelError::Empty)?;
        if first.min_points != 0 {
            return Err(LevelError::FirstLevelNotZero);
        }
        if let Some(pair) = levels.windows(2).find(|w| w[1].min_points <= w[0].min_points) {
            return Err(LevelError::NotIncreasing {
                label: pair[1].label.clone(),
            });
        }
        Ok(Self { levels })
    }

    #[must_use]
    pub fn levels(&self) -> &[Level] {
        &self.levels
    }

    #[must_use]
    pub fn status(&self, points: u32) -> LevelStatus {
        let idx = self
            .levels
            .iter()
            .rposition(|l| l.min_points <= points)
            .unwrap_or(0);
        let next = self.levels.get(idx + 1);

        LevelStatus {
            number: u32::try_from(idx + 1).unwrap_or(u32::MAX),
            label: self.levels[idx].label.clone(),
            next_label: next.map(|l| l.label.clone()),
            points_to_next: next.map(|l| l.min_points - points),
        }
    }
}
