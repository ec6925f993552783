use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::ids::{ChallengeId, ParseIdError};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ChallengeError {
    #[error(transparent)]
    InvalidId(#[from] ParseIdError),

    #[error("challenge title cannot be empty")]
    EmptyTitle,

    #[error("challenge {0} has no tasks")]
    NoTasks(ChallengeId),

    #[error("challenge {id} has an empty task at index {index}")]
    EmptyTask { id: ChallengeId, index: usize },

    #[error("challenge {0} must award points")]
    ZeroPoints(ChallengeId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChallengeDifficulty {
    #[serde(alias = "médio", alias = "medio")]
    Medium,
    #[serde(alias = "avançado", alias = "avancado")]
    Advanced,
    Expert,
}

impl ChallengeDifficulty {
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            ChallengeDifficulty::Medium => "Médio",
            ChallengeDifficulty::Advanced => "Avançado",
            ChallengeDifficulty::Expert => "Expert",
        }
    }
}

/// Raw weekly challenge as written in the content file.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct WeeklyChallengeDraft {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub difficulty: ChallengeDifficulty,
    pub points: u32,
    #[serde(default)]
    pub category: String,
    #[serde(default = "default_time_limit_days")]
    pub time_limit_days: u32,
    pub tasks: Vec<String>,
    #[serde(default)]
    pub requirements: Vec<String>,
}

fn default_time_limit_days() -> u32 {
    7
}

impl WeeklyChallengeDraft {
    /// # Errors
    ///
    /// Returns `ChallengeError` for a bad id, an empty title, no tasks, a
    /// blank task, or a challenge worth zero points.
    pub fn validate(self) -> Result<WeeklyChallenge, ChallengeError> {
        let id = ChallengeId::new(&self.id)?;

        let title = self.title.trim();
        if title.is_empty() {
            return Err(ChallengeError::EmptyTitle);
        }
        if self.tasks.is_empty() {
            return Err(ChallengeError::NoTasks(id));
        }
        if let Some(index) = self.tasks.iter().position(|t| t.trim().is_empty()) {
            return Err(ChallengeError::EmptyTask { id, index });
        }
        if self.points == 0 {
            return Err(ChallengeError::ZeroPoints(id));
        }

        Ok(WeeklyChallenge {
            id,
            title: title.to_owned(),
            description: self.description,
            difficulty: self.difficulty,
            points: self.points,
            category: self.category,
            time_limit_days: self.time_limit_days,
            tasks: self.tasks,
            requirements: self.requirements,
        })
    }
}

/// A weekly checklist challenge variant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeeklyChallenge {
    id: ChallengeId,
    title: String,
    description: String,
    difficulty: ChallengeDifficulty,
    points: u32,
    category: String,
    time_limit_days: u32,
    tasks: Vec<String>,
    requirements: Vec<String>,
}

impl WeeklyChallenge {
    #[must_use]
    pub fn id(&self) -> &ChallengeId {
        &self.id
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    #[must_use]
    pub fn difficulty(&self) -> ChallengeDifficulty {
        self.difficulty
    }

    #[must_use]
    pub fn points(&self) -> u32 {
        self.points
    }

    #[must_use]
    pub fn category(&self) -> &str {
        &self.category
    }

    #[must_use]
    pub fn time_limit_days(&self) -> u32 {
        self.time_limit_days
    }

    #[must_use]
    pub fn tasks(&self) -> &[String] {
        &self.tasks
    }

    #[must_use]
    pub fn requirements(&self) -> &[String] {
        &self.requirements
    }
}
