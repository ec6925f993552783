use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::ids::{ParseIdError, QuestionId};

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuestionError {
    #[error("invalid question id: {0}")]
    InvalidId(#[from] ParseIdError),

    #[error("question text cannot be empty")]
    EmptyText,

    #[error("a question needs at least 2 options, got {0}")]
    TooFewOptions(usize),

    #[error("option {0} is empty")]
    EmptyOption(usize),

    #[error("correct index {index} is out of range for {len} options")]
    CorrectIndexOutOfRange { index: usize, len: usize },
}

//
// ─── DIFFICULTY ────────────────────────────────────────────────────────────────
//

/// Difficulty tag shown next to a question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    #[serde(alias = "básico", alias = "basico")]
    Basic,
    #[serde(alias = "médio", alias = "medio")]
    Medium,
    #[serde(alias = "avançado", alias = "avancado")]
    Advanced,
}

impl Difficulty {
    /// Portuguese label used by the front-end.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Difficulty::Basic => "básico",
            Difficulty::Medium => "médio",
            Difficulty::Advanced => "avançado",
        }
    }
}

//
// ─── QUESTION ──────────────────────────────────────────────────────────────────
//

/// Unvalidated question as it appears in the bundled content file.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct QuestionDraft {
    pub id: String,
    pub text: String,
    pub options: Vec<String>,
    pub correct_index: usize,
    #[serde(default)]
    pub explanation: String,
    pub difficulty: Difficulty,
    #[serde(default)]
    pub points: u32,
}

impl QuestionDraft {
    /// Validate the draft into an immutable `Question`.
    ///
    /// # Errors
    ///
    /// Returns `QuestionError` if the id, text or options are malformed or the
    /// correct index does not point at an option.
    pub fn validate(self) -> Result<Question, QuestionError> {
        let id = QuestionId::new(&self.id)?;

        let text = self.text.trim().to_owned();
        if text.is_empty() {
            return Err(QuestionError::EmptyText);
        }

        if self.options.len() < 2 {
            return Err(QuestionError::TooFewOptions(self.options.len()));
        }
        let mut options = Vec::with_capacity(self.options.len());
        for (idx, option) in self.options.into_iter().enumerate() {
            let option = option.trim().to_owned();
            if option.is_empty() {
                return Err(QuestionError::EmptyOption(idx));
            }
            options.push(option);
        }

        if self.correct_index >= options.len() {
            return Err(QuestionError::CorrectIndexOutOfRange {
                index: self.correct_index,
                len: options.len(),
            });
        }

        Ok(Question {
            id,
            text,
            options,
            correct_index: self.correct_index,
            explanation: self.explanation.trim().to_owned(),
            difficulty: self.difficulty,
            points: self.points,
        })
    }
}

/// A multiple-choice question.
///
/// `correct_index` always indexes a valid option; the only way to build one is
/// through `QuestionDraft::validate`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    id: QuestionId,
    text: String,
    options: Vec<String>,
    correct_index: usize,
    explanation: String,
    difficulty: Difficulty,
    points: u32,
}

impl Question {
    #[must_use]
    pub fn id(&self) -> &QuestionId {
        &self.id
    }

    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    #[must_use]
    pub fn options(&self) -> &[String] {
        &self.options
    }

    #[must_use]
    pub fn correct_index(&self) -> usize {
        self.correct_index
    }

    #[must_use]
    pub fn correct_option(&self) -> &str {
        &self.options[self.correct_index]
    }

    #[must_use]
    pub fn explanation(&self) -> &str {
        &self.explanation
    }

    #[must_use]
    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    /// Nominal weight from the content file. Informational only: rewards are
    /// set by the session's reward schedule.
    #[must_use]
    pub fn points(&self) -> u32 {
        self.points
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
