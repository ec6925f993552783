use serde::Deserialize;
use std::collections::HashSet;
use thiserror::Error;

use crate::model::ids::{LessonId, ParseIdError, QuestionId, SubjectId};
use crate::model::question::{Question, QuestionDraft, QuestionError};

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum LessonError {
    #[error("invalid id: {0}")]
    InvalidId(#[from] ParseIdError),

    #[error("title cannot be empty")]
    EmptyTitle,

    #[error("quiz {quiz} has no questions")]
    EmptyQuiz { quiz: String },

    #[error("duplicate question id {0} in quiz")]
    DuplicateQuestion(QuestionId),

    #[error("duplicate lesson id {0} in subject")]
    DuplicateLesson(LessonId),

    #[error("question {id}: {source}")]
    Question {
        id: String,
        #[source]
        source: QuestionError,
    },
}

fn non_empty_title(raw: String) -> Result<String, LessonError> {
    let title = raw.trim().to_owned();
    if title.is_empty() {
        return Err(LessonError::EmptyTitle);
    }
    Ok(title)
}

//
// ─── QUIZ ──────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct QuizDraft {
    pub id: String,
    #[serde(default)]
    pub questions: Vec<QuestionDraft>,
}

impl QuizDraft {
    /// # Errors
    ///
    /// Returns `LessonError` if the quiz is empty, a question is invalid, or a
    /// question id repeats within the quiz.
    pub fn validate(self) -> Result<Quiz, LessonError> {
        if self.questions.is_empty() {
            return Err(LessonError::EmptyQuiz { quiz: self.id });
        }

        let mut seen = HashSet::new();
        let mut questions = Vec::with_capacity(self.questions.len());
        for draft in self.questions {
            let raw_id = draft.id.clone();
            let question = draft.validate().map_err(|source| LessonError::Question {
                id: raw_id,
                source,
            })?;
            if !seen.insert(question.id().clone()) {
                return Err(LessonError::DuplicateQuestion(question.id().clone()));
            }
            questions.push(question);
        }

        Ok(Quiz {
            id: self.id.trim().to_owned(),
            questions,
        })
    }
}

/// Ordered question list attached to a lesson.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Quiz {
    id: String,
    questions: Vec<Question>,
}

impl Quiz {
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    #[must_use]
    pub fn questions(&self) -> &[Question] {
        &self.questions
    }
}

//
// ─── LESSON ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LessonDraft {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub duration_minutes: u32,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub key_points: Vec<String>,
    pub points: u32,
    #[serde(default)]
    pub quiz: Option<QuizDraft>,
}

impl LessonDraft {
    /// # Errors
    ///
    /// Returns `LessonError` for a bad id, empty title, or invalid quiz.
    pub fn validate(self) -> Result<Lesson, LessonError> {
        let id = LessonId::new(&self.id)?;
        let title = non_empty_title(self.title)?;
        let quiz = self.quiz.map(QuizDraft::validate).transpose()?;
        let key_points = self
            .key_points
            .into_iter()
            .map(|p| p.trim().to_owned())
            .filter(|p| !p.is_empty())
            .collect();

        Ok(Lesson {
            id,
            title,
            duration_minutes: self.duration_minutes,
            description: self.description.trim().to_owned(),
            content: self.content,
            key_points,
            points: self.points,
            quiz,
        })
    }
}

/// A readable lesson; `points` are awarded for finishing it, with or without a quiz.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lesson {
    id: LessonId,
    title: String,
    duration_minutes: u32,
    description: String,
    content: String,
    key_points: Vec<String>,
    points: u32,
    quiz: Option<Quiz>,
}

impl Lesson {
    #[must_use]
    pub fn id(&self) -> &LessonId {
        &self.id
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub fn duration_minutes(&self) -> u32 {
        self.duration_minutes
    }

    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    #[must_use]
    pub fn content(&self) -> &str {
        &self.content
    }

    #[must_use]
    pub fn key_points(&self) -> &[String] {
        &self.key_points
    }

    #[must_use]
    pub fn points(&self) -> u32 {
        self.points
    }

    #[must_use]
    pub fn quiz(&self) -> Option<&Quiz> {
        self.quiz.as_ref()
    }
}

//
// ─── SUBJECT ───────────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SubjectDraft {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub lessons: Vec<LessonDraft>,
}

impl SubjectDraft {
    /// # Errors
    ///
    /// Returns `LessonError` if the subject or any of its lessons is invalid.
    pub fn validate(self) -> Result<Subject, LessonError> {
        let id = SubjectId::new(&self.id)?;
        let title = non_empty_title(self.title)?;

        let mut seen = HashSet::new();
        let mut lessons = Vec::with_capacity(self.lessons.len());
        for draft in self.lessons {
            let lesson = draft.validate()?;
            if !seen.insert(lesson.id().clone()) {
                return Err(LessonError::DuplicateLesson(lesson.id().clone()));
            }
            lessons.push(lesson);
        }

        Ok(Subject {
            id,
            title,
            description: self.description.trim().to_owned(),
            lessons,
        })
    }
}

/// A discipline (physical, biological, geological, chemical oceanography).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subject {
    id: SubjectId,
    title: String,
    description: String,
    lessons: Vec<Lesson>,
}

impl Subject {
    #[must_use]
    pub fn id(&self) -> &SubjectId {
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
    pub fn lessons(&self) -> &[Lesson] {
        &self.lessons
    }

    #[must_use]
    pub fn lesson(&self, id: &LessonId) -> Option<&Lesson> {
        self.lessons.iter().find(|l| l.id() == id)
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
