//! Read-only learning content loaded from TOML.

use std::collections::HashSet;
use std::path::Path;

use oceanos_core::daily::question_pool;
use oceanos_core::model::{
    ChallengeError, Lesson, LessonError, LessonId, Question, Subject, SubjectDraft, SubjectId,
    WeeklyChallenge, WeeklyChallengeDraft,
};
use oceanos_core::ranking::RankingEntry;
use serde::Deserialize;
use thiserror::Error;

const BUNDLED: &str = include_str!("../content/oceanos.toml");

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ContentError {
    #[error("failed to read content file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse content file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error(transparent)]
    Lesson(#[from] LessonError),

    #[error(transparent)]
    Challenge(#[from] ChallengeError),

    #[error("duplicate subject id {0}")]
    DuplicateSubject(SubjectId),

    #[error("lesson id {0} is used by more than one subject")]
    DuplicateLesson(LessonId),
}

/// Read access to subjects, lessons, challenge variants and ranking peers.
pub trait ContentRepository: Send + Sync {
    fn subjects(&self) -> &[Subject];

    /// The lesson and the subject that owns it.
    fn lesson(&self, id: &LessonId) -> Option<(&Subject, &Lesson)> {
        self.subjects()
            .iter()
            .find_map(|subject| subject.lesson(id).map(|lesson| (subject, lesson)))
    }

    /// Every question of every lesson that has a quiz.
    fn question_pool(&self) -> Vec<Question> {
        question_pool(self.subjects())
    }

    fn weekly_challenges(&self) -> &[WeeklyChallenge];

    fn ranking_peers(&self) -> &[RankingEntry];
}

#[derive(Debug, Deserialize)]
struct ContentFile {
    #[serde(default)]
    subjects: Vec<SubjectDraft>,
    #[serde(default)]
    weekly_challenges: Vec<WeeklyChallengeDraft>,
    #[serde(default)]
    ranking: Vec<RankingEntry>,
}

/// Validated content held in memory.
#[derive(Debug, Clone)]
pub struct StaticContent {
    subjects: Vec<Subject>,
    weekly_challenges: Vec<WeeklyChallenge>,
    ranking: Vec<RankingEntry>,
}

impl StaticContent {
    /// The content shipped with the binary.
    ///
    /// # Errors
    ///
    /// Returns `ContentError` if the bundled file is invalid.
    pub fn bundled() -> Result<Self, ContentError> {
        Self::from_toml_str(BUNDLED)
    }

    /// # Errors
    ///
    /// Returns `ContentError` if the file cannot be read or is invalid.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ContentError> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_toml_str(&raw)
    }

    /// Parse and validate a TOML document.
    ///
    /// # Errors
    ///
    /// Returns `ContentError` on a TOML syntax error, an invalid record, or a
    /// subject or lesson id used twice.
    pub fn from_toml_str(raw: &str) -> Result<Self, ContentError> {
        let file: ContentFile = toml::from_str(raw)?;

        let mut subject_ids = HashSet::new();
        let mut lesson_ids = HashSet::new();
        let mut subjects = Vec::with_capacity(file.subjects.len());
        for draft in file.subjects {
            let subject = draft.validate()?;
            if !subject_ids.insert(subject.id().clone()) {
                return Err(ContentError::DuplicateSubject(subject.id().clone()));
            }
            for lesson in subject.lessons() {
                if !lesson_ids.insert(lesson.id().clone()) {
                    return Err(ContentError::DuplicateLesson(lesson.id().clone()));
                }
            }
            subjects.push(subject);
        }

        let weekly_challenges = file
            .weekly_challenges
            .into_iter()
            .map(WeeklyChallengeDraft::validate)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            subjects,
            weekly_challenges,
            ranking: file.ranking,
        })
    }
}

impl ContentRepository for StaticContent {
    fn subjects(&self) -> &[Subject] {
        &self.subjects
    }

    fn weekly_challenges(&self) -> &[WeeklyChallenge] {
        &self.weekly_challenges
    }

    fn ranking_peers(&self) -> &[RankingEntry] {
        &self.ranking
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use oceanos_core::model::{ChallengeDifficulty, Difficulty};

    #[test]
    fn bundled_content_is_valid() {
        let content = StaticContent::bundled().unwrap();
        assert_eq!(content.subjects().len(), 4);
        assert_eq!(content.weekly_challenges().len(), 4);
        assert!(content.question_pool().len() >= 5);
        assert!(!content.ranking_peers().is_empty());
    }

    #[test]
    fn portuguese_difficulty_names_are_accepted() {
        let content = StaticContent::bundled().unwrap();
        let id = LessonId::new("ondas-formacao").unwrap();
        let (subject, lesson) = content.lesson(&id).unwrap();
        assert_eq!(subject.id().as_str(), "fisica");
        assert_eq!(lesson.points(), 15);

        let quiz = lesson.quiz().unwrap();
        assert_eq!(quiz.questions()[0].difficulty(), Difficulty::Basic);
        assert_eq!(quiz.questions()[1].difficulty(), Difficulty::Medium);

        let agulhas = content
            .weekly_challenges()
            .iter()
            .find(|c| c.id().as_str() == "correntes-agulhas")
            .unwrap();
        assert_eq!(agulhas.difficulty(), ChallengeDifficulty::Expert);
        assert_eq!(agulhas.tasks().len(), 8);
    }

    #[test]
    fn rejects_invalid_question() {
        let raw = r#"
            [[subjects]]
            id = "fisica"
            title = "Física"

            [[subjects.lessons]]
            id = "ondas"
            title = "Ondas"
            points = 10

            [subjects.lessons.quiz]
            id = "quiz"

            [[subjects.lessons.quiz.questions]]
            id = "q1"
            text = "Pergunta?"
            options = ["só uma"]
            correct_index = 0
            difficulty = "basic"
        "#;
        assert!(matches!(
            StaticContent::from_toml_str(raw),
            Err(ContentError::Lesson(LessonError::Question { .. }))
        ));
    }

    #[test]
    fn rejects_lesson_id_shared_between_subjects() {
        let raw = r#"
            [[subjects]]
            id = "a"
            title = "A"
            [[subjects.lessons]]
            id = "mesma"
            title = "Uma"
            points = 1

            [[subjects]]
            id = "b"
            title = "B"
            [[subjects.lessons]]
            id = "mesma"
            title = "Outra"
            points = 1
        "#;
        assert!(matches!(
            StaticContent::from_toml_str(raw),
            Err(ContentError::DuplicateLesson(_))
        ));
    }

    #[test]
    fn syntax_errors_surface_as_parse() {
        assert!(matches!(
            StaticContent::from_toml_str("[[subjects]\n"),
            Err(ContentError::Parse(_))
        ));
    }
}
