pub(crate) mod challenge;
mod completion;
mod ids;
mod lesson;
mod profile;
pub(crate) mod question;
mod settings;

pub use ids::{ChallengeId, LessonId, ParseIdError, QuestionId, SessionId, SubjectId};

pub use challenge::{ChallengeDifficulty, ChallengeError, WeeklyChallenge, WeeklyChallengeDraft};
pub use completion::{Completion, CompletionSource};
pub use lesson::{Lesson, LessonDraft, LessonError, Quiz, QuizDraft, Subject, SubjectDraft};
pub use profile::{Level, LevelError, LevelLadder, LevelStatus, UserProfile};
pub use question::{Difficulty, Question, QuestionDraft, QuestionError};
pub use settings::{QuizSettings, SettingsError};
