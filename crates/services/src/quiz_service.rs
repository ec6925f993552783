use std::sync::{Arc, Mutex};

use oceanos_core::daily::pick_daily_questions;
use oceanos_core::model::{
    Completion, CompletionSource, Lesson, LessonId, QuizSettings, SessionId,
};
use oceanos_core::quiz::{QuizKind, QuizSession};
use oceanos_core::scoring::{RewardSchedule, ScoreResult};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use storage::content::ContentRepository;
use tracing::{info, instrument};

use crate::Clock;
use crate::error::QuizServiceError;
use crate::progress_service::{ProgressSink, ProgressUpdate};
use crate::runner::QuizRunner;

/// Starts lesson and daily quizzes and records finished lesson readings.
pub struct QuizService {
    clock: Clock,
    settings: QuizSettings,
    content: Arc<dyn ContentRepository>,
    sink: Arc<dyn ProgressSink>,
    rng: Mutex<StdRng>,
}

impl QuizService {
    #[must_use]
    pub fn new(
        clock: Clock,
        settings: QuizSettings,
        content: Arc<dyn ContentRepository>,
        sink: Arc<dyn ProgressSink>,
    ) -> Self {
        Self {
            clock,
            settings,
            content,
            sink,
            rng: Mutex::new(StdRng::from_os_rng()),
        }
    }

    /// Make every shuffle and daily pick reproducible.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = Mutex::new(StdRng::seed_from_u64(seed));
        self
    }

    #[must_use]
    pub fn settings(&self) -> &QuizSettings {
        &self.settings
    }

    /// Start the quiz attached to a lesson.
    ///
    /// # Errors
    ///
    /// Returns `QuizServiceError::UnknownLesson` or `QuizServiceError::NoQuiz`
    /// if the lesson cannot be quizzed.
    #[instrument(level = "info", skip(self), fields(lesson = %lesson_id))]
    pub fn start_lesson_quiz(&self, lesson_id: &LessonId) -> Result<QuizRunner, QuizServiceError> {
        let lesson = self.find_lesson(lesson_id)?;
        let quiz = lesson
            .quiz()
            .ok_or_else(|| QuizServiceError::NoQuiz(lesson_id.clone()))?;

        let session = QuizSession::start(
            QuizKind::Lesson(lesson_id.clone()),
            quiz.questions().to_vec(),
            RewardSchedule::lesson(lesson.points(), &self.settings),
            self.session_rng()?,
            self.clock.now(),
        )?;
        Ok(self.run(session))
    }

    /// Start today's mixed quiz drawn from every lesson quiz.
    ///
    /// # Errors
    ///
    /// Returns `QuizServiceError::DailyQuiz` if the pool holds fewer
    /// questions than the configured quiz size.
    #[instrument(level = "info", skip(self))]
    pub fn start_daily_quiz(&self) -> Result<QuizRunner, QuizServiceError> {
        let pool = self.content.question_pool();
        let questions = {
            let mut rng = self.rng.lock().map_err(|_| QuizServiceError::Poisoned)?;
            pick_daily_questions(&pool, self.settings.daily_quiz_size(), &mut *rng)?
        };

        let session = QuizSession::start(
            QuizKind::Daily,
            questions,
            RewardSchedule::daily(&self.settings),
            self.session_rng()?,
            self.clock.now(),
        )?;
        Ok(self.run(session))
    }

    /// Open a lesson for reading. The visit ends either with the reading
    /// recorded or with the lesson quiz, never both.
    ///
    /// # Errors
    ///
    /// Returns `QuizServiceError::UnknownLesson` if no lesson has this id.
    pub fn open_lesson(
        &self,
        lesson_id: &LessonId,
    ) -> Result<LessonVisit<'_>, QuizServiceError> {
        let lesson = self.find_lesson(lesson_id)?;
        info!(target: "quiz", lesson = %lesson_id, "lesson opened");
        Ok(LessonVisit {
            service: self,
            lesson_id: lesson_id.clone(),
            has_quiz: lesson.quiz().is_some(),
        })
    }

    /// Award a lesson's points for reading it to the end.
    ///
    /// # Errors
    ///
    /// Returns `QuizServiceError` if the lesson is unknown or the completion
    /// cannot be recorded.
    #[instrument(level = "info", skip(self), fields(lesson = %lesson_id))]
    pub async fn finish_lesson_reading(
        &self,
        lesson_id: &LessonId,
    ) -> Result<ProgressUpdate, QuizServiceError> {
        let points = self.find_lesson(lesson_id)?.points();
        let completion = Completion {
            session_id: SessionId::generate(),
            source: CompletionSource::LessonRead(lesson_id.clone()),
            score: ScoreResult {
                correct_count: 0,
                total_questions: 0,
                points_awarded: points,
            },
            timed_out: false,
            completed_at: self.clock.now(),
        };
        info!(target: "quiz", points, "lesson read");
        Ok(self.sink.record_completion(completion).await?)
    }

    fn find_lesson(&self, lesson_id: &LessonId) -> Result<&Lesson, QuizServiceError> {
        self.content
            .lesson(lesson_id)
            .map(|(_, lesson)| lesson)
            .ok_or_else(|| QuizServiceError::UnknownLesson(lesson_id.clone()))
    }

    /// Each session owns an independent generator forked from the master.
    fn session_rng(&self) -> Result<StdRng, QuizServiceError> {
        let mut master = self.rng.lock().map_err(|_| QuizServiceError::Poisoned)?;
        Ok(StdRng::seed_from_u64(master.random()))
    }

    fn run(&self, session: QuizSession) -> QuizRunner {
        QuizRunner::start(
            session,
            self.settings.quiz_duration_secs(),
            self.settings.timeout_grace(),
            self.clock,
            Arc::clone(&self.sink),
        )
    }
}

/// A lesson being read. Consumed by whichever exit the learner takes.
#[must_use]
pub struct LessonVisit<'a> {
    service: &'a QuizService,
    lesson_id: LessonId,
    has_quiz: bool,
}

impl LessonVisit<'_> {
    #[must_use]
    pub fn lesson_id(&self) -> &LessonId {
        &self.lesson_id
    }

    #[must_use]
    pub fn has_quiz(&self) -> bool {
        self.has_quiz
    }

    /// Record the reading and award the lesson's points.
    ///
    /// # Errors
    ///
    /// Returns `QuizServiceError` if the completion cannot be recorded.
    pub async fn finish_reading(self) -> Result<ProgressUpdate, QuizServiceError> {
        self.service.finish_lesson_reading(&self.lesson_id).await
    }

    /// Leave the reading for the lesson quiz. Only the quiz completion is
    /// recorded for this visit.
    ///
    /// # Errors
    ///
    /// Returns `QuizServiceError::NoQuiz` if the lesson has no quiz.
    pub fn take_quiz(self) -> Result<QuizRunner, QuizServiceError> {
        self.service.start_lesson_quiz(&self.lesson_id)
    }
}
