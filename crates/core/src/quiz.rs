//! Quiz session state machine.
//!
//! ```text
//! Presenting(i) --submit--> Answered(i) --advance--> Presenting(i+1) ... --> Completed
//!       \                       /
//!        +--force_timeout------+--> TimedOut { completes_at } --complete_if_due--> Completed
//! ```
//!
//! Operations whose precondition does not hold are ignored and report that
//! through their return value; they never error.

use chrono::{DateTime, Duration, Utc};
use rand::rngs::StdRng;
use thiserror::Error;

use crate::model::{Completion, CompletionSource, LessonId, Question, SessionId};
use crate::scoring::{RewardSchedule, ScoreAccumulator, ScoreResult};
use crate::shuffle::{AnswerShuffler, ShuffledQuestion};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuizError {
    #[error("a quiz needs at least one question")]
    NoQuestions,
}

/// Which flow started the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuizKind {
    Lesson(LessonId),
    Daily,
}

impl QuizKind {
    fn completion_source(&self) -> CompletionSource {
        match self {
            QuizKind::Lesson(id) => CompletionSource::LessonQuiz(id.clone()),
            QuizKind::Daily => CompletionSource::DailyQuiz,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuizPhase {
    Presenting,
    Answered,
    TimedOut { completes_at: DateTime<Utc> },
    Completed,
}

/// What `advance` did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advance {
    /// Moved to the question at this index.
    Next(usize),
    Completed(ScoreResult),
}

/// Position within the session, for progress bars.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuizProgress {
    /// 1-based position of the current question.
    pub position: usize,
    pub total: usize,
    pub answered: usize,
}

/// One attempt at a lesson or daily quiz.
///
/// The session owns its random source; each question is shuffled once when it
/// is entered, so reading the current question repeatedly gives the same order.
#[derive(Debug)]
pub struct QuizSession {
    id: SessionId,
    kind: QuizKind,
    questions: Vec<Question>,
    current_index: usize,
    current: ShuffledQuestion,
    selected_answer: Option<usize>,
    score: ScoreAccumulator,
    explanation_visible: bool,
    timed_out: bool,
    phase: QuizPhase,
    started_at: DateTime<Utc>,
    completed_at: Option<DateTime<Utc>>,
    result: Option<ScoreResult>,
    completion_taken: bool,
    rng: StdRng,
}

impl QuizSession {
    /// Start a session presenting the first question.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::NoQuestions` if `questions` is empty.
    pub fn start(
        kind: QuizKind,
        questions: Vec<Question>,
        schedule: RewardSchedule,
        mut rng: StdRng,
        started_at: DateTime<Utc>,
    ) -> Result<Self, QuizError> {
        let Some(first) = questions.first() else {
            return Err(QuizError::NoQuestions);
        };
        let current = AnswerShuffler::shuffle(first, &mut rng);

        Ok(Self {
            id: SessionId::generate(),
            kind,
            questions,
            current_index: 0,
            current,
            selected_answer: None,
            score: ScoreAccumulator::new(schedule),
            explanation_visible: false,
            timed_out: false,
            phase: QuizPhase::Presenting,
            started_at,
            completed_at: None,
            result: None,
            completion_taken: false,
            rng,
        })
    }

    // Accessors
    #[must_use]
    pub fn id(&self) -> SessionId {
        self.id
    }

    #[must_use]
    pub fn kind(&self) -> &QuizKind {
        &self.kind
    }

    #[must_use]
    pub fn phase(&self) -> QuizPhase {
        self.phase
    }

    #[must_use]
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    #[must_use]
    pub fn completed_at(&self) -> Option<DateTime<Utc>> {
        self.completed_at
    }

    #[must_use]
    pub fn total_questions(&self) -> usize {
        self.questions.len()
    }

    #[must_use]
    pub fn current_index(&self) -> usize {
        self.current_index
    }

    /// The question being shown, with options in display order.
    ///
    /// Stays available while timed out so the UI can reveal the answer.
    #[must_use]
    pub fn current_question(&self) -> Option<&ShuffledQuestion> {
        if self.is_complete() {
            None
        } else {
            Some(&self.current)
        }
    }

    #[must_use]
    pub fn selected_answer(&self) -> Option<usize> {
        self.selected_answer
    }

    #[must_use]
    pub fn results(&self) -> &[bool] {
        self.score.results()
    }

    #[must_use]
    pub fn explanation_visible(&self) -> bool {
        self.explanation_visible
    }

    #[must_use]
    pub fn is_timed_out(&self) -> bool {
        self.timed_out
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.phase == QuizPhase::Completed
    }

    /// Final score, once completed.
    #[must_use]
    pub fn score(&self) -> Option<ScoreResult> {
        self.result
    }

    #[must_use]
    pub fn progress(&self) -> QuizProgress {
        QuizProgress {
            position: self.current_index + 1,
            total: self.questions.len(),
            answered: self.score.results().len().min(self.questions.len()),
        }
    }

    /// Store a pending selection. Re-selecting overwrites.
    pub fn select_answer(&mut self, index: usize) -> bool {
        if self.phase != QuizPhase::Presenting || index >= self.current.display_options().len() {
            return false;
        }
        self.selected_answer = Some(index);
        true
    }

    /// Grade the pending selection and reveal the explanation.
    ///
    /// Returns whether the answer was correct, or `None` if nothing was submitted.
    pub fn submit_answer(&mut self) -> Option<bool> {
        if self.phase != QuizPhase::Presenting {
            return None;
        }
        let selected = self.selected_answer?;

        let correct = self.current.is_correct(selected);
        self.score.record(correct);
        self.explanation_visible = true;
        self.phase = QuizPhase::Answered;
        Some(correct)
    }

    /// Move past an answered question, finishing after the last one.
    pub fn advance(&mut self, now: DateTime<Utc>) -> Option<Advance> {
        if self.phase != QuizPhase::Answered {
            return None;
        }

        let next = self.current_index + 1;
        if next >= self.questions.len() {
            return Some(Advance::Completed(self.complete(now)));
        }

        self.current_index = next;
        self.current = AnswerShuffler::shuffle(&self.questions[next], &mut self.rng);
        self.selected_answer = None;
        self.explanation_visible = false;
        self.phase = QuizPhase::Presenting;
        Some(Advance::Next(next))
    }

    /// Time ran out: freeze input, reveal the current answer and arm the
    /// grace deadline after which `complete_if_due` closes the session.
    pub fn force_timeout(&mut self, now: DateTime<Utc>, grace: Duration) -> bool {
        match self.phase {
            QuizPhase::Presenting | QuizPhase::Answered => {
                self.timed_out = true;
                self.explanation_visible = true;
                self.phase = QuizPhase::TimedOut {
                    completes_at: now + grace,
                };
                true
            }
            QuizPhase::TimedOut { .. } | QuizPhase::Completed => false,
        }
    }

    /// Finish a timed-out session once its grace deadline has passed.
    pub fn complete_if_due(&mut self, now: DateTime<Utc>) -> Option<ScoreResult> {
        match self.phase {
            QuizPhase::TimedOut { completes_at } if now >= completes_at => Some(self.complete(now)),
            _ => None,
        }
    }

    /// Hand out the completion record. Returns `Some` exactly once, after completion.
    pub fn take_completion(&mut self) -> Option<Completion> {
        if self.completion_taken {
            return None;
        }
        let score = self.result?;
        let completed_at = self.completed_at?;
        self.completion_taken = true;

        Some(Completion {
            session_id: self.id,
            source: self.kind.completion_source(),
            score,
            timed_out: self.timed_out,
            completed_at,
        })
    }

    fn complete(&mut self, now: DateTime<Utc>) -> ScoreResult {
        self.score.pad_unanswered(self.questions.len());
        let result = self.score.finish(self.questions.len());
        self.result = Some(result);
        self.completed_at = Some(now);
        self.selected_answer = None;
        self.phase = QuizPhase::Completed;
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::QuizSettings;
    use crate::model::question::tests::question;
    use crate::time::fixed_now;
    use rand::SeedableRng;

    fn questions(n: usize) -> Vec<Question> {
        (0..n)
            .map(|i| question(&format!("q{i}"), &["certa", "errada 1", "errada 2", "errada 3"], 0))
            .collect()
    }

    fn daily(n: usize) -> QuizSession {
        QuizSession::start(
            QuizKind::Daily,
            questions(n),
            RewardSchedule::daily(&QuizSettings::default()),
            StdRng::seed_from_u64(42),
            fixed_now(),
        )
        .unwrap()
    }

    fn correct_index(session: &QuizSession) -> usize {
        session.current_question().unwrap().display_correct_index()
    }

    fn wrong_index(session: &QuizSession) -> usize {
        (correct_index(session) + 1) % 4
    }

    fn answer(session: &mut QuizSession, correct: bool) {
        let idx = if correct {
            correct_index(session)
        } else {
            wrong_index(session)
        };
        assert!(session.select_answer(idx));
        assert_eq!(session.submit_answer(), Some(correct));
    }

    #[test]
    fn empty_question_list_is_rejected() {
        let err = QuizSession::start(
            QuizKind::Daily,
            Vec::new(),
            RewardSchedule::Daily { per_correct: 8 },
            StdRng::seed_from_u64(1),
            fixed_now(),
        )
        .unwrap_err();
        assert_eq!(err, QuizError::NoQuestions);
    }

    #[test]
    fn submit_without_selection_is_a_no_op() {
        let mut s = daily(2);
        assert_eq!(s.submit_answer(), None);
        assert_eq!(s.phase(), QuizPhase::Presenting);
        assert!(s.results().is_empty());
    }

    #[test]
    fn advance_before_answer_is_a_no_op() {
        let mut s = daily(2);
        assert_eq!(s.advance(fixed_now()), None);
        assert_eq!(s.current_index(), 0);
    }

    #[test]
    fn reselect_overwrites_and_out_of_range_is_ignored() {
        let mut s = daily(1);
        assert!(s.select_answer(1));
        assert!(s.select_answer(2));
        assert!(!s.select_answer(4));
        assert_eq!(s.selected_answer(), Some(2));
    }

    #[test]
    fn cannot_reselect_after_submit() {
        let mut s = daily(2);
        answer(&mut s, true);
        assert!(!s.select_answer(0));
        assert_eq!(s.submit_answer(), None);
        assert_eq!(s.results().len(), 1);
    }

    #[test]
    fn current_question_is_stable_between_reads() {
        let s = daily(3);
        let a = s.current_question().unwrap().clone();
        let b = s.current_question().unwrap().clone();
        assert_eq!(a, b);
    }

    #[test]
    fn advance_resets_selection_and_explanation() {
        let mut s = daily(2);
        answer(&mut s, false);
        assert!(s.explanation_visible());
        assert_eq!(s.advance(fixed_now()), Some(Advance::Next(1)));
        assert_eq!(s.selected_answer(), None);
        assert!(!s.explanation_visible());
        assert_eq!(s.progress().position, 2);
    }

    #[test]
    fn daily_three_of_five_awards_24() {
        let mut s = daily(5);
        for correct in [true, false, true, true, false] {
            answer(&mut s, correct);
            s.advance(fixed_now());
        }
        assert!(s.is_complete());
        let score = s.score().unwrap();
        assert_eq!(score.correct_count, 3);
        assert_eq!(score.points_awarded, 24);
        assert_eq!(s.results().len(), 5);
    }

    #[test]
    fn lesson_two_correct_awards_25() {
        let lesson = LessonId::new("ondas-formacao").unwrap();
        let mut s = QuizSession::start(
            QuizKind::Lesson(lesson.clone()),
            questions(2),
            RewardSchedule::lesson(15, &QuizSettings::default()),
            StdRng::seed_from_u64(3),
            fixed_now(),
        )
        .unwrap();
        answer(&mut s, true);
        s.advance(fixed_now());
        answer(&mut s, true);
        let done = s.advance(fixed_now() + Duration::seconds(30));
        assert!(matches!(done, Some(Advance::Completed(r)) if r.points_awarded == 25));

        let completion = s.take_completion().unwrap();
        assert_eq!(completion.source, CompletionSource::LessonQuiz(lesson));
        assert_eq!(completion.points(), 25);
        assert!(!completion.timed_out);
        assert_eq!(completion.completed_at, fixed_now() + Duration::seconds(30));
    }

    #[test]
    fn completion_is_taken_once() {
        let mut s = daily(1);
        assert!(s.take_completion().is_none());
        answer(&mut s, true);
        s.advance(fixed_now());
        assert!(s.take_completion().is_some());
        assert!(s.take_completion().is_none());
    }

    #[test]
    fn timeout_on_third_question_counts_prior_answers_only() {
        let mut s = daily(5);
        answer(&mut s, true);
        s.advance(fixed_now());
        answer(&mut s, true);
        s.advance(fixed_now());

        let at = fixed_now() + Duration::seconds(300);
        assert!(s.force_timeout(at, Duration::seconds(2)));
        assert!(s.is_timed_out());
        assert!(s.explanation_visible());
        assert!(s.current_question().is_some());

        // Input is frozen during the grace period.
        assert!(!s.select_answer(0));
        assert_eq!(s.submit_answer(), None);
        assert_eq!(s.advance(at), None);

        assert_eq!(s.complete_if_due(at + Duration::seconds(1)), None);
        let score = s.complete_if_due(at + Duration::seconds(2)).unwrap();
        assert_eq!(score.correct_count, 2);
        assert_eq!(score.points_awarded, 16);
        assert_eq!(s.results(), [true, true, false, false, false]);

        let completion = s.take_completion().unwrap();
        assert!(completion.timed_out);
    }

    #[test]
    fn timeout_after_submit_keeps_that_answer() {
        let mut s = daily(2);
        answer(&mut s, true);
        assert!(s.force_timeout(fixed_now(), Duration::zero()));
        let score = s.complete_if_due(fixed_now()).unwrap();
        assert_eq!(score.correct_count, 1);
        assert_eq!(s.results(), [true, false]);
    }

    #[test]
    fn timeout_is_ignored_once_timed_out_or_completed() {
        let mut s = daily(1);
        assert!(s.force_timeout(fixed_now(), Duration::seconds(2)));
        assert!(!s.force_timeout(fixed_now(), Duration::seconds(2)));

        let mut s = daily(1);
        answer(&mut s, true);
        s.advance(fixed_now());
        assert!(!s.force_timeout(fixed_now(), Duration::seconds(2)));
        assert_eq!(s.score().unwrap().correct_count, 1);
    }
}
