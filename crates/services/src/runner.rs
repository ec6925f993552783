//! Drives one timed quiz session: user input, the countdown, the time-up grace
//! delay and the single hand-off to the progress sink.

use std::sync::{Arc, Mutex, MutexGuard};

use chrono::Duration;
use oceanos_core::model::{Completion, SessionId};
use oceanos_core::quiz::{Advance, QuizKind, QuizPhase, QuizProgress, QuizSession};
use oceanos_core::scoring::ScoreResult;
use tokio::sync::{oneshot, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::Clock;
use crate::error::{ProgressError, QuizServiceError};
use crate::progress_service::{ProgressSink, ProgressUpdate};
use crate::timer::SessionTimer;

/// How a runner ended.
#[derive(Debug, Clone)]
pub enum RunnerOutcome {
    Completed {
        score: ScoreResult,
        timed_out: bool,
        progress: Result<ProgressUpdate, Arc<ProgressError>>,
    },
    /// Left before finishing; nothing was recorded.
    Abandoned,
}

/// Read-only view of the session for rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizSnapshot {
    pub phase: QuizPhase,
    pub progress: QuizProgress,
    pub question: Option<QuestionView>,
    pub selected_answer: Option<usize>,
    pub timed_out: bool,
    pub remaining_seconds: u32,
    pub score: Option<ScoreResult>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionView {
    pub text: String,
    pub options: Vec<String>,
    /// Set once the explanation is visible.
    pub correct_index: Option<usize>,
    pub explanation: Option<String>,
}

type OutcomeSender = Arc<watch::Sender<Option<RunnerOutcome>>>;

/// A running quiz. All operations take `&self`; the session lives behind a
/// mutex shared only with this runner's countdown and grace tasks.
pub struct QuizRunner {
    session: Arc<Mutex<QuizSession>>,
    timer: Mutex<SessionTimer>,
    watchdog: Mutex<Option<JoinHandle<()>>>,
    sink: Arc<dyn ProgressSink>,
    clock: Clock,
    outcome: OutcomeSender,
}

impl QuizRunner {
    /// Start the countdown for `session`. Must be called inside a tokio runtime.
    pub fn start(
        session: QuizSession,
        duration_secs: u32,
        grace: Duration,
        clock: Clock,
        sink: Arc<dyn ProgressSink>,
    ) -> Self {
        info!(
            target: "quiz",
            session = %session.id(),
            kind = kind_label(session.kind()),
            questions = session.total_questions(),
            duration_secs,
            "quiz started"
        );

        let session = Arc::new(Mutex::new(session));
        let (outcome, _) = watch::channel(None);
        let outcome = Arc::new(outcome);

        let (expired_tx, expired_rx) = oneshot::channel();
        let mut timer = SessionTimer::new();
        timer.start(duration_secs, move || {
            let _ = expired_tx.send(());
        });

        let watchdog = tokio::spawn(watch_timeout(
            expired_rx,
            Arc::clone(&session),
            grace,
            clock,
            Arc::clone(&sink),
            Arc::clone(&outcome),
        ));

        Self {
            session,
            timer: Mutex::new(timer),
            watchdog: Mutex::new(Some(watchdog)),
            sink,
            clock,
            outcome,
        }
    }

    /// # Errors
    ///
    /// Returns `QuizServiceError::Poisoned` if the session lock is poisoned.
    pub fn session_id(&self) -> Result<SessionId, QuizServiceError> {
        Ok(self.lock()?.id())
    }

    /// # Errors
    ///
    /// Returns `QuizServiceError::Poisoned` if the session lock is poisoned.
    pub fn select_answer(&self, index: usize) -> Result<bool, QuizServiceError> {
        Ok(self.lock()?.select_answer(index))
    }

    /// Grade the pending selection.
    ///
    /// # Errors
    ///
    /// Returns `QuizServiceError::Poisoned` if the session lock is poisoned.
    pub fn submit_answer(&self) -> Result<Option<bool>, QuizServiceError> {
        let mut session = self.lock()?;
        let correct = session.submit_answer();
        if let Some(correct) = correct {
            debug!(
                target: "quiz",
                session = %session.id(),
                question = session.current_index(),
                correct,
                "answer submitted"
            );
        }
        Ok(correct)
    }

    /// Move on from an answered question. Finishing the last question stops
    /// the countdown and records the completion before returning.
    ///
    /// # Errors
    ///
    /// Returns `QuizServiceError::Poisoned` if the session lock is poisoned.
    pub async fn advance(&self) -> Result<Option<Advance>, QuizServiceError> {
        let (step, completion) = {
            let mut session = self.lock()?;
            let step = session.advance(self.clock.now());
            let completion = match step {
                Some(Advance::Completed(_)) => session.take_completion(),
                _ => None,
            };
            (step, completion)
        };

        if let Some(completion) = completion {
            self.stop_tasks()?;
            finish(self.sink.as_ref(), &self.outcome, completion).await;
        }
        Ok(step)
    }

    /// Leave the quiz without recording anything. A session that already
    /// completed keeps its recorded result.
    ///
    /// # Errors
    ///
    /// Returns `QuizServiceError::Poisoned` if a lock is poisoned.
    pub fn abandon(&self) -> Result<(), QuizServiceError> {
        let complete = self.lock()?.is_complete();
        if complete {
            return Ok(());
        }
        self.stop_tasks()?;
        let published = self.outcome.send_if_modified(|slot| {
            if slot.is_some() {
                return false;
            }
            *slot = Some(RunnerOutcome::Abandoned);
            true
        });
        if published {
            info!(target: "quiz", "quiz abandoned");
        }
        Ok(())
    }

    /// # Errors
    ///
    /// Returns `QuizServiceError::Poisoned` if a lock is poisoned.
    pub fn snapshot(&self) -> Result<QuizSnapshot, QuizServiceError> {
        let remaining_seconds = self
            .timer
            .lock()
            .map_err(|_| QuizServiceError::Poisoned)?
            .remaining_seconds();
        let session = self.lock()?;

        let question = session.current_question().map(|q| {
            let revealed = session.explanation_visible();
            QuestionView {
                text: q.original().text().to_owned(),
                options: q.display_options().to_vec(),
                correct_index: revealed.then(|| q.display_correct_index()),
                explanation: revealed.then(|| q.original().explanation().to_owned()),
            }
        });

        Ok(QuizSnapshot {
            phase: session.phase(),
            progress: session.progress(),
            question,
            selected_answer: session.selected_answer(),
            timed_out: session.is_timed_out(),
            remaining_seconds,
            score: session.score(),
        })
    }

    /// The outcome, if the runner has ended.
    #[must_use]
    pub fn outcome(&self) -> Option<RunnerOutcome> {
        self.outcome.borrow().clone()
    }

    /// A receiver that observes the outcome without borrowing the runner.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Option<RunnerOutcome>> {
        self.outcome.subscribe()
    }

    /// Wait until the runner completes or is abandoned.
    pub async fn wait_finished(&self) -> RunnerOutcome {
        wait_outcome(self.subscribe()).await
    }

    fn lock(&self) -> Result<MutexGuard<'_, QuizSession>, QuizServiceError> {
        self.session.lock().map_err(|_| QuizServiceError::Poisoned)
    }

    fn stop_tasks(&self) -> Result<(), QuizServiceError> {
        self.timer
            .lock()
            .map_err(|_| QuizServiceError::Poisoned)?
            .stop();
        if let Some(handle) = self
            .watchdog
            .lock()
            .map_err(|_| QuizServiceError::Poisoned)?
            .take()
        {
            handle.abort();
        }
        Ok(())
    }
}

impl Drop for QuizRunner {
    fn drop(&mut self) {
        if let Ok(mut timer) = self.timer.lock() {
            timer.stop();
        }
        if let Ok(mut watchdog) = self.watchdog.lock() {
            if let Some(handle) = watchdog.take() {
                handle.abort();
            }
        }
    }
}

/// Wait on a receiver from [`QuizRunner::subscribe`].
pub async fn wait_outcome(mut rx: watch::Receiver<Option<RunnerOutcome>>) -> RunnerOutcome {
    match rx.wait_for(Option::is_some).await {
        Ok(outcome) => outcome.clone().unwrap_or(RunnerOutcome::Abandoned),
        Err(_) => RunnerOutcome::Abandoned,
    }
}

async fn watch_timeout(
    expired: oneshot::Receiver<()>,
    session: Arc<Mutex<QuizSession>>,
    grace: Duration,
    clock: Clock,
    sink: Arc<dyn ProgressSink>,
    outcome: OutcomeSender,
) {
    if expired.await.is_err() {
        return;
    }

    let completes_at = {
        let Ok(mut session) = session.lock() else {
            warn!(target: "quiz", "session lock poisoned at timeout");
            return;
        };
        if !session.force_timeout(clock.now(), grace) {
            return;
        }
        info!(
            target: "quiz",
            session = %session.id(),
            answered = session.results().len(),
            total = session.total_questions(),
            "time is up"
        );
        match session.phase() {
            QuizPhase::TimedOut { completes_at } => completes_at,
            _ => return,
        }
    };

    tokio::time::sleep(grace.to_std().unwrap_or_default()).await;

    let completion = {
        let Ok(mut session) = session.lock() else {
            warn!(target: "quiz", "session lock poisoned after grace");
            return;
        };
        session.complete_if_due(clock.now().max(completes_at));
        session.take_completion()
    };

    if let Some(completion) = completion {
        finish(sink.as_ref(), &outcome, completion).await;
    }
}

async fn finish(sink: &dyn ProgressSink, outcome: &OutcomeSender, completion: Completion) {
    let score = completion.score;
    let timed_out = completion.timed_out;
    info!(
        target: "quiz",
        session = %completion.session_id,
        correct = score.correct_count,
        total = score.total_questions,
        points = score.points_awarded,
        timed_out,
        "quiz completed"
    );

    let progress = sink.record_completion(completion).await.map_err(|err| {
        warn!(target: "quiz", error = %err, "failed to record completion");
        Arc::new(err)
    });

    outcome.send_if_modified(|slot| {
        if slot.is_some() {
            return false;
        }
        *slot = Some(RunnerOutcome::Completed {
            score,
            timed_out,
            progress,
        });
        true
    });
}

fn kind_label(kind: &QuizKind) -> &'static str {
    match kind {
        QuizKind::Lesson(_) => "lesson",
        QuizKind::Daily => "daily",
    }
}
