use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use oceanos_core::goal::{GoalAward, GoalBoard, GoalEvent, GoalProgress};
use oceanos_core::model::{Completion, CompletionSource, LevelLadder, LevelStatus, UserProfile};
use oceanos_core::ranking::{Leaderboard, RankingEntry};
use oceanos_core::time::WEEK_MILLIS;
use storage::content::ContentRepository;
use storage::repository::{CompletionRow, ProgressStore};
use tokio::sync::Mutex;
use tracing::{info, instrument};

use crate::Clock;
use crate::error::ProgressError;

/// Leaderboard id of the local learner.
pub const CURRENT_USER_ID: &str = "voce";

/// What changed after a completion was recorded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressUpdate {
    pub completion_id: i64,
    pub points_awarded: u32,
    pub profile: UserProfile,
    pub level: LevelStatus,
    pub leveled_up: bool,
    pub goal_awards: Vec<GoalAward>,
}

/// Receives one completion per finished session.
#[async_trait]
pub trait ProgressSink: Send + Sync {
    /// # Errors
    ///
    /// Returns `ProgressError` if the completion cannot be persisted.
    async fn record_completion(
        &self,
        completion: Completion,
    ) -> Result<ProgressUpdate, ProgressError>;
}

/// Owns the persisted profile, level computation and goal tracking.
pub struct ProgressService {
    clock: Clock,
    store: Arc<dyn ProgressStore>,
    content: Arc<dyn ContentRepository>,
    ladder: LevelLadder,
    goals: Mutex<GoalBoard>,
}

impl ProgressService {
    /// Build the service and rebuild this week's goal progress from the
    /// completion log.
    ///
    /// # Errors
    ///
    /// Returns `ProgressError` if the log cannot be read.
    pub async fn load(
        clock: Clock,
        store: Arc<dyn ProgressStore>,
        content: Arc<dyn ContentRepository>,
    ) -> Result<Self, ProgressError> {
        let now = clock.now();
        let week_start = week_start(now);
        let rows = store.completions_since(week_start).await?;

        let mut board = GoalBoard::standard(week_start);
        for row in &rows {
            let completion = &row.completion;
            match &completion.source {
                CompletionSource::Goal(id) => {
                    board.roll_over(completion.completed_at);
                    board.mark_awarded(id);
                }
                _ => {
                    let subject = subject_of(content.as_ref(), &completion.source);
                    if let Some(event) = GoalEvent::from_completion(completion, subject) {
                        board.record(&event, completion.completed_at);
                    }
                }
            }
        }
        board.roll_over(now);
        info!(target: "progress", replayed = rows.len(), "goal board restored");

        Ok(Self {
            clock,
            store,
            content,
            ladder: LevelLadder::default(),
            goals: Mutex::new(board),
        })
    }

    #[must_use]
    pub fn with_ladder(mut self, ladder: LevelLadder) -> Self {
        self.ladder = ladder;
        self
    }

    #[must_use]
    pub fn ladder(&self) -> &LevelLadder {
        &self.ladder
    }

    /// # Errors
    ///
    /// Returns `ProgressError` if the profile cannot be read.
    pub async fn profile(&self) -> Result<UserProfile, ProgressError> {
        Ok(self.store.get_profile().await?)
    }

    /// # Errors
    ///
    /// Returns `ProgressError` if the profile cannot be read.
    pub async fn level(&self) -> Result<LevelStatus, ProgressError> {
        let profile = self.store.get_profile().await?;
        Ok(self.ladder.status(profile.points))
    }

    /// Current goals, after resetting any whose day or week has ended.
    pub async fn goals(&self) -> Vec<GoalProgress> {
        let mut board = self.goals.lock().await;
        board.roll_over(self.clock.now());
        board.goals().to_vec()
    }

    /// # Errors
    ///
    /// Returns `ProgressError` if the log cannot be read.
    pub async fn history(&self, limit: u32) -> Result<Vec<CompletionRow>, ProgressError> {
        Ok(self.store.list_completions(limit).await?)
    }

    /// Peers plus the local learner, ranked by points.
    ///
    /// # Errors
    ///
    /// Returns `ProgressError` if the profile cannot be read.
    pub async fn leaderboard(&self) -> Result<Leaderboard, ProgressError> {
        let profile = self.store.get_profile().await?;
        let mut entries: Vec<RankingEntry> = self
            .content
            .ranking_peers()
            .iter()
            .filter(|peer| peer.id != CURRENT_USER_ID)
            .cloned()
            .collect();
        entries.push(RankingEntry {
            id: CURRENT_USER_ID.into(),
            name: profile.name.clone(),
            university: profile.university.clone(),
            points: profile.points,
            level: self.ladder.status(profile.points).number,
            medal_count: 0,
            completed_lessons: profile.lessons_completed,
        });
        Ok(Leaderboard::new(entries, CURRENT_USER_ID))
    }
}

#[async_trait]
impl ProgressSink for ProgressService {
    #[instrument(level = "info", skip_all, fields(session = %completion.session_id, kind = completion.source.kind()))]
    async fn record_completion(
        &self,
        completion: Completion,
    ) -> Result<ProgressUpdate, ProgressError> {
        // Holding the board lock serializes profile read-modify-write.
        let mut board = self.goals.lock().await;

        let mut profile = self.store.get_profile().await?;
        let level_before = self.ladder.status(profile.points).number;

        // Goals advance on a copy that replaces the live board only once the
        // store has accepted the whole batch.
        let mut next_board = board.clone();
        let subject = subject_of(self.content.as_ref(), &completion.source);
        let goal_awards = match GoalEvent::from_completion(&completion, subject) {
            Some(event) => next_board.record(&event, completion.completed_at),
            None => Vec::new(),
        };

        let completed_at = completion.completed_at;
        let mut batch = Vec::with_capacity(1 + goal_awards.len());
        batch.push(completion);
        batch.extend(
            goal_awards
                .iter()
                .map(|award| award.clone().into_completion(completed_at)),
        );
        for row in &batch {
            profile.apply(row);
        }

        let ids = self.store.record_progress(&batch, &profile).await?;
        *board = next_board;

        for (id, row) in ids.iter().zip(&batch) {
            info!(
                target: "progress",
                completion_id = id,
                kind = row.source.kind(),
                source_id = row.source.source_id().unwrap_or("-"),
                points = row.points(),
                timed_out = row.timed_out,
                "completion stored"
            );
        }
        for award in &goal_awards {
            info!(target: "progress", goal = %award.goal_id, points = award.points, "goal reached");
        }

        let level = self.ladder.status(profile.points);
        let leveled_up = level.number > level_before;
        if leveled_up {
            info!(target: "progress", level = %level.label, points = profile.points, "level up");
        }

        Ok(ProgressUpdate {
            completion_id: ids.first().copied().unwrap_or_default(),
            points_awarded: batch
                .iter()
                .fold(0_u32, |total, row| total.saturating_add(row.points())),
            profile,
            level,
            leveled_up,
            goal_awards,
        })
    }
}

fn week_start(now: DateTime<Utc>) -> DateTime<Utc> {
    let millis = now.timestamp_millis().div_euclid(WEEK_MILLIS) * WEEK_MILLIS;
    DateTime::<Utc>::from_timestamp_millis(millis).unwrap_or(now)
}

fn subject_of(
    content: &dyn ContentRepository,
    source: &CompletionSource,
) -> Option<oceanos_core::model::SubjectId> {
    match source {
        CompletionSource::LessonRead(id) | CompletionSource::LessonQuiz(id) => {
            content.lesson(id).map(|(subject, _)| subject.id().clone())
        }
        _ => None,
    }
}
