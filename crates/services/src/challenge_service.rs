use std::sync::Arc;

use oceanos_core::model::QuizSettings;
use oceanos_core::weekly::{ChallengeTaskList, select_weekly_challenge};
use storage::content::ContentRepository;
use tracing::{info, instrument};

use crate::Clock;
use crate::error::QuizServiceError;
use crate::progress_service::{ProgressSink, ProgressUpdate};

/// Weekly challenge rotation and checklist submission.
pub struct ChallengeService {
    clock: Clock,
    threshold_percent: u32,
    content: Arc<dyn ContentRepository>,
    sink: Arc<dyn ProgressSink>,
}

impl ChallengeService {
    #[must_use]
    pub fn new(
        clock: Clock,
        settings: &QuizSettings,
        content: Arc<dyn ContentRepository>,
        sink: Arc<dyn ProgressSink>,
    ) -> Self {
        Self {
            clock,
            threshold_percent: settings.weekly_threshold_percent(),
            content,
            sink,
        }
    }

    /// A fresh checklist for this week's challenge.
    ///
    /// # Errors
    ///
    /// Returns `QuizServiceError::WeeklyChallenge` if no variants are configured.
    pub fn current(&self) -> Result<ChallengeTaskList, QuizServiceError> {
        let challenge =
            select_weekly_challenge(self.clock.now(), self.content.weekly_challenges())?;
        Ok(ChallengeTaskList::new(challenge.clone(), self.threshold_percent))
    }

    /// Submit the checklist. Returns `None` when it is below the threshold or
    /// was already submitted.
    ///
    /// # Errors
    ///
    /// Returns `QuizServiceError::Progress` if the completion cannot be recorded.
    #[instrument(level = "info", skip_all, fields(challenge = %list.challenge().id()))]
    pub async fn submit(
        &self,
        list: &mut ChallengeTaskList,
    ) -> Result<Option<ProgressUpdate>, QuizServiceError> {
        let Some(completion) = list.submit(self.clock.now()) else {
            info!(
                target: "weekly",
                done = list.done_count(),
                total = list.total(),
                "challenge not submittable"
            );
            return Ok(None);
        };
        info!(target: "weekly", points = completion.points(), "challenge submitted");
        Ok(Some(self.sink.record_completion(completion).await?))
    }
}
