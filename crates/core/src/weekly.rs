//! Weekly challenge rotation and checklist.

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::model::{Completion, CompletionSource, SessionId, WeeklyChallenge};
use crate::scoring::ScoreResult;
use crate::time::epoch_week;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum WeeklyChallengeError {
    #[error("no weekly challenge variants are configured")]
    NoVariants,
}

/// The variant active during the 7-day epoch bucket containing `now`.
///
/// # Errors
///
/// Returns `WeeklyChallengeError::NoVariants` if `variants` is empty.
pub fn select_weekly_challenge(
    now: DateTime<Utc>,
    variants: &[WeeklyChallenge],
) -> Result<&WeeklyChallenge, WeeklyChallengeError> {
    if variants.is_empty() {
        return Err(WeeklyChallengeError::NoVariants);
    }
    let len = i64::try_from(variants.len()).unwrap_or(i64::MAX);
    let slot = epoch_week(now).rem_euclid(len);
    let slot = usize::try_from(slot).unwrap_or(0);
    Ok(&variants[slot])
}

/// Untimed checklist for one weekly challenge.
#[derive(Debug, Clone)]
pub struct ChallengeTaskList {
    id: SessionId,
    challenge: WeeklyChallenge,
    done: Vec<bool>,
    threshold_percent: u32,
    submitted: bool,
}

impl ChallengeTaskList {
    #[must_use]
    pub fn new(challenge: WeeklyChallenge, threshold_percent: u32) -> Self {
        let done = vec![false; challenge.tasks().len()];
        Self {
            id: SessionId::generate(),
            challenge,
            done,
            threshold_percent,
            submitted: false,
        }
    }

    #[must_use]
    pub fn id(&self) -> SessionId {
        self.id
    }

    #[must_use]
    pub fn challenge(&self) -> &WeeklyChallenge {
        &self.challenge
    }

    #[must_use]
    pub fn done_flags(&self) -> &[bool] {
        &self.done
    }

    #[must_use]
    pub fn is_submitted(&self) -> bool {
        self.submitted
    }

    /// Flip a task. Returns the new state, or `None` for an unknown index or
    /// once the list has been submitted.
    pub fn toggle(&mut self, index: usize) -> Option<bool> {
        if self.submitted {
            return None;
        }
        let flag = self.done.get_mut(index)?;
        *flag = !*flag;
        Some(*flag)
    }

    #[must_use]
    pub fn done_count(&self) -> usize {
        self.done.iter().filter(|d| **d).count()
    }

    #[must_use]
    pub fn total(&self) -> usize {
        self.done.len()
    }

    /// Fraction of tasks done, in `[0, 1]`.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn ratio(&self) -> f64 {
        if self.done.is_empty() {
            return 0.0;
        }
        self.done_count() as f64 / self.total() as f64
    }

    #[must_use]
    pub fn can_submit(&self) -> bool {
        let done = self.done_count() as u64;
        let total = self.total() as u64;
        !self.submitted && total > 0 && done * 100 >= total * u64::from(self.threshold_percent)
    }

    /// `floor(done / total * challenge.points)`, computed in integers.
    #[must_use]
    pub fn points(&self) -> u32 {
        let total = self.total() as u64;
        if total == 0 {
            return 0;
        }
        let points = self.done_count() as u64 * u64::from(self.challenge.points()) / total;
        u32::try_from(points).unwrap_or(u32::MAX)
    }

    /// Submit the checklist. Below the threshold, or on a second call, nothing
    /// happens and `None` is returned.
    pub fn submit(&mut self, now: DateTime<Utc>) -> Option<Completion> {
        if !self.can_submit() {
            return None;
        }
        self.submitted = true;

        Some(Completion {
            session_id: self.id,
            source: CompletionSource::WeeklyChallenge(self.challenge.id().clone()),
            score: ScoreResult {
                correct_count: u32::try_from(self.done_count()).unwrap_or(u32::MAX),
                total_questions: u32::try_from(self.total()).unwrap_or(u32::MAX),
                points_awarded: self.points(),
            },
            timed_out: false,
            completed_at: now,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::challenge::tests::challenge;
    use crate::time::{WEEK_MILLIS, fixed_now};
    use chrono::Duration;

    fn variants() -> Vec<WeeklyChallenge> {
        vec![
            challenge("biodiversidade-canal", 75, 8),
            challenge("correntes-agulhas", 100, 8),
            challenge("acidificacao-oceanos", 60, 7),
            challenge("sedimentacao-continental", 85, 8),
        ]
    }

    #[test]
    fn rotation_follows_epoch_weeks() {
        let variants = variants();
        // week 2810 % 4 == 2
        let picked = select_weekly_challenge(fixed_now(), &variants).unwrap();
        assert_eq!(picked.id().as_str(), "acidificacao-oceanos");

        let next = fixed_now() + Duration::milliseconds(WEEK_MILLIS);
        let picked = select_weekly_challenge(next, &variants).unwrap();
        assert_eq!(picked.id().as_str(), "sedimentacao-continental");
    }

    #[test]
    fn same_bucket_same_variant() {
        let variants = variants();
        let start = DateTime::<Utc>::from_timestamp(0, 0).unwrap();
        let a = select_weekly_challenge(start, &variants).unwrap();
        let b = select_weekly_challenge(start + Duration::days(6), &variants).unwrap();
        assert_eq!(a.id(), b.id());
    }

    #[test]
    fn empty_variant_list_is_an_error() {
        assert_eq!(
            select_weekly_challenge(fixed_now(), &[]).unwrap_err(),
            WeeklyChallengeError::NoVariants
        );
    }

    #[test]
    fn six_of_eight_is_rejected_seven_is_accepted() {
        let mut list = ChallengeTaskList::new(challenge("correntes-agulhas", 100, 8), 80);
        for i in 0..6 {
            assert_eq!(list.toggle(i), Some(true));
        }
        assert!(!list.can_submit());
        assert_eq!(list.submit(fixed_now()), None);

        list.toggle(6);
        assert!((list.ratio() - 0.875).abs() < f64::EPSILON);
        let completion = list.submit(fixed_now()).unwrap();
        assert_eq!(completion.points(), 87);
        assert_eq!(completion.score.correct_count, 7);
        assert!(list.is_submitted());
    }

    #[test]
    fn submit_is_once() {
        let mut list = ChallengeTaskList::new(challenge("acidificacao-oceanos", 60, 7), 80);
        for i in 0..7 {
            list.toggle(i);
        }
        assert_eq!(list.submit(fixed_now()).unwrap().points(), 60);
        assert!(list.submit(fixed_now()).is_none());
        assert_eq!(list.toggle(0), None);
    }

    #[test]
    fn toggle_flips_back_and_ignores_unknown_index() {
        let mut list = ChallengeTaskList::new(challenge("x", 10, 2), 80);
        assert_eq!(list.toggle(0), Some(true));
        assert_eq!(list.toggle(0), Some(false));
        assert_eq!(list.toggle(9), None);
        assert_eq!(list.done_count(), 0);
    }
}
