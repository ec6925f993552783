//! One-second countdown for timed quiz attempts.

use std::sync::Arc;
use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

/// Countdown that ticks once per second and calls `on_expire` at zero.
///
/// Every `start` and `stop` bumps an epoch counter. A countdown fires only if
/// it can claim its own epoch, so a stopped or replaced countdown never calls
/// its callback, and a live one calls it exactly once.
///
/// Dropping the timer stops it. Must be started from within a tokio runtime.
#[derive(Debug, Default)]
pub struct SessionTimer {
    remaining: Arc<AtomicU32>,
    epoch: Arc<AtomicU64>,
    running_epoch: Option<u64>,
    handle: Option<JoinHandle<()>>,
}

impl SessionTimer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a countdown of `duration_secs`, replacing any running one.
    pub fn start<F>(&mut self, duration_secs: u32, on_expire: F)
    where
        F: FnOnce() + Send + 'static,
    {
        self.stop();

        let epoch = self.epoch.fetch_add(1, Ordering::SeqCst) + 1;
        self.running_epoch = Some(epoch);
        self.remaining.store(duration_secs, Ordering::SeqCst);

        let remaining = Arc::clone(&self.remaining);
        let current = Arc::clone(&self.epoch);
        self.handle = Some(tokio::spawn(async move {
            let period = Duration::from_secs(1);
            let mut ticks = tokio::time::interval_at(Instant::now() + period, period);
            ticks.set_missed_tick_behavior(MissedTickBehavior::Delay);

            while remaining.load(Ordering::SeqCst) > 0 {
                ticks.tick().await;
                if current.load(Ordering::SeqCst) != epoch {
                    return;
                }
                remaining.fetch_sub(1, Ordering::SeqCst);
            }

            if current
                .compare_exchange(epoch, epoch + 1, Ordering::SeqCst, Ordering::SeqCst)
                .is_ok()
            {
                tracing::debug!(target: "timer", "countdown expired");
                on_expire();
            }
        }));
    }

    /// Cancel the countdown without calling its callback.
    pub fn stop(&mut self) {
        if self.running_epoch.take().is_some() {
            self.epoch.fetch_add(1, Ordering::SeqCst);
        }
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }

    /// True while a countdown is running and has not fired.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.running_epoch
            .is_some_and(|epoch| self.epoch.load(Ordering::SeqCst) == epoch)
    }

    #[must_use]
    pub fn remaining_seconds(&self) -> u32 {
        self.remaining.load(Ordering::SeqCst)
    }
}

impl Drop for SessionTimer {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    fn counter() -> (Arc<AtomicUsize>, impl FnOnce() + Send + 'static) {
        let fired = Arc::new(AtomicUsize::new(0));
        let hook = Arc::clone(&fired);
        (fired, move || {
            hook.fetch_add(1, Ordering::SeqCst);
        })
    }

    #[tokio::test(start_paused = true)]
    async fn counts_down_and_fires_once() {
        let (fired, on_expire) = counter();
        let mut timer = SessionTimer::new();
        timer.start(3, on_expire);
        assert!(timer.is_active());
        assert_eq!(timer.remaining_seconds(), 3);

        tokio::time::sleep(Duration::from_millis(1500)).await;
        assert_eq!(timer.remaining_seconds(), 2);
        assert_eq!(fired.load(Ordering::SeqCst), 0);

        tokio::time::sleep(Duration::from_secs(5)).await;
        assert_eq!(timer.remaining_seconds(), 0);
        assert_eq!(fired.load(Ordering::SeqCst), 1);
        assert!(!timer.is_active());
    }

    #[tokio::test(start_paused = true)]
    async fn stop_never_fires() {
        let (fired, on_expire) = counter();
        let mut timer = SessionTimer::new();
        timer.start(2, on_expire);
        tokio::time::sleep(Duration::from_millis(1500)).await;
        timer.stop();
        assert!(!timer.is_active());

        tokio::time::sleep(Duration::from_secs(10)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn restart_replaces_running_countdown() {
        let (first, first_expire) = counter();
        let (second, second_expire) = counter();
        let mut timer = SessionTimer::new();
        timer.start(2, first_expire);
        tokio::time::sleep(Duration::from_millis(1500)).await;

        timer.start(5, second_expire);
        assert_eq!(timer.remaining_seconds(), 5);

        tokio::time::sleep(Duration::from_secs(10)).await;
        assert_eq!(first.load(Ordering::SeqCst), 0);
        assert_eq!(second.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn drop_cancels() {
        let (fired, on_expire) = counter();
        {
            let mut timer = SessionTimer::new();
            timer.start(1, on_expire);
        }
        tokio::time::sleep(Duration::from_secs(5)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 0);
    }
}
