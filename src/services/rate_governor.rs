use rand::Rng;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, OwnedSemaphorePermit, Semaphore};
use tokio::time::Instant;

use crate::config::Config;
use crate::error::FetchError;

/// Exponential backoff parameters
#[derive(Debug, Clone, Copy)]
pub struct BackoffSettings {
    pub base: Duration,
    pub max: Duration,
}

impl From<&Config> for BackoffSettings {
    fn from(config: &Config) -> Self {
        Self {
            base: Duration::from_millis(config.backoff_base_ms),
            max: Duration::from_millis(config.backoff_max_ms),
        }
    }
}

#[derive(Debug, Default)]
struct BackoffState {
    /// No new request is issued before this instant
    paused_until: Option<Instant>,
    throttle_events: u64,
}

/// Bounds concurrent outbound requests and coordinates backoff after throttling
///
/// One governor is shared by every list fetch it is handed to. Permits come from a
/// semaphore sized to the configured ceiling; a throttling report pauses all holders
/// until the computed delay has passed.
pub struct RateGovernor {
    permits: Arc<Semaphore>,
    ceiling: usize,
    backoff: BackoffSettings,
    state: Mutex<BackoffState>,
}

/// Scoped permit for one outbound request; released on drop
#[derive(Debug)]
pub struct GovernorPermit {
    _permit: OwnedSemaphorePermit,
}

impl RateGovernor {
    pub fn new(max_concurrent: usize, backoff: BackoffSettings) -> Self {
        let ceiling = max_concurrent.max(1);
        Self {
            permits: Arc::new(Semaphore::new(ceiling)),
            ceiling,
            backoff,
            state: Mutex::new(BackoffState::default()),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.max_concurrent_requests, BackoffSettings::from(config))
    }

    pub fn ceiling(&self) -> usize {
        self.ceiling
    }

    pub fn available_permits(&self) -> usize {
        self.permits.available_permits()
    }

    pub async fn throttle_events(&self) -> u64 {
        self.state.lock().await.throttle_events
    }

    /// Waits out any active pause, then takes one slot under the ceiling
    ///
    /// A pause reported while the caller was queued for a slot is honored too: the slot
    /// is handed back and the caller waits again.
    pub async fn acquire(&self) -> Result<GovernorPermit, FetchError> {
        loop {
            while let Some(wait) = self.pause_remaining().await {
                tracing::debug!(wait_ms = wait.as_millis() as u64, "Waiting for upstream backoff");
                tokio::time::sleep(wait).await;
            }

            let permit = self
                .permits
                .clone()
                .acquire_owned()
                .await
                .map_err(|_| FetchError::Cancelled)?;

            if self.pause_remaining().await.is_none() {
                return Ok(GovernorPermit { _permit: permit });
            }
            drop(permit);
        }
    }

    async fn pause_remaining(&self) -> Option<Duration> {
        let state = self.state.lock().await;
        let until = state.paused_until?;
        let now = Instant::now();
        (until > now).then(|| until - now)
    }

    /// Records a throttling response and returns how long the caller should wait
    ///
    /// The upstream hint wins when present (capped at the maximum delay); otherwise the
    /// delay grows exponentially with `attempt`, plus jitter.
    pub async fn report_throttled(&self, retry_after: Option<Duration>, attempt: u32) -> Duration {
        let delay = match retry_after {
            Some(hint) => hint.min(self.backoff.max),
            None => self.backoff_delay(attempt),
        };

        let mut state = self.state.lock().await;
        let resume_at = Instant::now() + delay;
        state.paused_until = Some(match state.paused_until {
            Some(existing) if existing > resume_at => existing,
            _ => resume_at,
        });
        state.throttle_events += 1;

        tracing::warn!(
            attempt,
            delay_ms = delay.as_millis() as u64,
            hinted = retry_after.is_some(),
            "Catalog throttled requests, backing off"
        );

        delay
    }

    /// Exponential delay for the given 1-based attempt, with up to 50% jitter, capped
    pub fn backoff_delay(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(16);
        let exp = self
            .backoff
            .base
            .saturating_mul(1u32 << exponent)
            .min(self.backoff.max);

        let jitter_ceiling = (exp.as_millis() / 2) as u64;
        let jitter = if jitter_ceiling == 0 {
            0
        } else {
            rand::rng().random_range(0..=jitter_ceiling)
        };

        (exp + Duration::from_millis(jitter)).min(self.backoff.max)
    }
}
