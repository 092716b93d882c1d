use governor::{
    clock::{Clock, DefaultClock},
    state::direct::NotKeyed,
    state::InMemoryState,
    Quota, RateLimiter as GovernorRateLimiter,
};
use std::collections::HashMap;
use std::time::Instant;
use std::{num::NonZeroU32, sync::Arc, time::Duration};
use tokio::sync::RwLock;

type DirectLimiter = GovernorRateLimiter<NotKeyed, InMemoryState, DefaultClock>;

struct TrackedLogin {
    limiter: DirectLimiter,
    last_attempt: Instant,
}

/// Throttles login attempts per login name (username or email).
///
/// Every attempt consumes a cell; a successful login calls [`reset`](Self::reset),
/// so only consecutive failures add up. Default: 5 attempts per 15 minutes.
/// Logins idle long enough to be fully replenished are dropped on the next check.
#[derive(Clone)]
pub struct LoginRateLimiter {
    limiters: Arc<RwLock<HashMap<String, TrackedLogin>>>,
    quota: Quota,
    idle_after: Duration,
}

impl LoginRateLimiter {
    pub fn new() -> Self {
        Self::with_config(5, 15)
    }

    pub fn with_config(max_attempts: u32, window_minutes: u64) -> Self {
        let burst = NonZeroU32::new(max_attempts.max(1)).unwrap_or(NonZeroU32::MIN);
        let quota = Quota::with_period(Duration::from_secs(window_minutes.max(1) * 60))
            .unwrap_or_else(|| Quota::per_minute(burst))
            .allow_burst(burst);
        Self::with_quota(quota)
    }

    fn with_quota(quota: Quota) -> Self {
        let idle_after = quota
            .replenish_interval()
            .saturating_mul(quota.burst_size().get());
        Self {
            limiters: Arc::new(RwLock::new(HashMap::new())),
            quota,
            idle_after,
        }
    }

    /// Consume one attempt for `login`.
    ///
    /// Returns `Err(wait)` with the time until the next attempt is allowed.
    pub async fn check(&self, login: &str) -> Result<(), Duration> {
        let key = login.trim().to_lowercase();
        let now = Instant::now();

        let mut limiters = self.limiters.write().await;
        limiters.retain(|_, tracked| now.duration_since(tracked.last_attempt) < self.idle_after);

        let tracked = limiters.entry(key).or_insert_with(|| TrackedLogin {
            limiter: GovernorRateLimiter::direct(self.quota),
            last_attempt: now,
        });
        tracked.last_attempt = now;
        tracked
            .limiter
            .check()
            .map_err(|negative| negative.wait_time_from(DefaultClock::default().now()))
    }

    pub async fn reset(&self, login: &str) {
        let key = login.trim().to_lowercase();
        self.limiters.write().await.remove(&key);
    }

    pub async fn tracked_logins(&self) -> usize {
        self.limiters.read().await.len()
    }
}

impl Default for LoginRateLimiter {
    fn default() -> Self {
        Self::new()
    }
}
