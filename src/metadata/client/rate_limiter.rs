//! Minimum-spacing limiter for outbound TMDB calls.
//!
//! A GCRA limiter from [`governor`] with a burst of one: consecutive
//! acquisitions are spaced at least `delay` apart, and the first call after
//! a quiet period never waits. A zero delay disables limiting.

use std::fmt;
use std::num::NonZeroU32;
use std::time::Duration;

use governor::clock::{Clock, DefaultClock};
use governor::middleware::NoOpMiddleware;
use governor::state::{InMemoryState, NotKeyed};
use governor::Quota;
use tracing::debug;

type Limiter<C> =
    governor::RateLimiter<NotKeyed, InMemoryState, C, NoOpMiddleware<<C as Clock>::Instant>>;

pub struct RateLimiter<C: Clock = DefaultClock> {
    inner: Option<Limiter<C>>,
    delay: Duration,
    clock: C,
}

impl RateLimiter<DefaultClock> {
    pub fn new(delay: Duration) -> Self {
        Self::with_clock(delay, DefaultClock::default())
    }

    /// Wait until the next call is allowed, then claim the slot.
    pub async fn enforce(&self) {
        let Some(limiter) = &self.inner else {
            return;
        };

        if let Err(not_until) = limiter.check() {
            let wait = not_until.wait_time_from(self.clock.now());
            debug!(wait_ms = wait.as_millis() as u64, "Rate limiting TMDB call");
            limiter.until_ready().await;
        }
    }
}

impl<C: Clock> RateLimiter<C> {
    pub fn with_clock(delay: Duration, clock: C) -> Self {
        let inner = Quota::with_period(delay)
            .map(|q| q.allow_burst(NonZeroU32::MIN))
            .map(|quota| governor::RateLimiter::direct_with_clock(quota, &clock));

        Self {
            inner,
            delay,
            clock,
        }
    }

    /// Claim the slot if available, otherwise report how long to wait.
    pub fn try_acquire(&self) -> Result<(), Duration> {
        match &self.inner {
            None => Ok(()),
            Some(limiter) => limiter
                .check()
                .map_err(|not_until| not_until.wait_time_from(self.clock.now())),
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    pub fn is_enabled(&self) -> bool {
        self.inner.is_some()
    }
}

impl<C: Clock> fmt::Debug for RateLimiter<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RateLimiter")
            .field("delay", &self.delay)
            .field("enabled", &self.inner.is_some())
            .finish()
    }
}
