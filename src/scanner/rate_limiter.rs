//! Probe pacing.
//!
//! A token bucket shared by all workers of one scan. The bucket holds a single
//! token, so probes are spread evenly over each second instead of bursting.

use governor::{DefaultDirectRateLimiter, Quota};
use nonzero_ext::nonzero;
use std::num::NonZeroU32;
use std::sync::Arc;

/// Shared limit on probe starts per second.
#[derive(Clone)]
pub struct RateLimiter {
    limiter: Arc<DefaultDirectRateLimiter>,
}

impl RateLimiter {
    /// `None` when `per_second` is zero (no limit).
    pub fn new(per_second: u32) -> Option<Self> {
        let rate = NonZeroU32::new(per_second)?;
        let quota = Quota::per_second(rate).allow_burst(nonzero!(1u32));

        Some(Self {
            limiter: Arc::new(DefaultDirectRateLimiter::direct(quota)),
        })
    }

    /// Wait until the next probe may start.
    pub async fn wait(&self) {
        self.limiter.until_ready().await;
    }
}

impl std::fmt::Debug for RateLimiter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RateLimiter").finish_non_exhaustive()
    }
}
