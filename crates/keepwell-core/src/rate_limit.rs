use std::num::NonZeroU32;

use governor::clock::DefaultClock;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter};

/// Process-wide limiter over outbound AI provider calls (classification and
/// embedding), shared across every pipeline task via `ServiceDeps` so a
/// burst of concurrent ingest jobs can't blow through the provider's own
/// rate limit.
pub type AiRateLimiter = RateLimiter<NotKeyed, InMemoryState, DefaultClock>;

pub fn ai_rate_limiter(requests_per_second: u32) -> AiRateLimiter {
    let quota = Quota::per_second(NonZeroU32::new(requests_per_second.max(1)).unwrap());
    RateLimiter::direct(quota)
}
