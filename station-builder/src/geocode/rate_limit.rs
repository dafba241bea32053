//! Rolling-window request budget.

use std::collections::VecDeque;
use std::time::Duration;

use tokio::time::Instant;

/// Counts requests over a rolling window and refuses once the budget is
/// spent. Each online geocoding service owns one.
///
/// An optional minimum interval spaces consecutive requests out; only
/// [`acquire`](Self::acquire) waits for it.
#[derive(Debug, Clone)]
pub struct RateLimiter {
    limit: usize,
    window: Duration,
    min_interval: Duration,
    last: Option<Instant>,
    sent: VecDeque<Instant>,
}

impl RateLimiter {
    /// Allow `limit` requests per `window`.
    pub fn new(limit: usize, window: Duration) -> Self {
        Self {
            limit,
            window,
            min_interval: Duration::ZERO,
            last: None,
            sent: VecDeque::new(),
        }
    }

    /// Allow `limit` requests per rolling hour.
    pub fn per_hour(limit: usize) -> Self {
        Self::new(limit, Duration::from_secs(60 * 60))
    }

    /// Keep at least `interval` between two requests.
    pub fn with_min_interval(mut self, interval: Duration) -> Self {
        self.min_interval = interval;
        self
    }

    /// Wait out the minimum interval, then record a request.
    ///
    /// Returns `false` at once, without waiting, when the budget is spent.
    pub async fn acquire(&mut self) -> bool {
        if self.remaining() == 0 {
            return false;
        }
        if let Some(last) = self.last {
            tokio::time::sleep_until(last + self.min_interval).await;
        }
        self.try_acquire()
    }

    /// Record a request if the budget allows it.
    ///
    /// Returns `false`, recording nothing, when the budget is spent.
    pub fn try_acquire(&mut self) -> bool {
        let now = Instant::now();
        self.prune(now);
        if self.sent.len() >= self.limit {
            return false;
        }
        self.sent.push_back(now);
        self.last = Some(now);
        true
    }

    /// Requests still allowed in the current window.
    pub fn remaining(&mut self) -> usize {
        self.prune(Instant::now());
        self.limit.saturating_sub(self.sent.len())
    }

    fn prune(&mut self, now: Instant) {
        while let Some(&oldest) = self.sent.front() {
            if now.duration_since(oldest) >= self.window {
                self.sent.pop_front();
            } else {
                break;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn refuses_once_spent() {
        let mut limiter = RateLimiter::new(2, Duration::from_secs(10));
        assert!(limiter.try_acquire());
        assert!(limiter.try_acquire());
        assert!(!limiter.try_acquire());
        assert_eq!(limiter.remaining(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn window_rolls() {
        let mut limiter = RateLimiter::new(2, Duration::from_secs(10));
        assert!(limiter.try_acquire());
        tokio::time::advance(Duration::from_secs(6)).await;
        assert!(limiter.try_acquire());
        assert!(!limiter.try_acquire());

        tokio::time::advance(Duration::from_secs(4)).await;
        assert_eq!(limiter.remaining(), 1);
        assert!(limiter.try_acquire());
        assert!(!limiter.try_acquire());
    }

    #[tokio::test(start_paused = true)]
    async fn zero_budget_never_allows() {
        let mut limiter = RateLimiter::per_hour(0);
        assert!(!limiter.try_acquire());
    }

    #[tokio::test(start_paused = true)]
    async fn acquire_spaces_requests() {
        let mut limiter = RateLimiter::new(5, Duration::from_secs(60))
            .with_min_interval(Duration::from_secs(1));
        let start = Instant::now();
        assert!(limiter.acquire().await);
        assert_eq!(start.elapsed(), Duration::ZERO);
        assert!(limiter.acquire().await);
        assert!(start.elapsed() >= Duration::from_secs(1));
        assert_eq!(limiter.remaining(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn acquire_skips_wait_after_a_pause() {
        let mut limiter = RateLimiter::per_hour(5).with_min_interval(Duration::from_secs(1));
        assert!(limiter.acquire().await);
        tokio::time::advance(Duration::from_secs(3)).await;
        let before = Instant::now();
        assert!(limiter.acquire().await);
        assert_eq!(before.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn acquire_refuses_without_waiting_when_spent() {
        let mut limiter = RateLimiter::new(1, Duration::from_secs(60))
            .with_min_interval(Duration::from_secs(30));
        assert!(limiter.acquire().await);
        let before = Instant::now();
        assert!(!limiter.acquire().await);
        assert_eq!(before.elapsed(), Duration::ZERO);
    }
}
