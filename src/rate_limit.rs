use std::net::IpAddr;
use std::time::{Duration, Instant};

use dashmap::DashMap;

#[derive(Debug, Clone, Copy)]
struct Window {
    count: u32,
    opened: Instant,
}

/// Fixed-window limit on lead posts per client address.
pub struct SubmissionRateLimiter {
    limit: u32,
    window: Duration,
    windows: DashMap<IpAddr, Window>,
}

impl SubmissionRateLimiter {
    pub fn new(limit: u32, window: Duration) -> Self {
        Self {
            limit,
            window,
            windows: DashMap::new(),
        }
    }

    /// `Err` carries the time left until the window reopens.
    pub fn check(&self, ip: IpAddr) -> Result<(), Duration> {
        self.check_at(ip, Instant::now())
    }

    pub fn check_at(&self, ip: IpAddr, now: Instant) -> Result<(), Duration> {
        let mut window = self.windows.entry(ip).or_insert(Window {
            count: 0,
            opened: now,
        });

        let age = now.saturating_duration_since(window.opened);
        if age >= self.window {
            *window = Window {
                count: 1,
                opened: now,
            };
            return Ok(());
        }
        if window.count >= self.limit {
            return Err(self.window - age);
        }
        window.count += 1;
        Ok(())
    }

    /// Forget windows that have already closed.
    pub fn sweep(&self) {
        let now = Instant::now();
        self.windows
            .retain(|_, w| now.saturating_duration_since(w.opened) < self.window);
    }

    pub fn len(&self) -> usize {
        self.windows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.windows.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ip(s: &str) -> IpAddr {
        s.parse().unwrap()
    }

    #[test]
    fn blocks_after_limit_until_window_reopens() {
        let limiter = SubmissionRateLimiter::new(2, Duration::from_secs(60));
        let t0 = Instant::now();
        let client = ip("10.0.0.1");

        assert!(limiter.check_at(client, t0).is_ok());
        assert!(limiter.check_at(client, t0).is_ok());
        let retry = limiter
            .check_at(client, t0 + Duration::from_secs(10))
            .unwrap_err();
        assert_eq!(retry, Duration::from_secs(50));

        assert!(limiter.check_at(client, t0 + Duration::from_secs(60)).is_ok());
    }

    #[test]
    fn limits_are_per_address() {
        let limiter = SubmissionRateLimiter::new(1, Duration::from_secs(60));
        let t0 = Instant::now();

        assert!(limiter.check_at(ip("10.0.0.1"), t0).is_ok());
        assert!(limiter.check_at(ip("10.0.0.1"), t0).is_err());
        assert!(limiter.check_at(ip("10.0.0.2"), t0).is_ok());
    }

    #[test]
    fn sweep_forgets_closed_windows() {
        let limiter = SubmissionRateLimiter::new(1, Duration::ZERO);
        limiter.check(ip("10.0.0.1")).unwrap();

        limiter.sweep();
        assert!(limiter.is_empty());
    }
}
