//! # Rate Limiting
//!
//! Fixed-window counter per client address, guarding the submission
//! endpoint against bursts.
//!
//! ## Implementation
//!
//! - One map entry per address: window start + request count
//! - A request against an expired entry resets the window, so the
//!   counter self-expires without a timer task
//! - Expired entries for addresses that never return are purged on
//!   access
//! - Process-local only: concurrent instances each count independently

use std::{
    collections::HashMap,
    net::IpAddr,
    sync::{Mutex, PoisonError},
    time::{Duration, Instant},
};

pub const MAX_REQUESTS: u32 = 5;
pub const WINDOW: Duration = Duration::from_secs(60);

pub struct RateLimiter {
    max_requests: u32,
    window: Duration,
    windows: Mutex<HashMap<IpAddr, (Instant, u32)>>,
}

impl RateLimiter {
    pub fn new(max_requests: u32, window: Duration) -> Self {
        Self {
            max_requests,
            window,
            windows: Mutex::new(HashMap::new()),
        }
    }

    /// Count a request from `addr` against its current window. Returns
    /// `false` when the window's quota is already spent; a rejected
    /// request is not counted.
    pub fn try_acquire(&self, addr: IpAddr) -> bool {
        self.try_acquire_at(addr, Instant::now())
    }

    fn try_acquire_at(&self, addr: IpAddr, now: Instant) -> bool {
        // A poisoned map still holds valid counters, keep serving.
        let mut windows = self
            .windows
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        let allowed = match windows.get_mut(&addr) {
            Some((start, count)) => {
                if now.duration_since(*start) >= self.window {
                    *start = now;
                    *count = 1;
                    true
                } else if *count >= self.max_requests {
                    false
                } else {
                    *count += 1;
                    true
                }
            }
            None => {
                windows.insert(addr, (now, 1));
                true
            }
        };

        windows.retain(|_, (start, _)| now.duration_since(*start) < self.window);

        allowed
    }
}
