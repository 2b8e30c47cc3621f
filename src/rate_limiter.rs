use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::sync::Mutex;

use crate::config::get_config;
use crate::errors::{AppError, AppResult};

#[derive(Clone, Debug)]
struct RateLimitEntry {
    count: u32,
    window_start: DateTime<Utc>,
}

/// Fixed-window limiter keyed by admin and action.
pub struct RateLimiter {
    /// admin -> (action -> entry)
    entries: Mutex<HashMap<String, HashMap<String, RateLimitEntry>>>,
    max_requests: u32,
    window_seconds: i64,
}

impl RateLimiter {
    pub fn new(max_requests: u32, window_seconds: i64) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            max_requests,
            window_seconds,
        }
    }

    /// Count one attempt. Err once the window's budget is spent.
    pub fn check(&self, admin: &str, action: &str) -> AppResult<()> {
        self.check_at(admin, action, Utc::now())
    }

    fn check_at(&self, admin: &str, action: &str, now: DateTime<Utc>) -> AppResult<()> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|_| AppError::Internal("Failed to acquire rate limiter lock".to_string()))?;

        let window = Duration::seconds(self.window_seconds);
        let entry = entries
            .entry(admin.to_string())
            .or_default()
            .entry(action.to_string())
            .or_insert_with(|| RateLimitEntry { count: 0, window_start: now });

        if now >= entry.window_start + window {
            entry.count = 0;
            entry.window_start = now;
        }

        entry.count += 1;

        if entry.count > self.max_requests {
            let retry_after = (entry.window_start + window - now).num_seconds();
            return Err(AppError::Validation(format!(
                "Rate limit exceeded. Max {} dispatches per {} seconds. Try again in {} seconds.",
                self.max_requests,
                self.window_seconds,
                retry_after.max(0)
            )));
        }

        Ok(())
    }
}

lazy_static::lazy_static! {
    /// Email and WhatsApp notices.
    pub static ref NOTICE_DISPATCH_LIMIT: RateLimiter = RateLimiter::new(
        get_config().security.dispatch_limit,
        get_config().security.dispatch_window_secs,
    );

    /// Festival campaigns.
    pub static ref BULK_DISPATCH_LIMIT: RateLimiter = RateLimiter::new(
        get_config().security.dispatch_limit,
        get_config().security.dispatch_window_secs,
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_limit_per_admin_and_action() {
        let limiter = RateLimiter::new(2, 60);
        let now = Utc::now();
        assert!(limiter.check_at("a1", "notice", now).is_ok());
        assert!(limiter.check_at("a1", "notice", now).is_ok());
        assert!(limiter.check_at("a1", "notice", now).is_err());

        assert!(limiter.check_at("a2", "notice", now).is_ok());
        assert!(limiter.check_at("a1", "whatsapp", now).is_ok());
    }

    #[test]
    fn test_window_resets() {
        let limiter = RateLimiter::new(1, 60);
        let start = Utc::now();
        assert!(limiter.check_at("a1", "bulk", start).is_ok());
        let err = limiter.check_at("a1", "bulk", start + Duration::seconds(30)).unwrap_err();
        assert!(err.to_string().contains("Try again in 30 seconds"));
        assert!(limiter.check_at("a1", "bulk", start + Duration::seconds(60)).is_ok());
    }
}
