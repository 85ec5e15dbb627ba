// src/services/throttle.rs
// DOCUMENTATION: Request throttling for the login and settings route groups
// PURPOSE: "throttle:N,1" gates backed by governor keyed limiters

use crate::config::Config;
use crate::errors::CrmError;
use governor::{DefaultKeyedRateLimiter, Quota, RateLimiter};
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;

/// One rate-limited route group
/// DOCUMENTATION: Keys are client addresses for guest routes and
/// user ids for authenticated ones, so one bucket spans every route in the group
pub struct Throttle {
    name: &'static str,
    limiter: DefaultKeyedRateLimiter<String>,
}

impl Throttle {
    /// Allow `requests` per minute per key, with a burst of the same size
    pub fn per_minute(name: &'static str, requests: u32) -> Self {
        let quota = Quota::per_minute(NonZeroU32::new(requests).unwrap_or(NonZeroU32::MIN));
        Self {
            name,
            limiter: RateLimiter::keyed(quota),
        }
    }

    /// Consume one request for `key`
    pub fn check(&self, key: &str) -> Result<(), CrmError> {
        self.limiter.check_key(&key.to_string()).map_err(|_| {
            log::warn!("Throttle '{}' exceeded for {}", self.name, key);
            CrmError::RateLimitExceeded
        })
    }

    /// Drop buckets that are back at full capacity
    pub fn shrink(&self) {
        self.limiter.retain_recent();
        self.limiter.shrink_to_fit();
    }
}

/// Route group throttles shared by all workers
pub struct Throttles {
    /// POST /settings/emailchange1, /auth/login-recovery, /auth/login, /auth/2fa
    pub login: Throttle,

    /// /settings/emailchange2
    pub settings: Throttle,
}

impl Throttles {
    pub fn from_config(config: &Config) -> Self {
        Throttles {
            login: Throttle::per_minute("login", config.login_throttle_per_minute),
            settings: Throttle::per_minute("settings", config.settings_throttle_per_minute),
        }
    }
}

/// Start background cleanup task
/// DOCUMENTATION: Periodically forgets idle clients so the key maps stay small
pub fn start_throttle_cleanup_task(throttles: Arc<Throttles>, interval_seconds: u64) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(interval_seconds));

        loop {
            interval.tick().await;
            throttles.login.shrink();
            throttles.settings.shrink();
        }
    });
}
