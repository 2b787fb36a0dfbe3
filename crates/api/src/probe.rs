//! Bounded database reachability probe run before every write.
//!
//! Attempt `n` (1-based) that fails waits `n * backoff` before the next one;
//! there is no wait after the last attempt. Exhausting the attempts yields
//! [`CoreError::StoreUnavailable`], which is distinct from validation errors.

use std::time::Duration;

use trattoria_core::error::CoreError;
use trattoria_db::DbPool;

use crate::config::ServerConfig;

/// How many times to probe and how long to wait between attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProbePolicy {
    pub attempts: u32,
    pub backoff: Duration,
}

impl ProbePolicy {
    pub fn from_config(config: &ServerConfig) -> Self {
        Self {
            attempts: config.db_probe_attempts.max(1),
            backoff: config.probe_backoff(),
        }
    }

    /// Linear backoff: the wait after failed attempt `attempt` (1-based).
    pub fn delay_after(&self, attempt: u32) -> Duration {
        self.backoff * attempt
    }
}

/// Probe the store until it answers or the policy is exhausted.
pub async fn probe_with_retry(pool: &DbPool, policy: ProbePolicy) -> Result<(), CoreError> {
    let mut last_err = None;

    for attempt in 1..=policy.attempts {
        match trattoria_db::health_check(pool).await {
            Ok(()) => {
                if attempt > 1 {
                    tracing::info!(attempt, "Database reachable after retry");
                }
                return Ok(());
            }
            Err(e) => {
                tracing::warn!(
                    attempt,
                    max_attempts = policy.attempts,
                    error = %e,
                    "Database probe failed"
                );
                last_err = Some(e);
                if attempt < policy.attempts {
                    tokio::time::sleep(policy.delay_after(attempt)).await;
                }
            }
        }
    }

    let reason = last_err.map_or_else(|| "no probe attempted".to_string(), |e| e.to_string());
    tracing::error!(attempts = policy.attempts, error = %reason, "Database unreachable after all probes");
    Err(CoreError::StoreUnavailable(reason))
}
