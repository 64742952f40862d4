//! Quota Ledger - per-identity, per-UTC-day request counter backed by Redis.
//!
//! Records are created by atomic increment and never explicitly deleted;
//! every key carries an expiry at the next UTC midnight, so the ledger can
//! never accumulate without bound. The fail-open policy on backend outage
//! belongs to the caller (see chat handlers), not to this module.

use chrono::{DateTime, Duration, Utc};
use redis::AsyncCommands;
use thiserror::Error;

/// Floor for key expiry. Guards the race where a key created just before
/// midnight would otherwise expire the moment it is written.
const MIN_EXPIRY_SECS: i64 = 60;

#[derive(Debug, Error)]
pub enum QuotaError {
    #[error("quota store unavailable: {0}")]
    Store(#[from] redis::RedisError),
}

/// Per-day request ledger. Cheap to clone; the underlying `redis::Client`
/// hands out multiplexed connections per call.
#[derive(Clone)]
pub struct QuotaLedger {
    client: redis::Client,
}

impl QuotaLedger {
    pub fn new(client: redis::Client) -> Self {
        Self { client }
    }

    /// Atomically increments today's counter for `identity` and returns the
    /// post-increment count. The first hit of the day sets the key expiry to
    /// the next UTC midnight (floored at `MIN_EXPIRY_SECS`).
    pub async fn check_and_increment(&self, identity: &str) -> Result<u64, QuotaError> {
        let now = Utc::now();
        let key = day_key(identity, now);

        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let count: u64 = conn.incr(&key, 1u64).await?;

        if count == 1 {
            let ttl = seconds_until_utc_midnight_from(now).max(MIN_EXPIRY_SECS);
            let _: () = conn.expire(&key, ttl).await?;
        }

        Ok(count)
    }
}

/// Ledger key scoped to (identity, UTC day).
pub fn day_key(identity: &str, now: DateTime<Utc>) -> String {
    format!("quota:{identity}:{}", now.format("%Y-%m-%d"))
}

/// Seconds remaining until the next UTC midnight.
pub fn seconds_until_utc_midnight_from(now: DateTime<Utc>) -> i64 {
    let next_midnight = (now + Duration::days(1))
        .date_naive()
        .and_hms_opt(0, 0, 0)
        .expect("midnight is always a valid time")
        .and_utc();
    (next_midnight - now).num_seconds()
}

/// Seconds the caller should wait before retrying after a quota rejection.
pub fn retry_after_secs() -> i64 {
    seconds_until_utc_midnight_from(Utc::now()).max(MIN_EXPIRY_SECS)
}
