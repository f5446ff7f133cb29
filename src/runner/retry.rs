use crate::config::RetryConfig;
use rand::Rng;
use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, warn};

const MAX_DELAY: Duration = Duration::from_secs(30);

/// Run `operation` up to `config.max_attempts` times.
///
/// Delay after attempt n is `base * 2^(n-1)` plus up to `base` ms of jitter,
/// capped at 30s. `label` names the operation in logs.
pub async fn retry_with_backoff<F, Fut, T, E>(
    config: &RetryConfig,
    label: &str,
    mut operation: F,
) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: std::fmt::Display,
{
    let base = config.backoff_base_ms;
    let mut attempt: u32 = 1;

    loop {
        let err = match operation().await {
            Ok(value) => {
                if attempt > 1 {
                    debug!("{} succeeded on attempt {}", label, attempt);
                }
                return Ok(value);
            }
            Err(e) => e,
        };

        if attempt >= config.max_attempts {
            warn!("{}: giving up after {} attempts: {}", label, attempt, err);
            return Err(err);
        }

        let exp = base.saturating_mul(1u64 << (attempt - 1).min(20));
        let jitter = if base == 0 { 0 } else { rand::thread_rng().gen_range(0..base) };
        let delay = Duration::from_millis(exp.saturating_add(jitter)).min(MAX_DELAY);
        warn!("{}: attempt {} failed ({}), retrying in {:?}", label, attempt, err, delay);

        sleep(delay).await;
        attempt += 1;
    }
}
