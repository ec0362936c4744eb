use std::time::Duration;

/// Backoff policy for checkpoint and score writes. Local stores answer in
/// microseconds, so the defaults stay tight.
#[derive(Clone)]
pub struct RetryConfig {
    pub max_attempts: usize,
    pub base_backoff: Duration,
    pub max_backoff: Duration,
    pub jitter_max: Option<Duration>,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_backoff: Duration::from_millis(10),
            max_backoff: Duration::from_millis(200),
            jitter_max: Some(Duration::from_millis(25)),
        }
    }
}

impl RetryConfig {
    /// Used for checkpoint writes, where losing the record hurts recovery.
    pub fn persistent() -> Self {
        Self {
            max_attempts: 5,
            base_backoff: Duration::from_millis(25),
            max_backoff: Duration::from_millis(500),
            jitter_max: Some(Duration::from_millis(50)),
        }
    }
}

pub async fn retry_with_backoff<F, Fut, T, E>(config: RetryConfig, mut f: F) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = Result<T, E>>,
{
    let mut backoff = config.base_backoff;
    let mut last_err;

    let mut attempt = 1;
    loop {
        match f().await {
            Ok(value) => return Ok(value),
            Err(err) => last_err = err,
        }
        if attempt >= config.max_attempts {
            return Err(last_err);
        }
        attempt += 1;

        let jitter = match config.jitter_max {
            Some(max) if max.as_millis() > 0 => {
                Duration::from_millis(rand::random::<u64>() % (max.as_millis() as u64 + 1))
            }
            _ => Duration::ZERO,
        };
        tokio::time::sleep(backoff + jitter).await;
        backoff = std::cmp::min(backoff * 2, config.max_backoff);
    }
}
