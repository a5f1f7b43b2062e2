use rand::Rng;
use std::{future::Future, time::Duration};

/// Webhook の再送間隔。1 回目の失敗後は `base_delay`、以降 2 倍ずつ伸ばし
/// `max_delay` で頭打ちにする。`max_attempts == 1` なら再送しない。
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    max_attempts: usize,
    base_delay: Duration,
    max_delay: Duration,
    jitter: f64,
}

impl RetryPolicy {
    pub fn new(max_attempts: usize, base_delay: Duration, max_delay: Duration, jitter: f64) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay,
            max_delay: max_delay.max(base_delay),
            jitter: jitter.clamp(0.0, 1.0),
        }
    }

    fn backoff(&self, failures: u32) -> Duration {
        let delay = self
            .base_delay
            .saturating_mul(2_u32.saturating_pow(failures.saturating_sub(1)))
            .min(self.max_delay);
        if self.jitter == 0.0 {
            return delay;
        }
        let factor = rand::thread_rng().gen_range(1.0 - self.jitter..=1.0 + self.jitter);
        delay.mul_f64(factor)
    }

    /// `op` には 0 始まりの試行回数を渡す
    pub async fn retry_async<F, Fut, T, E>(&self, mut op: F) -> Result<T, E>
    where
        F: FnMut(usize) -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let mut attempt = 0;
        loop {
            let err = match op(attempt).await {
                Ok(val) => return Ok(val),
                Err(err) => err,
            };
            attempt += 1;
            if attempt >= self.max_attempts {
                return Err(err);
            }
            tokio::time::sleep(self.backoff(attempt as u32)).await;
        }
    }
}
