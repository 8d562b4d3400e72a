use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tokio::time::sleep;

/// Shortest wait between refill checks
const MIN_WAIT: Duration = Duration::from_millis(10);

struct Bucket {
    tokens: f64,
    refilled_at: Instant,
}

impl Bucket {
    fn refill(&mut self, now: Instant, rate: f64, capacity: f64) {
        let elapsed = now.duration_since(self.refilled_at).as_secs_f64();
        self.tokens = elapsed.mul_add(rate, self.tokens).min(capacity);
        self.refilled_at = now;
    }
}

/// Token bucket rate limiter for outbound provider requests
///
/// Tokens refill continuously at `refill_rate` per second up to `capacity`.
/// The bucket starts full, so up to `capacity` requests go out immediately.
/// Clones share one bucket.
#[derive(Clone)]
pub struct TokenBucketRateLimiter {
    bucket: Arc<Mutex<Bucket>>,
    capacity: f64,
    refill_rate: f64,
}

impl TokenBucketRateLimiter {
    /// Create a new rate limiter
    ///
    /// Non-positive values are clamped to the smallest usable bucket;
    /// `ConfigLoader` rejects them before they get here.
    pub fn new(requests_per_second: f64, burst_size: u32) -> Self {
        let refill_rate = if requests_per_second > 0.0 {
            requests_per_second
        } else {
            1.0
        };
        let capacity = f64::from(burst_size.max(1));

        Self {
            bucket: Arc::new(Mutex::new(Bucket {
                tokens: capacity,
                refilled_at: Instant::now(),
            })),
            capacity,
            refill_rate,
        }
    }

    /// Take one token, sleeping until the bucket has refilled enough
    pub async fn acquire(&self) {
        loop {
            let wait = {
                let mut bucket = self.bucket.lock().await;
                bucket.refill(Instant::now(), self.refill_rate, self.capacity);
                if bucket.tokens >= 1.0 {
                    bucket.tokens -= 1.0;
                    return;
                }
                Duration::from_secs_f64((1.0 - bucket.tokens) / self.refill_rate)
            };

            sleep(wait.max(MIN_WAIT)).await;
        }
    }

    #[cfg(test)]
    async fn available_tokens(&self) -> f64 {
        let mut bucket = self.bucket.lock().await;
        bucket.refill(Instant::now(), self.refill_rate, self.capacity);
        bucket.tokens
    }
}
