//! Shared HTTP plumbing for the provider clients
//!
//! - Token bucket rate limiting for outbound requests
//! - Exponential backoff retry for transient failures

pub mod rate_limiter;
pub mod retry;

pub use rate_limiter::TokenBucketRateLimiter;
pub use retry::{RetryPolicy, Transient};
