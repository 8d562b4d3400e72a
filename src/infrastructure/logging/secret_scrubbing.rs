//! Redaction of credentials from text that may end up in logs or error output.
//!
//! Provider error bodies sometimes echo the request headers or the key that
//! was rejected, so they are passed through [`scrub_secrets`] before being
//! logged or wrapped into an error.

use regex::{Captures, Regex};
use std::sync::LazyLock;

/// OpenAI keys: `sk-...`, `sk-proj-...`
static OPENAI_KEY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"sk-[A-Za-z0-9_-]{20,}").expect("valid OpenAI key pattern"));

/// Pinecone keys: `pcsk_...`
static PINECONE_KEY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"pcsk_[A-Za-z0-9_]{20,}").expect("valid Pinecone key pattern"));

static BEARER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Bearer\s+[A-Za-z0-9\-_\.]+").expect("valid bearer pattern"));

/// `api_key: "..."`, `token=...` and friends
static KEY_VALUE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)(["']?(?:api[_-]?key|token|secret)["']?\s*[:=]\s*)["']?[A-Za-z0-9\-_\.]{12,}["']?"#)
        .expect("valid key/value pattern")
});

/// Replace anything that looks like a credential with a redaction marker.
pub fn scrub_secrets(message: &str) -> String {
    let scrubbed = OPENAI_KEY.replace_all(message, "[API_KEY_REDACTED]");
    let scrubbed = PINECONE_KEY.replace_all(&scrubbed, "[API_KEY_REDACTED]");
    let scrubbed = BEARER.replace_all(&scrubbed, "Bearer [TOKEN_REDACTED]");
    KEY_VALUE
        .replace_all(&scrubbed, |caps: &Captures<'_>| format!("{}[REDACTED]", &caps[1]))
        .into_owned()
}

/// True when `value` has the shape of an OpenAI or Pinecone key.
pub fn looks_like_secret(value: &str) -> bool {
    OPENAI_KEY.is_match(value) || PINECONE_KEY.is_match(value)
}
