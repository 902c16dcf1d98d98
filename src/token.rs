//! Download token material and expiry rules.

use chrono::{DateTime, Duration, Utc};
use rand::{Rng, distr::Alphanumeric};

pub const TOKEN_LEN: usize = 48;

/// How long a freshly issued token stays valid.
pub fn token_ttl() -> Duration {
    Duration::days(3)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuedToken {
    pub value: String,
    pub expires_at: DateTime<Utc>,
}

impl IssuedToken {
    /// Fresh random token valid from `now` (inclusive) until `now + 3 days` (exclusive).
    pub fn issue(now: DateTime<Utc>) -> Self {
        Self {
            value: random_alphanumeric(TOKEN_LEN),
            expires_at: now + token_ttl(),
        }
    }
}

/// A token is usable strictly before its expiry instant.
pub fn is_valid_at(expires_at: DateTime<Utc>, now: DateTime<Utc>) -> bool {
    now < expires_at
}

pub fn random_alphanumeric(len: usize) -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(len)
        .map(char::from)
        .collect()
}
