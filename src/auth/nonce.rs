//! Nonce generation for signed requests.
//!
//! Aliyun rejects a `SignatureNonce` it has already seen from the same key,
//! so every signed request needs a fresh one.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use rand::Rng;

/// Trait for providing nonces for signed requests.
pub trait NonceProvider: Send + Sync {
    /// Generate the next nonce value.
    ///
    /// Values must not repeat across calls.
    fn next_nonce(&self) -> String;
}

/// Epoch milliseconds followed by a 6-digit random suffix.
///
/// The millisecond part is forced to increase between calls on the same
/// provider, so two requests in one millisecond still differ even if the
/// random suffixes collide.
pub struct TimestampNonce {
    last_millis: AtomicU64,
}

impl TimestampNonce {
    /// Create a new nonce provider.
    pub fn new() -> Self {
        Self {
            last_millis: AtomicU64::new(0),
        }
    }

    fn current_time_millis() -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis() as u64
    }

    fn next_millis(&self) -> u64 {
        let now = Self::current_time_millis();
        loop {
            let last = self.last_millis.load(Ordering::SeqCst);
            let next = now.max(last + 1);

            if self
                .last_millis
                .compare_exchange(last, next, Ordering::SeqCst, Ordering::SeqCst)
                .is_ok()
            {
                return next;
            }
        }
    }
}

impl Default for TimestampNonce {
    fn default() -> Self {
        Self::new()
    }
}

impl NonceProvider for TimestampNonce {
    fn next_nonce(&self) -> String {
        let suffix: u32 = rand::thread_rng().gen_range(0..1_000_000);
        format!("{}{:06}", self.next_millis(), suffix)
    }
}

/// Always returns the same nonce. Only useful for reproducible signatures.
#[derive(Debug, Clone)]
pub struct FixedNonce(pub String);

impl NonceProvider for FixedNonce {
    fn next_nonce(&self) -> String {
        self.0.clone()
    }
}
