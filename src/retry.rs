//! Bounded retry with exponential backoff
//!
//! A [`RetryPolicy`] is a plain value (target kind, attempt bound, backoff
//! curve) applied at the call site to any fallible operation together with a
//! classifier. Only failures classified as the policy's target kind are
//! retried; everything else propagates immediately, and an exhausted policy
//! re-raises the original error untouched so callers see the real
//! cloud-reported message.

use std::time::Duration;

use crate::classify::RetryKind;

/// Exponential backoff curve: `multiplier * 2^(attempt-1)` clamped to
/// `[min, max]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Backoff {
    pub multiplier: Duration,
    pub min: Duration,
    pub max: Duration,
}

impl Backoff {
    pub const fn new(multiplier: Duration, min: Duration, max: Duration) -> Self {
        Self { multiplier, min, max }
    }

    /// Sleep duration before retrying after the given 1-based attempt.
    pub fn delay(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(31);
        let raw = self.multiplier.saturating_mul(1u32 << exponent);
        raw.clamp(self.min, self.max)
    }
}

/// A reusable retry policy targeting one transient error kind.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub target: RetryKind,
    pub max_attempts: u32,
    pub backoff: Backoff,
    /// Label used in retry log lines, e.g. `"terraform init"`.
    pub label: &'static str,
}

/// Remote-state backend init: storage RBAC grants can lag behind the role
/// assignment that bootstrap just created.
pub const BACKEND_INIT: RetryPolicy = RetryPolicy {
    target: RetryKind::StorageRbacPropagation,
    max_attempts: 8,
    backoff: Backoff::new(Duration::from_secs(1), Duration::from_secs(2), Duration::from_secs(30)),
    label: "terraform init",
};

/// Stack apply: concurrent control-plane operations on a shared parent
/// resource surface as transient 409s.
pub const APPLY: RetryPolicy = RetryPolicy {
    target: RetryKind::RequestConflict,
    max_attempts: 5,
    backoff: Backoff::new(Duration::from_secs(1), Duration::from_secs(5), Duration::from_secs(60)),
    label: "terraform apply",
};

/// Key Vault secret writes: data-plane RBAC propagation mirrors the storage
/// case.
pub const SECRET_SET: RetryPolicy = RetryPolicy {
    target: RetryKind::VaultRbacPropagation,
    max_attempts: 8,
    backoff: Backoff::new(Duration::from_secs(1), Duration::from_secs(2), Duration::from_secs(30)),
    label: "keyvault secret set",
};

impl RetryPolicy {
    /// Run `operation`, retrying failures that `classify` maps to this
    /// policy's target kind. The original error is returned unmodified when
    /// attempts are exhausted; non-matching failures propagate immediately
    /// without sleeping.
    pub fn run<T, E>(
        &self,
        classify: impl Fn(&E) -> RetryKind,
        mut operation: impl FnMut() -> Result<T, E>,
    ) -> Result<T, E> {
        let mut attempt = 1;
        loop {
            match operation() {
                Ok(value) => return Ok(value),
                Err(error) => {
                    if classify(&error) != self.target || attempt >= self.max_attempts {
                        return Err(error);
                    }
                    let delay = self.backoff.delay(attempt);
                    tracing::warn!(
                        "{}: retrying after transient failure (attempt {}/{}); waiting {}s",
                        self.label,
                        attempt,
                        self.max_attempts,
                        delay.as_secs()
                    );
                    std::thread::sleep(delay);
                    attempt += 1;
                }
            }
        }
    }
}
