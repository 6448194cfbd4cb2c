use crate::common::DEFAULT_MAX_UPDATE_ATTEMPTS;
use crate::errors::{DocketError, DocketResult, ErrorKind};

/// What an update or delete does when its optimistic commit conflicts with a
/// concurrent writer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryPolicy {
    /// Give up on the conflicting document and move on to the next candidate.
    SingleAttempt,
    /// Re-read the document and try again, up to `max_attempts` commits in
    /// total; running out raises a `RetryExhausted` error.
    RetryUntilSuccess { max_attempts: u32 },
}

impl RetryPolicy {
    /// Default policy of updates.
    pub fn default_update() -> RetryPolicy {
        RetryPolicy::RetryUntilSuccess {
            max_attempts: DEFAULT_MAX_UPDATE_ATTEMPTS,
        }
    }

    /// Default policy of deletes.
    pub fn default_delete() -> RetryPolicy {
        RetryPolicy::SingleAttempt
    }

    /// Whether another commit may follow `attempts` failed ones.
    pub fn allows_retry(&self, attempts: u32) -> bool {
        match self {
            RetryPolicy::SingleAttempt => false,
            RetryPolicy::RetryUntilSuccess { max_attempts } => attempts < *max_attempts,
        }
    }

    pub(crate) fn validate(&self) -> DocketResult<()> {
        if let RetryPolicy::RetryUntilSuccess { max_attempts: 0 } = self {
            log::error!("Retry policy must allow at least one attempt");
            return Err(DocketError::new(
                "Retry policy must allow at least one attempt",
                ErrorKind::ConfigurationError,
            ));
        }
        Ok(())
    }
}

/// Per-call options of update and delete operations.
///
/// # Examples
///
/// ```rust,ignore
/// use docket::collection::{WriteOptions, RetryPolicy};
///
/// // Affect only the first match
/// let options = WriteOptions::just_once();
///
/// // Fail fast on contention
/// let options = WriteOptions::new().retry_policy(RetryPolicy::SingleAttempt);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WriteOptions {
    just_once: bool,
    retry_policy: Option<RetryPolicy>,
}

impl WriteOptions {
    pub fn new() -> Self {
        WriteOptions::default()
    }

    /// Options affecting only the first matching document.
    pub fn just_once() -> Self {
        WriteOptions {
            just_once: true,
            retry_policy: None,
        }
    }

    /// Overrides the collection's retry policy for this call.
    pub fn retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.retry_policy = Some(policy);
        self
    }

    pub fn is_just_once(&self) -> bool {
        self.just_once
    }

    pub fn retry_policy_override(&self) -> Option<RetryPolicy> {
        self.retry_policy
    }
}
