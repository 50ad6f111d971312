//! Cooperative cancellation for long-running engine stages.
//!
//! A [`Deadline`] is created once per invocation and passed by reference into
//! every engine that can run long (diff, audit, sanitize). Stages call
//! [`Deadline::check`] at section boundaries; there is no preemption.
use std::fmt;
use std::time::{Duration, Instant};

/// A per-invocation deadline. `Deadline::none()` never expires.
#[derive(Debug, Clone, Copy)]
pub struct Deadline {
    expires_at: Option<Instant>,
}

impl Deadline {
    /// A deadline that never expires.
    pub fn none() -> Self {
        Self { expires_at: None }
    }

    /// A deadline expiring `timeout` from now.
    pub fn after(timeout: Duration) -> Self {
        Self {
            expires_at: Some(Instant::now() + timeout),
        }
    }

    /// Returns `true` if the deadline has passed.
    pub fn is_expired(&self) -> bool {
        self.expires_at
            .is_some_and(|expires_at| Instant::now() >= expires_at)
    }

    /// Returns an error if the deadline has passed.
    ///
    /// # Errors
    ///
    /// [`DeadlineExceeded`] once the configured instant is reached.
    pub fn check(&self) -> Result<(), DeadlineExceeded> {
        if self.is_expired() {
            Err(DeadlineExceeded)
        } else {
            Ok(())
        }
    }
}

impl Default for Deadline {
    fn default() -> Self {
        Self::none()
    }
}

/// The deadline for the current invocation has passed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeadlineExceeded;

impl fmt::Display for DeadlineExceeded {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("operation cancelled: deadline exceeded")
    }
}

impl std::error::Error for DeadlineExceeded {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn none_never_expires() {
        let deadline = Deadline::none();
        assert!(!deadline.is_expired());
        assert!(deadline.check().is_ok());
    }

    #[test]
    fn elapsed_deadline_reports_expired() {
        let deadline = Deadline::after(Duration::from_secs(0));
        assert!(deadline.is_expired());
        assert_eq!(deadline.check(), Err(DeadlineExceeded));
    }

    #[test]
    fn future_deadline_is_not_expired() {
        let deadline = Deadline::after(Duration::from_secs(3600));
        assert!(deadline.check().is_ok());
    }

    #[test]
    fn exceeded_message_mentions_cancellation() {
        let msg = DeadlineExceeded.to_string();
        assert!(msg.contains("cancelled"), "message: {msg}");
    }
}
