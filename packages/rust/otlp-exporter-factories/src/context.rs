//! The cancellable operation context threaded through every resolution.
//!
//! A [`BuildContext`] carries a [`CancellationToken`] and an optional deadline. It is passed,
//! unchanged, to each dependency producer and configuration reader, and checked once more
//! before an exporter constructor runs.

use std::time::Duration;

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::error::ContextError;

/// Cancellation and deadline for a single build.
///
/// Cloning is cheap and clones share the same token, so cancelling any clone cancels them all.
///
/// # Examples
///
/// ```
/// use otlp_exporter_factories::BuildContext;
/// use std::time::Duration;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let cx = BuildContext::new().with_timeout(Duration::from_secs(5));
/// assert!(cx.check().is_ok());
///
/// cx.cancel();
/// assert!(cx.check().is_err());
/// # }
/// ```
#[derive(Debug, Clone, Default)]
pub struct BuildContext {
    token: CancellationToken,
    deadline: Option<Instant>,
}

impl BuildContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Uses an existing token, e.g. one owned by the application's shutdown logic.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.token = token;
        self
    }

    /// Sets an absolute deadline. An earlier deadline already set is kept.
    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(match self.deadline {
            Some(existing) if existing < deadline => existing,
            _ => deadline,
        });
        self
    }

    /// Sets a deadline relative to now. Must be called inside a tokio runtime.
    pub fn with_timeout(self, timeout: Duration) -> Self {
        self.with_deadline(Instant::now() + timeout)
    }

    /// Derives a context that is cancelled with this one but can be cancelled on its own.
    pub fn child(&self) -> Self {
        Self {
            token: self.token.child_token(),
            deadline: self.deadline,
        }
    }

    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn token(&self) -> &CancellationToken {
        &self.token
    }

    /// Returns the reason the context is done, if it is.
    pub fn check(&self) -> Result<(), ContextError> {
        if self.token.is_cancelled() {
            return Err(ContextError::Cancelled);
        }
        match self.deadline {
            Some(deadline) if Instant::now() >= deadline => Err(ContextError::DeadlineExceeded),
            _ => Ok(()),
        }
    }

    /// Completes when the context is cancelled or its deadline passes.
    ///
    /// Producers that perform I/O race it against this future.
    pub async fn done(&self) -> ContextError {
        match self.deadline {
            Some(deadline) => {
                tokio::select! {
                    _ = self.token.cancelled() => ContextError::Cancelled,
                    _ = tokio::time::sleep_until(deadline) => ContextError::DeadlineExceeded,
                }
            }
            None => {
                self.token.cancelled().await;
                ContextError::Cancelled
            }
        }
    }
}
