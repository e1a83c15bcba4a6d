//! Cooperative cancellation for long traversals.
//!
//! A [`CancelToken`] is checked at every traversal step and before every
//! collaborator call. Once it trips, the operation returns
//! [`Error::Cancelled`] and discards whatever it had computed so far.

use crate::error::{Error, Result};
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;

/// A [`CancellationToken`] with an optional deadline.
///
/// Clones share the same token, so a handler can keep one copy and pass the
/// other into the engine. A token built with [`from_token`](Self::from_token)
/// also trips when its parent is cancelled.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    token: CancellationToken,
    deadline: Option<Instant>,
}

impl CancelToken {
    /// A token that only trips when [`cancel`](Self::cancel) is called.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A token that also trips once `timeout` has elapsed.
    #[must_use]
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            token: CancellationToken::new(),
            deadline: Instant::now().checked_add(timeout),
        }
    }

    /// Wrap a token owned by the caller, e.g. a server's shutdown token.
    #[must_use]
    pub fn from_token(token: CancellationToken) -> Self {
        Self {
            token,
            deadline: None,
        }
    }

    /// Trip the token for every clone.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    /// Whether the token has been cancelled or its deadline has passed.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
            || self.deadline.is_some_and(|deadline| Instant::now() >= deadline)
    }

    /// Return `Err(Error::Cancelled)` if the token has tripped.
    ///
    /// # Errors
    ///
    /// Returns `Error::Cancelled` once the token is cancelled or expired.
    pub fn check(&self) -> Result<()> {
        if self.is_cancelled() {
            Err(Error::Cancelled)
        } else {
            Ok(())
        }
    }
}
