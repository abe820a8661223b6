//! Per-request execution context.
//!
//! `RequestContext` carries the request id, a cancellation token and an
//! optional deadline through every service call. Persistence calls are raced
//! against both; the losing storage future is dropped, which aborts it.

use std::future::Future;
use std::time::Duration;

use parley_types::error::RepositoryError;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

/// Cancellation and deadline signal for one inbound request.
///
/// The cancellation token forms a tree: cancelling a parent cancels every
/// child derived from it, but not vice versa.
#[derive(Debug, Clone)]
pub struct RequestContext {
    /// Unique identifier for this request (shared with children).
    pub request_id: Uuid,
    pub cancellation: CancellationToken,
    /// Point in time after which pending persistence calls fail.
    pub deadline: Option<Instant>,
}

impl RequestContext {
    /// A fresh context with no deadline.
    pub fn new() -> Self {
        Self {
            request_id: Uuid::now_v7(),
            cancellation: CancellationToken::new(),
            deadline: None,
        }
    }

    /// A fresh context whose deadline is `timeout` from now.
    pub fn with_timeout(timeout: Duration) -> Self {
        Self::new().with_deadline(Instant::now() + timeout)
    }

    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Derive a child context: same request id and deadline, child
    /// cancellation token.
    pub fn child(&self) -> Self {
        Self {
            request_id: self.request_id,
            cancellation: self.cancellation.child_token(),
            deadline: self.deadline,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancellation.is_cancelled()
    }

    /// Cancel this context (and all child contexts derived from it).
    pub fn cancel(&self) {
        self.cancellation.cancel();
    }

    /// Drive a persistence call to completion unless the request is cancelled
    /// or its deadline passes first.
    ///
    /// Cancellation wins over the deadline, and both win over a result that
    /// becomes ready in the same poll.
    pub async fn run<T, F>(&self, op: F) -> Result<T, RepositoryError>
    where
        F: Future<Output = Result<T, RepositoryError>>,
    {
        if self.is_cancelled() {
            return Err(RepositoryError::Cancelled);
        }

        let deadline = async {
            match self.deadline {
                Some(at) => tokio::time::sleep_until(at).await,
                None => std::future::pending::<()>().await,
            }
        };

        tokio::select! {
            biased;
            _ = self.cancellation.cancelled() => Err(RepositoryError::Cancelled),
            _ = deadline => Err(RepositoryError::DeadlineExceeded),
            result = op => result,
        }
    }
}

impl Default for RequestContext {
    fn default() -> Self {
        Self::new()
    }
}
