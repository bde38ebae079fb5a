use std::future::Future;
use std::time::Duration;

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::error::HttpError;

/// Per-call cancellation and deadline.
///
/// Passed by reference into every [`Transport`](crate::Transport) call.
/// Transports run their work through [`CallContext::run`], which resolves to
/// [`HttpError::Cancelled`] once the token fires and to
/// [`HttpError::DeadlineExceeded`] once the deadline passes. Dropping the
/// call's future cancels it as well.
///
/// ```ignore
/// let ctx = CallContext::new().with_timeout(Duration::from_secs(5));
/// let reply = admin.delete_user(&ctx, 42).await?;
/// ```
#[derive(Debug, Clone, Default)]
pub struct CallContext {
    deadline: Option<Instant>,
    cancel: CancellationToken,
}

impl CallContext {
    /// Context with no deadline and a fresh cancellation token.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the deadline to `timeout` from now.
    #[must_use]
    pub fn with_timeout(self, timeout: Duration) -> Self {
        self.with_deadline(Instant::now() + timeout)
    }

    #[must_use]
    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Tie this context to an existing token, e.g. a child of a shutdown token.
    #[must_use]
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    #[must_use]
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    #[must_use]
    pub fn cancellation(&self) -> &CancellationToken {
        &self.cancel
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Drive `fut` to completion unless the context is cancelled or expires first.
    ///
    /// Cancellation is checked before the future is polled, so an already
    /// cancelled context never starts the work.
    ///
    /// # Errors
    ///
    /// Returns whatever `fut` returns, or `HttpError::Cancelled` /
    /// `HttpError::DeadlineExceeded`.
    pub async fn run<F, T>(&self, fut: F) -> Result<T, HttpError>
    where
        F: Future<Output = Result<T, HttpError>>,
    {
        let bounded = async {
            match self.deadline {
                Some(deadline) => match tokio::time::timeout_at(deadline, fut).await {
                    Ok(result) => result,
                    Err(_) => Err(HttpError::DeadlineExceeded),
                },
                None => fut.await,
            }
        };

        tokio::select! {
            biased;
            () = self.cancel.cancelled() => Err(HttpError::Cancelled),
            result = bounded => result,
        }
    }
}
