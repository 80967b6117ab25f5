//! Request-scoped identity and cancellation.

use std::future::Future;
use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

/// Authenticated identity on whose behalf an operation executes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Principal {
    pub user_id: Uuid,
}

impl Principal {
    pub fn new(user_id: Uuid) -> Self {
        Self { user_id }
    }

    /// Build a principal from a verified token subject.
    pub fn from_subject(sub: &str) -> Result<Self, uuid::Error> {
        Ok(Self::new(sub.parse()?))
    }

    /// Ownership is derived fresh from stored state on every call.
    pub fn owns(&self, author_id: Uuid) -> bool {
        self.user_id == author_id
    }
}

/// Per-call context: who is acting, and when to give up.
///
/// Cloning shares the cancellation token, so cancelling the original also
/// cancels every clone handed to spawned work.
#[derive(Debug, Clone)]
pub struct RequestContext {
    principal: Principal,
    cancel: CancellationToken,
    deadline: Option<Instant>,
}

impl RequestContext {
    pub fn new(principal: Principal) -> Self {
        Self {
            principal,
            cancel: CancellationToken::new(),
            deadline: None,
        }
    }

    /// Attach a caller-owned cancellation token (builder pattern).
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    /// Give up once `timeout` has elapsed from now (builder pattern).
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.deadline = Some(Instant::now() + timeout);
        self
    }

    pub fn principal(&self) -> Principal {
        self.principal
    }

    pub fn user_id(&self) -> Uuid {
        self.principal.user_id
    }

    pub fn cancellation_token(&self) -> &CancellationToken {
        &self.cancel
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled() || self.deadline.is_some_and(|d| Instant::now() >= d)
    }

    /// Drive `fut` unless the request is cancelled or its deadline passes
    /// first. Returns `None` in that case; `fut` is dropped mid-flight.
    pub async fn race<F: Future>(&self, fut: F) -> Option<F::Output> {
        if self.is_cancelled() {
            return None;
        }
        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => None,
            _ = sleep_until(self.deadline) => None,
            out = fut => Some(out),
        }
    }
}

async fn sleep_until(deadline: Option<Instant>) {
    match deadline {
        Some(d) => tokio::time::sleep_until(d).await,
        None => std::future::pending().await,
    }
}
