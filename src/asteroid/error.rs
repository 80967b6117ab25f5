//! Asteroid engine error types

use crate::auth::RequestContext;
use std::future::Future;
use thiserror::Error;
use uuid::Uuid;

/// Errors surfaced by the asteroid and graph services.
#[derive(Error, Debug)]
pub enum AsteroidError {
    /// Asteroid does not exist or has been archived
    #[error("Asteroid not found: {id}")]
    NotFound { id: Uuid },

    /// Asteroid exists but belongs to someone else
    #[error("Asteroid {id} does not belong to the current user")]
    Forbidden { id: Uuid },

    /// One or more link endpoints are missing or not owned by the caller
    #[error("Link targets rejected: {}", format_ids(.ids))]
    ForbiddenLinkTarget { ids: Vec<Uuid> },

    /// Unexpected document or graph store failure.
    ///
    /// `Display` stays opaque; the wrapped source carries the detail and is
    /// logged when the error is built.
    #[error("Internal store failure")]
    UpstreamStoreFailure {
        context: &'static str,
        #[source]
        source: anyhow::Error,
    },

    /// The request was cancelled or ran past its deadline
    #[error("Request cancelled")]
    Cancelled,
}

impl AsteroidError {
    /// Wrap a store error with call-site context and log it.
    pub fn upstream(context: &'static str, source: anyhow::Error) -> Self {
        tracing::error!(context, error = ?source, "Store operation failed");
        Self::UpstreamStoreFailure { context, source }
    }

    /// Message safe to hand back to a client.
    pub fn public_message(&self) -> String {
        self.to_string()
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    pub fn is_forbidden(&self) -> bool {
        matches!(
            self,
            Self::Forbidden { .. } | Self::ForbiddenLinkTarget { .. }
        )
    }
}

fn format_ids(ids: &[Uuid]) -> String {
    ids.iter()
        .map(|id| id.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Run a store call under the request's cancellation, mapping failures to
/// [`AsteroidError::UpstreamStoreFailure`].
pub(crate) async fn store_call<T, F>(
    ctx: &RequestContext,
    context: &'static str,
    fut: F,
) -> Result<T, AsteroidError>
where
    F: Future<Output = anyhow::Result<T>>,
{
    match ctx.race(fut).await {
        Some(Ok(value)) => Ok(value),
        Some(Err(e)) => Err(AsteroidError::upstream(context, e)),
        None => {
            tracing::debug!(context, "Store call abandoned: request cancelled");
            Err(AsteroidError::Cancelled)
        }
    }
}
