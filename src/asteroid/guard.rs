//! Link authorization guard
//!
//! Every link mutation first proves that all of its endpoints exist, are
//! active and belong to the acting principal. The check is a single batched
//! document read over the whole candidate set and never writes. Single-note
//! reads go through [`LinkGuard::load_owned`].

use super::error::{store_call, AsteroidError};
use super::models::{Asteroid, AsteroidItem};
use crate::auth::RequestContext;
use crate::document::DocumentStore;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use uuid::Uuid;

/// Verifies link endpoints against the document store.
#[derive(Clone)]
pub struct LinkGuard {
    docs: Arc<dyn DocumentStore>,
}

impl LinkGuard {
    pub fn new(docs: Arc<dyn DocumentStore>) -> Self {
        Self { docs }
    }

    /// Load an active asteroid and check that the principal owns it.
    pub async fn load_owned(
        &self,
        ctx: &RequestContext,
        id: Uuid,
    ) -> Result<Asteroid, AsteroidError> {
        let asteroid = store_call(ctx, "load asteroid", self.docs.get(id))
            .await?
            .ok_or(AsteroidError::NotFound { id })?;

        if !ctx.principal().owns(asteroid.author_id) {
            tracing::warn!(
                asteroid_id = %id,
                user_id = %ctx.user_id(),
                "Access to foreign asteroid denied"
            );
            return Err(AsteroidError::Forbidden { id });
        }
        Ok(asteroid)
    }

    /// Authorize a candidate id set for the principal of `ctx`.
    ///
    /// Returns the distinct authorized items in first-seen order. Fails with
    /// [`AsteroidError::ForbiddenLinkTarget`] listing the missing ids if any
    /// id has no active document, otherwise listing the foreign ids if any
    /// item belongs to someone else.
    pub async fn authorize(
        &self,
        ctx: &RequestContext,
        ids: &[Uuid],
    ) -> Result<Vec<AsteroidItem>, AsteroidError> {
        let distinct = dedupe(ids);
        if distinct.is_empty() {
            return Ok(Vec::new());
        }

        let items = store_call(
            ctx,
            "guard lookup",
            self.docs.list_items_by_ids(&distinct),
        )
        .await?;

        let found: HashSet<Uuid> = items.iter().map(|i| i.id).collect();
        let missing: Vec<Uuid> = distinct
            .iter()
            .filter(|id| !found.contains(id))
            .copied()
            .collect();
        if !missing.is_empty() {
            tracing::debug!(
                user_id = %ctx.user_id(),
                missing = ?missing,
                "Link target does not exist"
            );
            return Err(AsteroidError::ForbiddenLinkTarget { ids: missing });
        }

        let principal = ctx.principal();
        let foreign: Vec<Uuid> = items
            .iter()
            .filter(|i| !principal.owns(i.author_id))
            .map(|i| i.id)
            .collect();
        if !foreign.is_empty() {
            tracing::warn!(
                user_id = %ctx.user_id(),
                foreign = ?foreign,
                "Link target owned by another user"
            );
            return Err(AsteroidError::ForbiddenLinkTarget { ids: foreign });
        }

        Ok(order_like(&distinct, items))
    }
}

fn dedupe(ids: &[Uuid]) -> Vec<Uuid> {
    let mut seen = HashSet::with_capacity(ids.len());
    ids.iter().filter(|id| seen.insert(**id)).copied().collect()
}

/// Reorder `items` to follow `ids`, dropping duplicates the store returned.
fn order_like(ids: &[Uuid], items: Vec<AsteroidItem>) -> Vec<AsteroidItem> {
    let mut by_id: HashMap<Uuid, AsteroidItem> =
        items.into_iter().map(|i| (i.id, i)).collect();
    ids.iter().filter_map(|id| by_id.remove(id)).collect()
}
