//! Asteroid service - note and link mutations across both stores
//!
//! Writes go to the document store first and to the graph store second, with
//! no transaction spanning the two. A graph failure after a successful
//! document write leaves the document in place; `reconcile` repairs it.

use super::error::{store_call, AsteroidError};
use super::guard::LinkGuard;
use super::models::*;
use crate::auth::RequestContext;
use crate::document::DocumentStore;
use crate::neo4j::GraphStore;
use chrono::Utc;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use uuid::Uuid;

/// Service for creating, linking and reading asteroids
pub struct AsteroidService {
    docs: Arc<dyn DocumentStore>,
    graph: Arc<dyn GraphStore>,
    guard: LinkGuard,
}

impl AsteroidService {
    pub fn new(docs: Arc<dyn DocumentStore>, graph: Arc<dyn GraphStore>) -> Self {
        Self {
            guard: LinkGuard::new(docs.clone()),
            docs,
            graph,
        }
    }

    // ========================================================================
    // Mutations
    // ========================================================================

    /// Create an asteroid owned by the principal, with optional links.
    pub async fn create(
        &self,
        ctx: &RequestContext,
        req: CreateAsteroidRequest,
    ) -> Result<Asteroid, AsteroidError> {
        let candidates: Vec<Uuid> = req
            .link_from
            .iter()
            .chain(req.link_to.iter())
            .copied()
            .collect();
        let authorized = self.guard.authorize(ctx, &candidates).await?;
        let nodes: HashMap<Uuid, AsteroidNode> = authorized
            .iter()
            .map(|item| (item.id, item.to_node()))
            .collect();

        let asteroid = Asteroid::new(ctx.user_id(), req.hub, req.kind, req.title, req.content);
        store_call(ctx, "create document", self.docs.create(&asteroid)).await?;

        let node = asteroid.to_node();
        let from_nodes = pick_nodes(&nodes, &req.link_from);
        let to_nodes = pick_nodes(&nodes, &req.link_to);

        let projected = async {
            store_call(ctx, "create graph node", self.graph.create_node(&node)).await?;
            store_call(
                ctx,
                "create incoming links",
                self.graph.create_edges(LinkDirection::From, &node, &from_nodes),
            )
            .await?;
            store_call(
                ctx,
                "create outgoing links",
                self.graph.create_edges(LinkDirection::To, &node, &to_nodes),
            )
            .await
        }
        .await;

        if let Err(e) = projected {
            tracing::warn!(
                asteroid_id = %asteroid.id,
                "Graph projection incomplete; document left for reconciliation"
            );
            return Err(e);
        }

        tracing::info!(
            asteroid_id = %asteroid.id,
            user_id = %asteroid.author_id,
            links_from = from_nodes.len(),
            links_to = to_nodes.len(),
            "Created asteroid"
        );
        Ok(asteroid)
    }

    /// Authorize `cur` plus `others`, then return the anchor projection and
    /// the projections of `others` in request order.
    async fn authorize_link(
        &self,
        ctx: &RequestContext,
        cur_id: Uuid,
        others: &[Uuid],
    ) -> Result<(AsteroidNode, Vec<AsteroidNode>), AsteroidError> {
        let mut candidates = Vec::with_capacity(others.len() + 1);
        candidates.push(cur_id);
        candidates.extend_from_slice(others);

        let authorized = self.guard.authorize(ctx, &candidates).await?;
        let nodes: HashMap<Uuid, AsteroidNode> = authorized
            .iter()
            .map(|item| (item.id, item.to_node()))
            .collect();
        let anchor = nodes
            .get(&cur_id)
            .cloned()
            .ok_or(AsteroidError::ForbiddenLinkTarget { ids: vec![cur_id] })?;
        Ok((anchor, pick_nodes(&nodes, others)))
    }

    async fn link(
        &self,
        ctx: &RequestContext,
        direction: LinkDirection,
        cur_id: Uuid,
        others: &[Uuid],
    ) -> Result<usize, AsteroidError> {
        let (anchor, others) = self.authorize_link(ctx, cur_id, others).await?;
        let linked = store_call(
            ctx,
            "create links",
            self.graph.create_edges(direction, &anchor, &others),
        )
        .await?;

        tracing::debug!(asteroid_id = %cur_id, %direction, linked, "Linked asteroids");
        Ok(linked)
    }

    async fn unlink(
        &self,
        ctx: &RequestContext,
        direction: LinkDirection,
        cur_id: Uuid,
        others: &[Uuid],
    ) -> Result<usize, AsteroidError> {
        let (anchor, others) = self.authorize_link(ctx, cur_id, others).await?;
        let ids: Vec<Uuid> = others.iter().map(|n| n.id).collect();
        let removed = store_call(
            ctx,
            "delete links",
            self.graph.delete_edges(direction, anchor.id, &ids),
        )
        .await?;

        tracing::debug!(asteroid_id = %cur_id, %direction, removed, "Unlinked asteroids");
        Ok(removed)
    }

    /// Add `cur -> target` edges. Returns the number of edges now present.
    pub async fn link_to(
        &self,
        ctx: &RequestContext,
        cur_id: Uuid,
        target_ids: &[Uuid],
    ) -> Result<usize, AsteroidError> {
        self.link(ctx, LinkDirection::To, cur_id, target_ids).await
    }

    /// Add `source -> cur` edges. Returns the number of edges now present.
    pub async fn link_from(
        &self,
        ctx: &RequestContext,
        cur_id: Uuid,
        source_ids: &[Uuid],
    ) -> Result<usize, AsteroidError> {
        self.link(ctx, LinkDirection::From, cur_id, source_ids).await
    }

    /// Remove `cur -> target` edges. Returns the number removed.
    pub async fn unlink_to(
        &self,
        ctx: &RequestContext,
        cur_id: Uuid,
        target_ids: &[Uuid],
    ) -> Result<usize, AsteroidError> {
        self.unlink(ctx, LinkDirection::To, cur_id, target_ids).await
    }

    /// Remove `source -> cur` edges. Returns the number removed.
    pub async fn unlink_from(
        &self,
        ctx: &RequestContext,
        cur_id: Uuid,
        source_ids: &[Uuid],
    ) -> Result<usize, AsteroidError> {
        self.unlink(ctx, LinkDirection::From, cur_id, source_ids).await
    }

    /// Replace the content of an asteroid. Title, hub and kind are untouched.
    pub async fn sync(
        &self,
        ctx: &RequestContext,
        id: Uuid,
        content: String,
    ) -> Result<Asteroid, AsteroidError> {
        let mut asteroid = self.guard.load_owned(ctx, id).await?;
        let now = Utc::now();
        store_call(
            ctx,
            "update content",
            self.docs.update_content(id, &content, now),
        )
        .await?;

        asteroid.content = content;
        asteroid.updated_at = now;
        tracing::debug!(asteroid_id = %id, "Synced asteroid content");
        Ok(asteroid)
    }

    /// Logically delete an asteroid. Its graph node stays and is filtered out
    /// on every read.
    pub async fn archive(&self, ctx: &RequestContext, id: Uuid) -> Result<(), AsteroidError> {
        self.guard.load_owned(ctx, id).await?;
        store_call(ctx, "archive document", self.docs.set_state(id, false, Utc::now())).await?;
        tracing::info!(asteroid_id = %id, user_id = %ctx.user_id(), "Archived asteroid");
        Ok(())
    }

    // ========================================================================
    // Reads
    // ========================================================================

    pub async fn get(&self, ctx: &RequestContext, id: Uuid) -> Result<Asteroid, AsteroidError> {
        self.guard.load_owned(ctx, id).await
    }

    /// Active hub asteroids of the principal.
    pub async fn list(&self, ctx: &RequestContext) -> Result<Vec<AsteroidItem>, AsteroidError> {
        store_call(ctx, "list hubs", self.docs.list_hub_by_author(ctx.user_id())).await
    }

    /// Asteroids with an edge into `id`.
    pub async fn list_linked_from(
        &self,
        ctx: &RequestContext,
        id: Uuid,
    ) -> Result<Vec<AsteroidItem>, AsteroidError> {
        self.list_linked(ctx, id, LinkDirection::From).await
    }

    /// Asteroids `id` has an edge to.
    pub async fn list_linked_to(
        &self,
        ctx: &RequestContext,
        id: Uuid,
    ) -> Result<Vec<AsteroidItem>, AsteroidError> {
        self.list_linked(ctx, id, LinkDirection::To).await
    }

    async fn list_linked(
        &self,
        ctx: &RequestContext,
        id: Uuid,
        direction: LinkDirection,
    ) -> Result<Vec<AsteroidItem>, AsteroidError> {
        self.guard.load_owned(ctx, id).await?;

        let mut seen = HashSet::new();
        let ids: Vec<Uuid> = store_call(ctx, "list links", self.graph.linked_ids(id, direction))
            .await?
            .into_iter()
            .filter(|linked| seen.insert(*linked))
            .collect();
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let principal = ctx.principal();
        let mut by_id: HashMap<Uuid, AsteroidItem> =
            store_call(ctx, "hydrate links", self.docs.list_items_by_ids(&ids))
                .await?
                .into_iter()
                .filter(|item| item.state && principal.owns(item.author_id))
                .map(|item| (item.id, item))
                .collect();

        Ok(ids.iter().filter_map(|id| by_id.remove(id)).collect())
    }
}

/// Projections for `ids` in order, each id once.
fn pick_nodes(nodes: &HashMap<Uuid, AsteroidNode>, ids: &[Uuid]) -> Vec<AsteroidNode> {
    let mut seen = HashSet::new();
    ids.iter()
        .filter(|id| seen.insert(**id))
        .filter_map(|id| nodes.get(id).cloned())
        .collect()
}
