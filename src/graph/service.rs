//! Graph service - neighbourhood and full-owner graph reads

use super::materializer::{assemble, collapse, Materializer};
use super::models::Graph;
use super::{clamp_depth, MAX_TRAVERSAL_DEPTH};
use crate::asteroid::error::{store_call, AsteroidError};
use crate::asteroid::LinkGuard;
use crate::auth::RequestContext;
use crate::document::DocumentStore;
use crate::neo4j::GraphStore;
use std::sync::Arc;
use uuid::Uuid;

/// Read-side service producing materialized graphs
pub struct GraphService {
    docs: Arc<dyn DocumentStore>,
    graph: Arc<dyn GraphStore>,
    guard: LinkGuard,
    materializer: Materializer,
    max_depth: u32,
}

impl GraphService {
    pub fn new(docs: Arc<dyn DocumentStore>, graph: Arc<dyn GraphStore>) -> Self {
        Self {
            guard: LinkGuard::new(docs.clone()),
            materializer: Materializer::new(docs.clone()),
            docs,
            graph,
            max_depth: MAX_TRAVERSAL_DEPTH,
        }
    }

    /// Lower the depth ceiling (builder pattern). Values above
    /// [`MAX_TRAVERSAL_DEPTH`] are ignored.
    pub fn with_max_depth(mut self, max_depth: u32) -> Self {
        self.max_depth = max_depth.clamp(1, MAX_TRAVERSAL_DEPTH);
        self
    }

    pub fn max_depth(&self) -> u32 {
        self.max_depth
    }

    /// Everything reachable from `anchor` within `depth` hops, ignoring edge
    /// direction.
    ///
    /// `depth <= 0` or above the ceiling means the ceiling. When nothing
    /// hydrates, the result is the anchor alone.
    pub async fn get_by_asteroid_id(
        &self,
        ctx: &RequestContext,
        anchor: Uuid,
        depth: i64,
    ) -> Result<Graph, AsteroidError> {
        let anchor_doc = self.guard.load_owned(ctx, anchor).await?;
        let depth = clamp_depth(depth, self.max_depth);

        let raw = store_call(ctx, "traverse graph", self.graph.traverse(anchor, depth)).await?;
        let graph = self
            .materializer
            .materialize(ctx, &raw, Some(anchor))
            .await?;

        if graph.is_empty() {
            tracing::debug!(asteroid_id = %anchor, depth, "Traversal empty; returning anchor");
            return Ok(Graph::single(&anchor_doc.to_item()));
        }
        Ok(graph)
    }

    /// Every active asteroid of the principal with the links among them.
    pub async fn get_full(&self, ctx: &RequestContext) -> Result<Graph, AsteroidError> {
        let author = ctx.user_id();
        let (items, raw) = tokio::try_join!(
            store_call(ctx, "list author documents", self.docs.list_by_author(author)),
            store_call(ctx, "read author graph", self.graph.full_graph(author)),
        )?;

        let collapsed = collapse(&raw);
        let graph = assemble(ctx.principal(), items, &collapsed.links, None);
        tracing::debug!(
            user_id = %author,
            nodes = graph.nodes.len(),
            links = graph.links.len(),
            "Built full graph"
        );
        Ok(graph)
    }
}
