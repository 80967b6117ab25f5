//! Turns raw graph-store results into a [`Graph`]
//!
//! Steps:
//! 1. collapse nodes by element key and edges by relationship key, then by
//!    persistent `(source, target)` pair
//! 2. hydrate every persistent id with one document-store call
//! 3. keep active items owned by the principal
//! 4. keep edges whose endpoints both survived (or touch the anchor)

use super::models::{Graph, GraphLink, GraphNode};
use crate::asteroid::error::{store_call, AsteroidError};
use crate::asteroid::AsteroidItem;
use crate::auth::{Principal, RequestContext};
use crate::document::DocumentStore;
use crate::neo4j::RawGraph;
use std::collections::HashSet;
use std::sync::Arc;
use uuid::Uuid;

/// Raw graph with store-level duplicates removed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Collapsed {
    /// Distinct persistent ids, first-seen order
    pub ids: Vec<Uuid>,
    /// Distinct directed pairs, first-seen order
    pub links: Vec<GraphLink>,
}

/// Collapse element-level duplicates into persistent ids and pairs.
pub fn collapse(raw: &RawGraph) -> Collapsed {
    let mut node_keys = HashSet::new();
    let mut seen_ids = HashSet::new();
    let mut ids = Vec::new();
    let mut push_node = |key: &str, id: Uuid| {
        if node_keys.insert(key.to_string()) && seen_ids.insert(id) {
            ids.push(id);
        }
    };

    for node in &raw.nodes {
        push_node(&node.key, node.id);
    }

    let mut rel_keys = HashSet::new();
    let mut pairs = HashSet::new();
    let mut links = Vec::new();
    for edge in &raw.edges {
        push_node(&edge.source.key, edge.source.id);
        push_node(&edge.target.key, edge.target.id);
        if !rel_keys.insert(edge.key.as_str()) {
            continue;
        }
        let link = GraphLink {
            source: edge.source.id,
            target: edge.target.id,
        };
        if pairs.insert(link) {
            links.push(link);
        }
    }

    Collapsed { ids, links }
}

/// Build the visible graph from hydrated items and candidate links.
///
/// Items that are inactive or not owned by `principal` are dropped, nodes are
/// sorted by title then id, and a link survives only when both endpoints are
/// visible or are the anchor.
pub fn assemble(
    principal: Principal,
    items: Vec<AsteroidItem>,
    links: &[GraphLink],
    anchor: Option<Uuid>,
) -> Graph {
    let mut seen = HashSet::new();
    let mut nodes: Vec<GraphNode> = items
        .iter()
        .filter(|item| item.state && principal.owns(item.author_id))
        .filter(|item| seen.insert(item.id))
        .map(GraphNode::from)
        .collect();
    nodes.sort_by(|a, b| a.title.cmp(&b.title).then(a.id.cmp(&b.id)));

    let mut visible: HashSet<Uuid> = nodes.iter().map(|n| n.id).collect();
    visible.extend(anchor);

    let links = links
        .iter()
        .filter(|l| visible.contains(&l.source) && visible.contains(&l.target))
        .copied()
        .collect();

    Graph { nodes, links }
}

/// Hydrates raw graph-store results against the document store.
#[derive(Clone)]
pub struct Materializer {
    docs: Arc<dyn DocumentStore>,
}

impl Materializer {
    pub fn new(docs: Arc<dyn DocumentStore>) -> Self {
        Self { docs }
    }

    pub async fn materialize(
        &self,
        ctx: &RequestContext,
        raw: &RawGraph,
        anchor: Option<Uuid>,
    ) -> Result<Graph, AsteroidError> {
        let collapsed = collapse(raw);
        if collapsed.ids.is_empty() {
            return Ok(Graph::default());
        }

        let items = store_call(
            ctx,
            "hydrate graph",
            self.docs.list_items_by_ids(&collapsed.ids),
        )
        .await?;

        let graph = assemble(ctx.principal(), items, &collapsed.links, anchor);
        tracing::debug!(
            raw_edges = raw.edges.len(),
            candidates = collapsed.ids.len(),
            nodes = graph.nodes.len(),
            links = graph.links.len(),
            "Materialized graph"
        );
        Ok(graph)
    }
}
