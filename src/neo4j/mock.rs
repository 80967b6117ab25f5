//! In-memory mock implementation of GraphStore for testing.
//!
//! Edges live in a plain list so tests can seed duplicate or cross-author
//! relationships that the real store would never produce through the
//! service. `create_edges` itself behaves like `MERGE`.

use crate::asteroid::{AsteroidNode, LinkDirection};
use crate::neo4j::models::*;
use crate::neo4j::traits::GraphStore;
use anyhow::{bail, Result};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct MockEdge {
    pub key: String,
    pub source: Uuid,
    pub target: Uuid,
}

/// In-memory mock implementation of GraphStore for testing.
pub struct MockGraphStore {
    pub nodes: RwLock<HashMap<Uuid, (String, AsteroidNode)>>,
    pub edges: RwLock<Vec<MockEdge>>,
    /// When set, every mutation fails
    pub fail_writes: AtomicBool,
    next_key: AtomicUsize,
}

impl MockGraphStore {
    /// Create a new empty MockGraphStore.
    pub fn new() -> Self {
        Self {
            nodes: RwLock::new(HashMap::new()),
            edges: RwLock::new(Vec::new()),
            fail_writes: AtomicBool::new(false),
            next_key: AtomicUsize::new(0),
        }
    }

    fn key(&self, prefix: &str) -> String {
        format!("{}:{}", prefix, self.next_key.fetch_add(1, Ordering::SeqCst))
    }

    // ========================================================================
    // Builder / seeding methods for tests
    // ========================================================================

    /// Seed a projection node.
    pub async fn with_node(self, node: AsteroidNode) -> Self {
        let key = self.key("n");
        self.nodes.write().await.insert(node.id, (key, node));
        self
    }

    /// Seed a raw edge, duplicates allowed.
    pub async fn with_edge(self, source: Uuid, target: Uuid) -> Self {
        self.push_edge(source, target).await;
        self
    }

    pub async fn push_edge(&self, source: Uuid, target: Uuid) {
        let key = self.key("r");
        self.edges.write().await.push(MockEdge {
            key,
            source,
            target,
        });
    }

    pub async fn edge_count(&self) -> usize {
        self.edges.read().await.len()
    }

    pub async fn has_node(&self, id: Uuid) -> bool {
        self.nodes.read().await.contains_key(&id)
    }

    async fn raw_node(&self, id: Uuid) -> Option<RawNode> {
        self.nodes.read().await.get(&id).map(|(key, _)| RawNode {
            key: key.clone(),
            id,
        })
    }

    async fn raw_edge(&self, edge: &MockEdge) -> Option<RawEdge> {
        Some(RawEdge {
            key: edge.key.clone(),
            source: self.raw_node(edge.source).await?,
            target: self.raw_node(edge.target).await?,
        })
    }

    async fn merge_node(&self, node: &AsteroidNode) {
        let mut nodes = self.nodes.write().await;
        if !nodes.contains_key(&node.id) {
            let key = self.key("n");
            nodes.insert(node.id, (key, node.clone()));
        }
    }

    fn check_writable(&self) -> Result<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            bail!("mock graph store: write rejected");
        }
        Ok(())
    }
}

impl Default for MockGraphStore {
    fn default() -> Self {
        Self::new()
    }
}

fn orient(direction: LinkDirection, anchor: Uuid, other: Uuid) -> (Uuid, Uuid) {
    match direction {
        LinkDirection::From => (other, anchor),
        LinkDirection::To => (anchor, other),
    }
}

#[async_trait]
impl GraphStore for MockGraphStore {
    async fn create_node(&self, node: &AsteroidNode) -> Result<()> {
        self.check_writable()?;
        self.merge_node(node).await;
        Ok(())
    }

    async fn create_edges(
        &self,
        direction: LinkDirection,
        anchor: &AsteroidNode,
        others: &[AsteroidNode],
    ) -> Result<usize> {
        self.check_writable()?;
        if others.is_empty() {
            return Ok(0);
        }
        self.merge_node(anchor).await;
        for other in others {
            self.merge_node(other).await;
            let (source, target) = orient(direction, anchor.id, other.id);
            let exists = self
                .edges
                .read()
                .await
                .iter()
                .any(|e| e.source == source && e.target == target);
            if !exists {
                self.push_edge(source, target).await;
            }
        }
        Ok(others.len())
    }

    async fn delete_edges(
        &self,
        direction: LinkDirection,
        anchor: Uuid,
        others: &[Uuid],
    ) -> Result<usize> {
        self.check_writable()?;
        let pairs: HashSet<(Uuid, Uuid)> = others
            .iter()
            .map(|other| orient(direction, anchor, *other))
            .collect();
        let mut edges = self.edges.write().await;
        let before = edges.len();
        edges.retain(|e| !pairs.contains(&(e.source, e.target)));
        Ok(before - edges.len())
    }

    async fn linked_ids(&self, anchor: Uuid, direction: LinkDirection) -> Result<Vec<Uuid>> {
        Ok(self
            .edges
            .read()
            .await
            .iter()
            .filter_map(|e| match direction {
                LinkDirection::From if e.target == anchor => Some(e.source),
                LinkDirection::To if e.source == anchor => Some(e.target),
                _ => None,
            })
            .collect())
    }

    async fn traverse(&self, anchor: Uuid, depth: u32) -> Result<RawGraph> {
        if !self.has_node(anchor).await {
            return Ok(RawGraph::default());
        }
        let edges = self.edges.read().await.clone();

        // Undirected BFS distances from the anchor.
        let mut dist: HashMap<Uuid, u32> = HashMap::from([(anchor, 0)]);
        let mut queue = VecDeque::from([anchor]);
        while let Some(cur) = queue.pop_front() {
            let d = dist[&cur];
            if d >= depth {
                continue;
            }
            for e in &edges {
                let next = if e.source == cur {
                    e.target
                } else if e.target == cur {
                    e.source
                } else {
                    continue;
                };
                if !dist.contains_key(&next) {
                    dist.insert(next, d + 1);
                    queue.push_back(next);
                }
            }
        }

        let mut raw = RawGraph::default();
        for e in &edges {
            let near = match (dist.get(&e.source), dist.get(&e.target)) {
                (Some(a), Some(b)) => (*a).min(*b),
                _ => continue,
            };
            if near < depth {
                if let Some(edge) = self.raw_edge(e).await {
                    raw.edges.push(edge);
                }
            }
        }
        Ok(raw)
    }

    async fn full_graph(&self, author_id: Uuid) -> Result<RawGraph> {
        let authored: HashSet<Uuid> = self
            .nodes
            .read()
            .await
            .values()
            .filter(|(_, n)| n.author_id == author_id)
            .map(|(_, n)| n.id)
            .collect();

        let mut raw = RawGraph::default();
        for id in &authored {
            if let Some(node) = self.raw_node(*id).await {
                raw.nodes.push(node);
            }
        }
        let edges = self.edges.read().await.clone();
        for e in edges
            .iter()
            .filter(|e| authored.contains(&e.source) && authored.contains(&e.target))
        {
            if let Some(edge) = self.raw_edge(e).await {
                raw.edges.push(edge);
            }
        }
        Ok(raw)
    }

    async fn existing_node_ids(&self, ids: &[Uuid]) -> Result<Vec<Uuid>> {
        let nodes = self.nodes.read().await;
        Ok(ids.iter().filter(|id| nodes.contains_key(id)).copied().collect())
    }
}
