//! GraphStore trait definition
//!
//! Defines the abstract interface for the asteroid link graph. `Neo4jClient`
//! implements it for production; tests use an in-memory mock.

use crate::asteroid::{AsteroidNode, LinkDirection};
use crate::neo4j::models::RawGraph;
use anyhow::Result;
use async_trait::async_trait;
use uuid::Uuid;

#[async_trait]
pub trait GraphStore: Send + Sync {
    /// Create the graph projection of an asteroid (idempotent)
    async fn create_node(&self, node: &AsteroidNode) -> Result<()>;

    /// Create REFER edges between `anchor` and every node in `others`.
    ///
    /// `From` points the edges into the anchor, `To` points them out of it.
    /// Endpoint projections that are missing are created on the fly and
    /// existing edges are reused, so replays are harmless. Returns the number
    /// of edges now present for the batch.
    async fn create_edges(
        &self,
        direction: LinkDirection,
        anchor: &AsteroidNode,
        others: &[AsteroidNode],
    ) -> Result<usize>;

    /// Remove REFER edges between `anchor` and `others`; returns how many
    async fn delete_edges(
        &self,
        direction: LinkDirection,
        anchor: Uuid,
        others: &[Uuid],
    ) -> Result<usize>;

    /// One-hop neighbours of `anchor` in `direction`, in store order
    async fn linked_ids(&self, anchor: Uuid, direction: LinkDirection) -> Result<Vec<Uuid>>;

    /// Every relationship on a path of length `1..=depth` from `anchor`,
    /// following edges in either direction
    async fn traverse(&self, anchor: Uuid, depth: u32) -> Result<RawGraph>;

    /// Every node authored by `author_id`, plus every edge whose both
    /// endpoints are authored by `author_id`
    async fn full_graph(&self, author_id: Uuid) -> Result<RawGraph>;

    /// Subset of `ids` that have a graph projection
    async fn existing_node_ids(&self, ids: &[Uuid]) -> Result<Vec<Uuid>>;
}
