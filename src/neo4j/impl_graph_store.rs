//! `GraphStore` implementation for `Neo4jClient`.
//!
//! Every method simply delegates to the corresponding inherent method on `Neo4jClient`.

use async_trait::async_trait;
use uuid::Uuid;

use super::client::Neo4jClient;
use super::models::RawGraph;
use super::traits::GraphStore;
use crate::asteroid::{AsteroidNode, LinkDirection};

#[async_trait]
impl GraphStore for Neo4jClient {
    async fn create_node(&self, node: &AsteroidNode) -> anyhow::Result<()> {
        self.create_node(node).await
    }

    async fn create_edges(
        &self,
        direction: LinkDirection,
        anchor: &AsteroidNode,
        others: &[AsteroidNode],
    ) -> anyhow::Result<usize> {
        self.create_edges(direction, anchor, others).await
    }

    async fn delete_edges(
        &self,
        direction: LinkDirection,
        anchor: Uuid,
        others: &[Uuid],
    ) -> anyhow::Result<usize> {
        self.delete_edges(direction, anchor, others).await
    }

    async fn linked_ids(
        &self,
        anchor: Uuid,
        direction: LinkDirection,
    ) -> anyhow::Result<Vec<Uuid>> {
        self.linked_ids(anchor, direction).await
    }

    async fn traverse(&self, anchor: Uuid, depth: u32) -> anyhow::Result<RawGraph> {
        self.traverse(anchor, depth).await
    }

    async fn full_graph(&self, author_id: Uuid) -> anyhow::Result<RawGraph> {
        self.full_graph(author_id).await
    }

    async fn existing_node_ids(&self, ids: &[Uuid]) -> anyhow::Result<Vec<Uuid>> {
        self.existing_node_ids(ids).await
    }
}
