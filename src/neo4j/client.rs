//! Neo4j client for the asteroid link graph

use super::models::*;
use crate::asteroid::{AsteroidNode, LinkDirection};
use crate::graph::MAX_TRAVERSAL_DEPTH;
use anyhow::{Context, Result};
use neo4rs::{query, Graph, Query, Row};
use std::sync::Arc;
use uuid::Uuid;

/// Client for Neo4j operations
pub struct Neo4jClient {
    graph: Arc<Graph>,
}

fn row_uuid(row: &Row, key: &str) -> Result<Uuid> {
    let raw: String = row
        .get(key)
        .with_context(|| format!("Missing column {} in graph row", key))?;
    raw.parse()
        .with_context(|| format!("Malformed asteroid id in graph: {}", raw))
}

fn row_node(row: &Row, key_col: &str, id_col: &str) -> Result<RawNode> {
    Ok(RawNode {
        key: row
            .get(key_col)
            .with_context(|| format!("Missing column {} in graph row", key_col))?,
        id: row_uuid(row, id_col)?,
    })
}

fn row_edge(row: &Row) -> Result<RawEdge> {
    Ok(RawEdge {
        key: row.get("rel").context("Missing column rel in graph row")?,
        source: row_node(row, "source_key", "source_id")?,
        target: row_node(row, "target_key", "target_id")?,
    })
}

/// REFER pattern between `cur` and `other` for a direction
fn refer_pattern(direction: LinkDirection) -> &'static str {
    match direction {
        LinkDirection::From => "(other)-[r:REFER]->(cur)",
        LinkDirection::To => "(cur)-[r:REFER]->(other)",
    }
}

impl Neo4jClient {
    /// Create a new Neo4j client
    pub async fn new(uri: &str, user: &str, password: &str) -> Result<Self> {
        let graph = Graph::new(uri, user, password)
            .await
            .context("Failed to connect to Neo4j")?;

        let client = Self {
            graph: Arc::new(graph),
        };

        client.init_schema().await?;

        Ok(client)
    }

    /// Initialize the graph schema with constraints and indexes
    async fn init_schema(&self) -> Result<()> {
        let statements = [
            "CREATE CONSTRAINT asteroid_id IF NOT EXISTS FOR (a:Asteroid) REQUIRE a.id IS UNIQUE",
            "CREATE INDEX asteroid_author IF NOT EXISTS FOR (a:Asteroid) ON (a.authorId)",
        ];

        for statement in statements {
            if let Err(e) = self.graph.run(query(statement)).await {
                tracing::warn!("Schema statement may already exist: {}", e);
            }
        }

        Ok(())
    }

    /// Execute a parameterized Cypher query (internal use only)
    async fn execute_with_params(&self, q: Query) -> Result<Vec<Row>> {
        let mut result = self.graph.execute(q).await?;
        let mut rows = Vec::new();
        while let Some(row) = result.next().await? {
            rows.push(row);
        }
        Ok(rows)
    }

    async fn single_count(&self, q: Query, column: &str) -> Result<usize> {
        let rows = self.execute_with_params(q).await?;
        let count: i64 = match rows.first() {
            Some(row) => row.get(column)?,
            None => 0,
        };
        Ok(count.max(0) as usize)
    }

    // ========================================================================
    // Mutations
    // ========================================================================

    /// Create the projection node of an asteroid
    pub async fn create_node(&self, node: &AsteroidNode) -> Result<()> {
        let q = query(
            r#"
            MERGE (a:Asteroid {id: $id})
            ON CREATE SET a.state = $state,
                          a.authorId = $author_id,
                          a.createdTime = datetime($created_at)
            "#,
        )
        .param("id", node.id.to_string())
        .param("state", node.state)
        .param("author_id", node.author_id.to_string())
        .param("created_at", node.created_at.to_rfc3339());

        self.graph
            .run(q)
            .await
            .with_context(|| format!("Failed to create graph node {}", node.id))?;
        Ok(())
    }

    /// Create REFER edges between an anchor and a batch of other asteroids.
    ///
    /// Both the anchor and every other endpoint are merged with their
    /// projection properties, so an endpoint whose node was never written
    /// gets one here instead of the edge being dropped.
    pub async fn create_edges(
        &self,
        direction: LinkDirection,
        anchor: &AsteroidNode,
        others: &[AsteroidNode],
    ) -> Result<usize> {
        if others.is_empty() {
            return Ok(0);
        }

        let cypher = format!(
            r#"
            MERGE (cur:Asteroid {{id: $cur_id}})
            ON CREATE SET cur.state = $cur_state,
                          cur.authorId = $cur_author,
                          cur.createdTime = datetime($cur_created)
            WITH cur
            UNWIND range(0, size($ids) - 1) AS i
            MERGE (other:Asteroid {{id: $ids[i]}})
            ON CREATE SET other.state = $states[i],
                          other.authorId = $authors[i],
                          other.createdTime = datetime($created[i])
            MERGE {}
            RETURN count(r) AS linked
            "#,
            refer_pattern(direction)
        );

        let q = query(&cypher)
            .param("cur_id", anchor.id.to_string())
            .param("cur_state", anchor.state)
            .param("cur_author", anchor.author_id.to_string())
            .param("cur_created", anchor.created_at.to_rfc3339())
            .param(
                "ids",
                others.iter().map(|n| n.id.to_string()).collect::<Vec<_>>(),
            )
            .param("states", others.iter().map(|n| n.state).collect::<Vec<_>>())
            .param(
                "authors",
                others
                    .iter()
                    .map(|n| n.author_id.to_string())
                    .collect::<Vec<_>>(),
            )
            .param(
                "created",
                others
                    .iter()
                    .map(|n| n.created_at.to_rfc3339())
                    .collect::<Vec<_>>(),
            );

        self.single_count(q, "linked")
            .await
            .with_context(|| format!("Failed to link asteroid {} ({})", anchor.id, direction))
    }

    /// Delete REFER edges between an anchor and a batch of other asteroids
    pub async fn delete_edges(
        &self,
        direction: LinkDirection,
        anchor: Uuid,
        others: &[Uuid],
    ) -> Result<usize> {
        if others.is_empty() {
            return Ok(0);
        }

        let cypher = format!(
            r#"
            MATCH {}
            WHERE cur:Asteroid AND cur.id = $cur_id
              AND other:Asteroid AND other.id IN $ids
            DELETE r
            RETURN count(r) AS removed
            "#,
            refer_pattern(direction)
        );

        let q = query(&cypher)
            .param("cur_id", anchor.to_string())
            .param(
                "ids",
                others.iter().map(|id| id.to_string()).collect::<Vec<_>>(),
            );

        self.single_count(q, "removed")
            .await
            .with_context(|| format!("Failed to unlink asteroid {} ({})", anchor, direction))
    }

    // ========================================================================
    // Reads
    // ========================================================================

    /// One-hop neighbours of an asteroid
    pub async fn linked_ids(&self, anchor: Uuid, direction: LinkDirection) -> Result<Vec<Uuid>> {
        let cypher = match direction {
            LinkDirection::From => "MATCH (a:Asteroid)-[:REFER]->(:Asteroid {id: $id}) RETURN a.id AS id",
            LinkDirection::To => "MATCH (:Asteroid {id: $id})-[:REFER]->(a:Asteroid) RETURN a.id AS id",
        };

        let rows = self
            .execute_with_params(query(cypher).param("id", anchor.to_string()))
            .await
            .with_context(|| format!("Failed to list links {} asteroid {}", direction, anchor))?;

        rows.iter().map(|row| row_uuid(row, "id")).collect()
    }

    /// Bounded undirected traversal from an anchor.
    ///
    /// Variable-length bounds cannot be parameters in Cypher, so the depth is
    /// clamped and interpolated as an integer.
    pub async fn traverse(&self, anchor: Uuid, depth: u32) -> Result<RawGraph> {
        let depth = depth.clamp(1, MAX_TRAVERSAL_DEPTH);
        let cypher = format!(
            r#"
            MATCH p = (:Asteroid {{id: $id}})-[:REFER*1..{}]-(:Asteroid)
            UNWIND relationships(p) AS r
            WITH DISTINCT r
            WITH r, startNode(r) AS s, endNode(r) AS t
            RETURN elementId(r) AS rel,
                   elementId(s) AS source_key, s.id AS source_id,
                   elementId(t) AS target_key, t.id AS target_id
            "#,
            depth
        );

        let rows = self
            .execute_with_params(query(&cypher).param("id", anchor.to_string()))
            .await
            .with_context(|| format!("Failed to traverse from asteroid {}", anchor))?;

        Ok(RawGraph {
            nodes: Vec::new(),
            edges: rows.iter().map(row_edge).collect::<Result<_>>()?,
        })
    }

    /// All nodes of an author plus the edges internal to that author
    pub async fn full_graph(&self, author_id: Uuid) -> Result<RawGraph> {
        let node_rows = self
            .execute_with_params(
                query(
                    r#"
                    MATCH (a:Asteroid {authorId: $author_id})
                    RETURN elementId(a) AS key, a.id AS id
                    "#,
                )
                .param("author_id", author_id.to_string()),
            )
            .await
            .with_context(|| format!("Failed to list graph nodes of author {}", author_id))?;

        let edge_rows = self
            .execute_with_params(
                query(
                    r#"
                    MATCH (s:Asteroid)-[r:REFER]->(t:Asteroid)
                    WHERE s.authorId = $author_id AND t.authorId = $author_id
                    RETURN elementId(r) AS rel,
                           elementId(s) AS source_key, s.id AS source_id,
                           elementId(t) AS target_key, t.id AS target_id
                    "#,
                )
                .param("author_id", author_id.to_string()),
            )
            .await
            .with_context(|| format!("Failed to list graph edges of author {}", author_id))?;

        Ok(RawGraph {
            nodes: node_rows
                .iter()
                .map(|row| row_node(row, "key", "id"))
                .collect::<Result<_>>()?,
            edges: edge_rows.iter().map(row_edge).collect::<Result<_>>()?,
        })
    }

    /// Which of the given asteroids already have a projection node
    pub async fn existing_node_ids(&self, ids: &[Uuid]) -> Result<Vec<Uuid>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let q = query("MATCH (a:Asteroid) WHERE a.id IN $ids RETURN a.id AS id").param(
            "ids",
            ids.iter().map(|id| id.to_string()).collect::<Vec<_>>(),
        );

        let rows = self
            .execute_with_params(q)
            .await
            .context("Failed to look up graph nodes")?;
        rows.iter().map(|row| row_uuid(row, "id")).collect()
    }
}
