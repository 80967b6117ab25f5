//! Reconciliation sweep between the document and graph stores
//!
//! Creation writes the document before the graph node, so a graph failure can
//! leave an active document without a projection. The sweep finds those and
//! writes the missing nodes. Node writes are `MERGE`s, so replaying a sweep
//! is harmless.

use crate::asteroid::error::{store_call, AsteroidError};
use crate::auth::RequestContext;
use crate::document::DocumentStore;
use crate::neo4j::GraphStore;
use futures::stream::{self, StreamExt};
use serde::Serialize;
use std::collections::HashSet;
use std::sync::Arc;
use uuid::Uuid;

/// Node writes in flight at once
const WRITE_CONCURRENCY: usize = 8;

/// Outcome of one sweep.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReconcileReport {
    pub author_id: Uuid,
    /// Active documents inspected
    pub documents: usize,
    /// Documents that already had a graph node
    pub projected: usize,
    /// Nodes written by this sweep
    pub created: Vec<Uuid>,
    /// Nodes whose write failed; retry with another sweep
    pub failed: Vec<Uuid>,
}

impl ReconcileReport {
    pub fn is_clean(&self) -> bool {
        self.created.is_empty() && self.failed.is_empty()
    }
}

/// Repairs missing graph projections.
pub struct Reconciler {
    docs: Arc<dyn DocumentStore>,
    graph: Arc<dyn GraphStore>,
}

impl Reconciler {
    pub fn new(docs: Arc<dyn DocumentStore>, graph: Arc<dyn GraphStore>) -> Self {
        Self { docs, graph }
    }

    /// Create graph nodes for every active document of `author` that lacks one.
    pub async fn reconcile_author(
        &self,
        ctx: &RequestContext,
        author: Uuid,
    ) -> Result<ReconcileReport, AsteroidError> {
        let items = store_call(ctx, "list author documents", self.docs.list_by_author(author)).await?;
        let ids: Vec<Uuid> = items.iter().map(|i| i.id).collect();
        let existing: HashSet<Uuid> =
            store_call(ctx, "look up graph nodes", self.graph.existing_node_ids(&ids))
                .await?
                .into_iter()
                .collect();

        let mut report = ReconcileReport {
            author_id: author,
            documents: items.len(),
            projected: existing.len(),
            ..Default::default()
        };

        let missing: Vec<_> = items.iter().filter(|i| !existing.contains(&i.id)).collect();
        let mut writes = stream::iter(missing)
            .map(|item| async move {
                let node = item.to_node();
                let res = store_call(ctx, "create graph node", self.graph.create_node(&node)).await;
                (item.id, res)
            })
            .buffer_unordered(WRITE_CONCURRENCY);

        while let Some((id, res)) = writes.next().await {
            match res {
                Ok(()) => {
                    tracing::info!(asteroid_id = %id, "Recreated missing graph node");
                    report.created.push(id);
                }
                Err(AsteroidError::Cancelled) => return Err(AsteroidError::Cancelled),
                Err(_) => report.failed.push(id),
            }
        }
        report.created.sort();
        report.failed.sort();

        tracing::info!(
            author_id = %author,
            documents = report.documents,
            created = report.created.len(),
            failed = report.failed.len(),
            "Reconciliation sweep finished"
        );
        Ok(report)
    }
}
