//! Test helper factories and mock service builders
//!
//! Provides convenience functions for creating test objects with sensible defaults,
//! and helpers for building services over in-memory stores.
#![allow(dead_code)]

use crate::asteroid::{Asteroid, AsteroidService, CreateAsteroidRequest};
use crate::auth::{Principal, RequestContext};
use crate::document::mock::MockDocumentStore;
use crate::graph::GraphService;
use crate::neo4j::mock::MockGraphStore;
use crate::reconcile::Reconciler;
use std::sync::Arc;
use uuid::Uuid;

// ============================================================================
// Mock service builders
// ============================================================================

/// AsteroidService over empty in-memory stores, plus handles to both stores
pub fn mock_asteroid_service() -> (
    AsteroidService,
    Arc<MockDocumentStore>,
    Arc<MockGraphStore>,
) {
    mock_asteroid_service_with(MockDocumentStore::new(), MockGraphStore::new())
}

/// AsteroidService over pre-seeded stores
pub fn mock_asteroid_service_with(
    docs: MockDocumentStore,
    graph: MockGraphStore,
) -> (
    AsteroidService,
    Arc<MockDocumentStore>,
    Arc<MockGraphStore>,
) {
    let docs = Arc::new(docs);
    let graph = Arc::new(graph);
    let svc = AsteroidService::new(docs.clone(), graph.clone());
    (svc, docs, graph)
}

/// AsteroidService and GraphService sharing the same in-memory stores
pub fn mock_services() -> (AsteroidService, GraphService, Arc<MockGraphStore>) {
    let docs = Arc::new(MockDocumentStore::new());
    let graph = Arc::new(MockGraphStore::new());
    (
        AsteroidService::new(docs.clone(), graph.clone()),
        GraphService::new(docs, graph.clone()),
        graph,
    )
}

/// Reconciler over pre-seeded stores
pub fn mock_reconciler(
    docs: MockDocumentStore,
    graph: MockGraphStore,
) -> (Reconciler, Arc<MockGraphStore>) {
    let graph = Arc::new(graph);
    (Reconciler::new(Arc::new(docs), graph.clone()), graph)
}

/// Document store seeded with the given asteroids
pub async fn mock_documents(asteroids: Vec<Asteroid>) -> MockDocumentStore {
    let mut store = MockDocumentStore::new();
    for a in asteroids {
        store = store.with_asteroid(a).await;
    }
    store
}

// ============================================================================
// Factories
// ============================================================================

/// Request context for a user with no deadline
pub fn ctx_for(user_id: Uuid) -> RequestContext {
    RequestContext::new(Principal::new(user_id))
}

/// Active, non-hub asteroid with empty content
pub fn test_asteroid(author_id: Uuid, title: &str) -> Asteroid {
    Asteroid::new(author_id, false, 0, title.to_string(), String::new())
}

/// Create request without links
pub fn create_request(title: &str, hub: bool) -> CreateAsteroidRequest {
    CreateAsteroidRequest {
        hub,
        title: title.to_string(),
        content: format!("{} content", title),
        ..Default::default()
    }
}
