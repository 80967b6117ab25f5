//! DocumentStore trait definition
//!
//! Abstract interface over the asteroid document collection, implemented by
//! [`SurrealClient`](super::SurrealClient) and by an in-memory mock in tests.

use crate::asteroid::{Asteroid, AsteroidItem};
use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Insert a new asteroid document
    async fn create(&self, asteroid: &Asteroid) -> Result<()>;

    /// Get an active asteroid by ID (archived documents are `None`)
    async fn get(&self, id: Uuid) -> Result<Option<Asteroid>>;

    /// Replace the content of an asteroid and bump its update time
    async fn update_content(&self, id: Uuid, content: &str, updated_at: DateTime<Utc>)
        -> Result<()>;

    /// Flip the active flag of an asteroid
    async fn set_state(&self, id: Uuid, state: bool, updated_at: DateTime<Utc>) -> Result<()>;

    /// Batched lookup of active asteroids, content excluded.
    ///
    /// Unknown or archived ids are silently absent from the result; callers
    /// compare lengths to detect them. Result order is unspecified.
    async fn list_items_by_ids(&self, ids: &[Uuid]) -> Result<Vec<AsteroidItem>>;

    /// Active hub asteroids owned by `author_id`, content excluded
    async fn list_hub_by_author(&self, author_id: Uuid) -> Result<Vec<AsteroidItem>>;

    /// Every active asteroid owned by `author_id`, content excluded
    async fn list_by_author(&self, author_id: Uuid) -> Result<Vec<AsteroidItem>>;
}
