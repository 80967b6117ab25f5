//! In-memory mock implementation of DocumentStore for testing.
//!
//! Also counts calls so tests can assert on round trips, and can be told to
//! fail writes to exercise partial-failure paths.

use super::traits::DocumentStore;
use crate::asteroid::{Asteroid, AsteroidItem};
use anyhow::{bail, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use tokio::sync::RwLock;
use uuid::Uuid;

pub struct MockDocumentStore {
    pub asteroids: RwLock<HashMap<Uuid, Asteroid>>,
    /// Number of `list_items_by_ids` calls served
    pub batch_lookups: AtomicUsize,
    /// When set, `create` fails
    pub fail_writes: AtomicBool,
}

impl MockDocumentStore {
    pub fn new() -> Self {
        Self {
            asteroids: RwLock::new(HashMap::new()),
            batch_lookups: AtomicUsize::new(0),
            fail_writes: AtomicBool::new(false),
        }
    }

    /// Seed an asteroid.
    pub async fn with_asteroid(self, asteroid: Asteroid) -> Self {
        self.asteroids.write().await.insert(asteroid.id, asteroid);
        self
    }

    pub fn batch_lookup_count(&self) -> usize {
        self.batch_lookups.load(Ordering::SeqCst)
    }

    pub async fn count(&self) -> usize {
        self.asteroids.read().await.len()
    }
}

impl Default for MockDocumentStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DocumentStore for MockDocumentStore {
    async fn create(&self, asteroid: &Asteroid) -> Result<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            bail!("mock document store: write rejected");
        }
        self.asteroids
            .write()
            .await
            .insert(asteroid.id, asteroid.clone());
        Ok(())
    }

    async fn get(&self, id: Uuid) -> Result<Option<Asteroid>> {
        Ok(self
            .asteroids
            .read()
            .await
            .get(&id)
            .filter(|a| a.state)
            .cloned())
    }

    async fn update_content(
        &self,
        id: Uuid,
        content: &str,
        updated_at: DateTime<Utc>,
    ) -> Result<()> {
        if let Some(a) = self.asteroids.write().await.get_mut(&id) {
            a.content = content.to_string();
            a.updated_at = updated_at;
        }
        Ok(())
    }

    async fn set_state(&self, id: Uuid, state: bool, updated_at: DateTime<Utc>) -> Result<()> {
        if let Some(a) = self.asteroids.write().await.get_mut(&id) {
            a.state = state;
            a.updated_at = updated_at;
        }
        Ok(())
    }

    async fn list_items_by_ids(&self, ids: &[Uuid]) -> Result<Vec<AsteroidItem>> {
        self.batch_lookups.fetch_add(1, Ordering::SeqCst);
        let asteroids = self.asteroids.read().await;
        Ok(ids
            .iter()
            .filter_map(|id| asteroids.get(id))
            .filter(|a| a.state)
            .map(Asteroid::to_item)
            .collect())
    }

    async fn list_hub_by_author(&self, author_id: Uuid) -> Result<Vec<AsteroidItem>> {
        let mut items: Vec<AsteroidItem> = self
            .asteroids
            .read()
            .await
            .values()
            .filter(|a| a.author_id == author_id && a.state && a.hub)
            .map(Asteroid::to_item)
            .collect();
        items.sort_by_key(|i| i.created_at);
        Ok(items)
    }

    async fn list_by_author(&self, author_id: Uuid) -> Result<Vec<AsteroidItem>> {
        Ok(self
            .asteroids
            .read()
            .await
            .values()
            .filter(|a| a.author_id == author_id && a.state)
            .map(Asteroid::to_item)
            .collect())
    }
}
