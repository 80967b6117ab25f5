//! SurrealDB client for the asteroid document collection

use super::traits::DocumentStore;
use crate::asteroid::{Asteroid, AsteroidItem};
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use surrealdb::engine::any::{connect, Any};
use surrealdb::opt::auth::Root;
use surrealdb::Surreal;
use uuid::Uuid;

const ITEM_FIELDS: &str = "uuid, state, author_id, hub, kind, title, created_at, updated_at";

/// Connection settings for [`SurrealClient::new`].
#[derive(Debug, Clone)]
pub struct SurrealSettings<'a> {
    /// Any engine address: `ws://host:8000`, `http://host:8000`, `mem://`
    pub url: &'a str,
    pub namespace: &'a str,
    pub database: &'a str,
    /// Root credentials; skipped when empty (embedded engines)
    pub user: &'a str,
    pub password: &'a str,
}

/// Client for SurrealDB operations
pub struct SurrealClient {
    db: Arc<Surreal<Any>>,
}

/// Stored shape of an asteroid. Ids and timestamps are kept as strings so the
/// record round-trips through any SurrealDB engine unchanged.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct AsteroidDocument {
    uuid: String,
    state: bool,
    author_id: String,
    hub: bool,
    kind: i64,
    title: String,
    content: String,
    created_at: String,
    updated_at: String,
}

#[derive(Debug, Clone, Deserialize)]
struct AsteroidItemDocument {
    uuid: String,
    state: bool,
    author_id: String,
    hub: bool,
    kind: i64,
    title: String,
    created_at: String,
    updated_at: String,
}

impl From<&Asteroid> for AsteroidDocument {
    fn from(a: &Asteroid) -> Self {
        Self {
            uuid: a.id.to_string(),
            state: a.state,
            author_id: a.author_id.to_string(),
            hub: a.hub,
            kind: a.kind,
            title: a.title.clone(),
            content: a.content.clone(),
            created_at: a.created_at.to_rfc3339(),
            updated_at: a.updated_at.to_rfc3339(),
        }
    }
}

fn parse_uuid(s: &str, field: &str) -> Result<Uuid> {
    s.parse()
        .with_context(|| format!("Malformed {} in asteroid document: {}", field, s))
}

fn parse_time(s: &str, field: &str) -> Result<DateTime<Utc>> {
    Ok(DateTime::parse_from_rfc3339(s)
        .with_context(|| format!("Malformed {} in asteroid document: {}", field, s))?
        .with_timezone(&Utc))
}

impl TryFrom<AsteroidDocument> for Asteroid {
    type Error = anyhow::Error;

    fn try_from(d: AsteroidDocument) -> Result<Self> {
        Ok(Self {
            id: parse_uuid(&d.uuid, "uuid")?,
            state: d.state,
            author_id: parse_uuid(&d.author_id, "author_id")?,
            hub: d.hub,
            kind: d.kind,
            title: d.title,
            content: d.content,
            created_at: parse_time(&d.created_at, "created_at")?,
            updated_at: parse_time(&d.updated_at, "updated_at")?,
        })
    }
}

impl TryFrom<AsteroidItemDocument> for AsteroidItem {
    type Error = anyhow::Error;

    fn try_from(d: AsteroidItemDocument) -> Result<Self> {
        Ok(Self {
            id: parse_uuid(&d.uuid, "uuid")?,
            state: d.state,
            author_id: parse_uuid(&d.author_id, "author_id")?,
            hub: d.hub,
            kind: d.kind,
            title: d.title,
            created_at: parse_time(&d.created_at, "created_at")?,
            updated_at: parse_time(&d.updated_at, "updated_at")?,
        })
    }
}

impl SurrealClient {
    /// Connect, select namespace/database and initialize the schema
    pub async fn new(settings: SurrealSettings<'_>) -> Result<Self> {
        let db = connect(settings.url)
            .await
            .with_context(|| format!("Failed to connect to SurrealDB at {}", settings.url))?;

        if !settings.user.is_empty() {
            db.signin(Root {
                username: settings.user,
                password: settings.password,
            })
            .await
            .context("Failed to sign in to SurrealDB")?;
        }

        db.use_ns(settings.namespace)
            .use_db(settings.database)
            .await
            .context("Failed to set namespace/database")?;

        let client = Self { db: Arc::new(db) };
        client.init_schema().await?;
        Ok(client)
    }

    /// Create the asteroid table and its lookup indexes
    async fn init_schema(&self) -> Result<()> {
        let statements = [
            "DEFINE TABLE IF NOT EXISTS asteroid SCHEMALESS;",
            "DEFINE INDEX IF NOT EXISTS asteroid_uuid ON TABLE asteroid COLUMNS uuid UNIQUE;",
            "DEFINE INDEX IF NOT EXISTS asteroid_author ON TABLE asteroid COLUMNS author_id, state;",
        ];

        for statement in statements {
            self.db
                .query(statement)
                .await
                .and_then(|r| r.check())
                .with_context(|| format!("Failed to apply schema statement: {}", statement))?;
        }
        Ok(())
    }

    async fn take_items(&self, sql: String, binds: Vec<(&'static str, String)>) -> Result<Vec<AsteroidItem>> {
        let mut q = self.db.query(sql);
        for bind in binds {
            q = q.bind(bind);
        }
        let mut response = q.await.context("Failed to query asteroid items")?;
        let docs: Vec<AsteroidItemDocument> = response
            .take(0)
            .context("Failed to extract asteroid items")?;
        docs.into_iter().map(AsteroidItem::try_from).collect()
    }
}

#[async_trait]
impl DocumentStore for SurrealClient {
    async fn create(&self, asteroid: &Asteroid) -> Result<()> {
        self.db
            .query("CREATE type::thing('asteroid', $uuid) CONTENT $doc;")
            .bind(("uuid", asteroid.id.to_string()))
            .bind(("doc", AsteroidDocument::from(asteroid)))
            .await
            .and_then(|r| r.check())
            .context("Failed to create asteroid document")?;
        Ok(())
    }

    async fn get(&self, id: Uuid) -> Result<Option<Asteroid>> {
        let mut response = self
            .db
            .query(
                "SELECT uuid, state, author_id, hub, kind, title, content, created_at, updated_at \
                 FROM type::thing('asteroid', $uuid) WHERE state = true;",
            )
            .bind(("uuid", id.to_string()))
            .await
            .context("Failed to query asteroid by id")?;

        let docs: Vec<AsteroidDocument> = response
            .take(0)
            .context("Failed to extract asteroid document")?;
        docs.into_iter().next().map(Asteroid::try_from).transpose()
    }

    async fn update_content(
        &self,
        id: Uuid,
        content: &str,
        updated_at: DateTime<Utc>,
    ) -> Result<()> {
        self.db
            .query(
                "UPDATE type::thing('asteroid', $uuid) \
                 SET content = $content, updated_at = $updated_at;",
            )
            .bind(("uuid", id.to_string()))
            .bind(("content", content.to_string()))
            .bind(("updated_at", updated_at.to_rfc3339()))
            .await
            .and_then(|r| r.check())
            .context("Failed to update asteroid content")?;
        Ok(())
    }

    async fn set_state(&self, id: Uuid, state: bool, updated_at: DateTime<Utc>) -> Result<()> {
        self.db
            .query(
                "UPDATE type::thing('asteroid', $uuid) \
                 SET state = $state, updated_at = $updated_at;",
            )
            .bind(("uuid", id.to_string()))
            .bind(("state", state))
            .bind(("updated_at", updated_at.to_rfc3339()))
            .await
            .and_then(|r| r.check())
            .context("Failed to update asteroid state")?;
        Ok(())
    }

    async fn list_items_by_ids(&self, ids: &[Uuid]) -> Result<Vec<AsteroidItem>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let uuids: Vec<String> = ids.iter().map(|id| id.to_string()).collect();
        let mut response = self
            .db
            .query(format!(
                "SELECT {} FROM asteroid WHERE uuid IN $uuids AND state = true;",
                ITEM_FIELDS
            ))
            .bind(("uuids", uuids))
            .await
            .context("Failed to query asteroids by ids")?;

        let docs: Vec<AsteroidItemDocument> = response
            .take(0)
            .context("Failed to extract asteroid items")?;
        docs.into_iter().map(AsteroidItem::try_from).collect()
    }

    async fn list_hub_by_author(&self, author_id: Uuid) -> Result<Vec<AsteroidItem>> {
        self.take_items(
            format!(
                "SELECT {} FROM asteroid \
                 WHERE author_id = $author_id AND state = true AND hub = true \
                 ORDER BY created_at;",
                ITEM_FIELDS
            ),
            vec![("author_id", author_id.to_string())],
        )
        .await
    }

    async fn list_by_author(&self, author_id: Uuid) -> Result<Vec<AsteroidItem>> {
        self.take_items(
            format!(
                "SELECT {} FROM asteroid WHERE author_id = $author_id AND state = true;",
                ITEM_FIELDS
            ),
            vec![("author_id", author_id.to_string())],
        )
        .await
    }
}
