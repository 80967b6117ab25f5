//! Oort Graph
//!
//! A note graph engine with:
//! - SurrealDB document store as the source of truth for notes
//! - Neo4j graph store for REFER links between notes
//! - Ownership checks on every read and link mutation
//! - Bounded traversal materialized into node/link graphs

pub mod asteroid;
pub mod auth;
pub mod document;
pub mod graph;
pub mod neo4j;
pub mod reconcile;

#[cfg(test)]
pub(crate) mod test_helpers;

use anyhow::Result;
use serde::Deserialize;
use std::path::Path;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

// ============================================================================
// YAML config structs (deserialization targets)
// ============================================================================

/// Top-level YAML configuration file structure
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct YamlConfig {
    pub neo4j: Neo4jYamlConfig,
    pub surrealdb: SurrealYamlConfig,
    pub graph: GraphYamlConfig,
}

/// Neo4j configuration section
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Neo4jYamlConfig {
    pub uri: String,
    pub user: String,
    pub password: String,
}

impl Default for Neo4jYamlConfig {
    fn default() -> Self {
        Self {
            uri: "bolt://localhost:7687".into(),
            user: "neo4j".into(),
            password: "oort-neo4j-change-me".into(),
        }
    }
}

/// SurrealDB configuration section
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SurrealYamlConfig {
    /// `ws://`, `http://` or `mem://`
    pub url: String,
    pub namespace: String,
    pub database: String,
    /// Root user; leave empty for embedded engines
    pub user: String,
    pub password: String,
}

impl Default for SurrealYamlConfig {
    fn default() -> Self {
        Self {
            url: "ws://localhost:8000".into(),
            namespace: "oort".into(),
            database: "asteroids".into(),
            user: "root".into(),
            password: "root".into(),
        }
    }
}

/// Traversal settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GraphYamlConfig {
    /// Depth used when a caller does not ask for one
    pub default_depth: i64,
    /// Ceiling for traversal depth, at most [`graph::MAX_TRAVERSAL_DEPTH`]
    pub max_depth: u32,
}

impl Default for GraphYamlConfig {
    fn default() -> Self {
        Self {
            default_depth: 2,
            max_depth: graph::MAX_TRAVERSAL_DEPTH,
        }
    }
}

// ============================================================================
// Runtime config (what the application actually uses)
// ============================================================================

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub neo4j_uri: String,
    pub neo4j_user: String,
    pub neo4j_password: String,
    pub surreal_url: String,
    pub surreal_namespace: String,
    pub surreal_database: String,
    pub surreal_user: String,
    pub surreal_password: String,
    pub default_depth: i64,
    pub max_depth: u32,
}

impl Config {
    /// Load configuration from environment variables and `config.yaml` in CWD.
    pub fn from_env() -> Result<Self> {
        Self::from_yaml_and_env(None)
    }

    /// Load configuration from an optional YAML file, then override with env vars.
    ///
    /// Priority: env var > YAML > default
    ///
    /// If `yaml_path` is None, tries "config.yaml" in CWD. A missing file means
    /// env vars / defaults only.
    pub fn from_yaml_and_env(yaml_path: Option<&Path>) -> Result<Self> {
        let yaml = Self::load_yaml(yaml_path);

        Ok(Self {
            neo4j_uri: std::env::var("NEO4J_URI").unwrap_or(yaml.neo4j.uri),
            neo4j_user: std::env::var("NEO4J_USER").unwrap_or(yaml.neo4j.user),
            neo4j_password: std::env::var("NEO4J_PASSWORD").unwrap_or(yaml.neo4j.password),
            surreal_url: std::env::var("SURREAL_URL").unwrap_or(yaml.surrealdb.url),
            surreal_namespace: std::env::var("SURREAL_NS").unwrap_or(yaml.surrealdb.namespace),
            surreal_database: std::env::var("SURREAL_DB").unwrap_or(yaml.surrealdb.database),
            surreal_user: std::env::var("SURREAL_USER").unwrap_or(yaml.surrealdb.user),
            surreal_password: std::env::var("SURREAL_PASSWORD").unwrap_or(yaml.surrealdb.password),
            default_depth: yaml.graph.default_depth,
            max_depth: yaml.graph.max_depth.clamp(1, graph::MAX_TRAVERSAL_DEPTH),
        })
    }

    /// Try to load and parse a YAML config file. Returns defaults on any failure.
    fn load_yaml(yaml_path: Option<&Path>) -> YamlConfig {
        let default_path = Path::new("config.yaml");
        let path = yaml_path.unwrap_or(default_path);

        match std::fs::read_to_string(path) {
            Ok(contents) => match serde_yaml::from_str(&contents) {
                Ok(config) => {
                    tracing::info!("Loaded config from {}", path.display());
                    config
                }
                Err(e) => {
                    tracing::warn!("Failed to parse {}: {}. Using defaults.", path.display(), e);
                    YamlConfig::default()
                }
            },
            Err(_) => {
                tracing::debug!(
                    "No config file at {}, using env vars / defaults",
                    path.display()
                );
                YamlConfig::default()
            }
        }
    }
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub documents: Arc<dyn document::DocumentStore>,
    pub neo4j: Arc<dyn neo4j::GraphStore>,
    pub config: Arc<Config>,
}

impl AppState {
    /// Connect both stores and initialize their schemas
    pub async fn new(config: Config) -> Result<Self> {
        let neo4j = Arc::new(
            neo4j::client::Neo4jClient::new(
                &config.neo4j_uri,
                &config.neo4j_user,
                &config.neo4j_password,
            )
            .await?,
        );

        let documents = Arc::new(
            document::client::SurrealClient::new(document::client::SurrealSettings {
                url: &config.surreal_url,
                namespace: &config.surreal_namespace,
                database: &config.surreal_database,
                user: &config.surreal_user,
                password: &config.surreal_password,
            })
            .await?,
        );

        Ok(Self {
            documents,
            neo4j,
            config: Arc::new(config),
        })
    }

    pub fn asteroid_service(&self) -> asteroid::AsteroidService {
        asteroid::AsteroidService::new(self.documents.clone(), self.neo4j.clone())
    }

    pub fn graph_service(&self) -> graph::GraphService {
        graph::GraphService::new(self.documents.clone(), self.neo4j.clone())
            .with_max_depth(self.config.max_depth)
    }

    pub fn reconciler(&self) -> reconcile::Reconciler {
        reconcile::Reconciler::new(self.documents.clone(), self.neo4j.clone())
    }
}

/// Install the global tracing subscriber.
///
/// `RUST_LOG` wins; otherwise `info` globally and `debug` for this crate.
pub fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,oort_graph=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod config_tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_yaml_config_loading() {
        let yaml = r#"
neo4j:
  uri: bolt://db:7687
  user: admin
  password: secret

surrealdb:
  url: http://docs:8000
  namespace: prod
  database: notes

graph:
  default_depth: 3
  max_depth: 8
"#;

        let config: YamlConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.neo4j.uri, "bolt://db:7687");
        assert_eq!(config.neo4j.user, "admin");
        assert_eq!(config.surrealdb.url, "http://docs:8000");
        assert_eq!(config.surrealdb.namespace, "prod");
        // unspecified fields fall back per section
        assert_eq!(config.surrealdb.user, "root");
        assert_eq!(config.graph.default_depth, 3);
        assert_eq!(config.graph.max_depth, 8);
    }

    #[test]
    fn test_yaml_defaults() {
        let config = YamlConfig::default();
        assert_eq!(config.neo4j.uri, "bolt://localhost:7687");
        assert_eq!(config.neo4j.user, "neo4j");
        assert_eq!(config.surrealdb.url, "ws://localhost:8000");
        assert_eq!(config.surrealdb.database, "asteroids");
        assert_eq!(config.graph.default_depth, 2);
        assert_eq!(config.graph.max_depth, graph::MAX_TRAVERSAL_DEPTH);
    }

    /// Combined test for YAML file loading and env var overrides.
    /// Runs as a single test to avoid parallel env var race conditions.
    #[test]
    fn test_yaml_and_env_lifecycle() {
        fn clear_env() {
            for var in &[
                "NEO4J_URI",
                "NEO4J_USER",
                "NEO4J_PASSWORD",
                "SURREAL_URL",
                "SURREAL_NS",
                "SURREAL_DB",
                "SURREAL_USER",
                "SURREAL_PASSWORD",
            ] {
                std::env::remove_var(var);
            }
        }

        // --- Phase 1: YAML values loaded correctly ---
        let yaml = r#"
neo4j:
  uri: bolt://yaml-host:7687
  user: yaml-user
  password: yaml-pass
surrealdb:
  url: ws://yaml-docs:8000
  database: yaml-db
graph:
  max_depth: 99
"#;
        let dir = tempfile::tempdir().unwrap();
        let file_path = dir.path().join("config.yaml");
        let mut file = std::fs::File::create(&file_path).unwrap();
        file.write_all(yaml.as_bytes()).unwrap();

        clear_env();

        let config = Config::from_yaml_and_env(Some(&file_path)).unwrap();
        assert_eq!(config.neo4j_uri, "bolt://yaml-host:7687");
        assert_eq!(config.neo4j_user, "yaml-user");
        assert_eq!(config.surreal_url, "ws://yaml-docs:8000");
        assert_eq!(config.surreal_database, "yaml-db");
        assert_eq!(config.surreal_namespace, "oort");
        // ceiling is capped
        assert_eq!(config.max_depth, graph::MAX_TRAVERSAL_DEPTH);

        // --- Phase 2: Env vars override YAML ---
        std::env::set_var("NEO4J_URI", "bolt://env-host:7687");
        std::env::set_var("SURREAL_URL", "mem://");
        std::env::set_var("SURREAL_USER", "");

        let config = Config::from_yaml_and_env(Some(&file_path)).unwrap();
        assert_eq!(config.neo4j_uri, "bolt://env-host:7687");
        assert_eq!(config.surreal_url, "mem://");
        assert_eq!(config.surreal_user, "");
        assert_eq!(config.neo4j_user, "yaml-user");

        clear_env();

        // --- Phase 3: No YAML file → defaults ---
        let nonexistent = Path::new("/tmp/nonexistent-oort-config-12345.yaml");
        let config = Config::from_yaml_and_env(Some(nonexistent)).unwrap();
        assert_eq!(config.neo4j_uri, "bolt://localhost:7687");
        assert_eq!(config.surreal_url, "ws://localhost:8000");
        assert_eq!(config.default_depth, 2);
    }

    #[test]
    fn test_malformed_yaml_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let file_path = dir.path().join("config.yaml");
        std::fs::write(&file_path, "neo4j: [not, a, map").unwrap();

        let yaml = Config::load_yaml(Some(&file_path));
        assert_eq!(yaml.neo4j.uri, "bolt://localhost:7687");
    }
}
