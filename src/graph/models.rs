//! Materialized graph returned to callers

use crate::asteroid::AsteroidItem;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A visible asteroid in a materialized graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphNode {
    pub id: Uuid,
    pub hub: bool,
    pub title: String,
}

impl From<&AsteroidItem> for GraphNode {
    fn from(item: &AsteroidItem) -> Self {
        Self {
            id: item.id,
            hub: item.hub,
            title: item.title.clone(),
        }
    }
}

/// A REFER edge between two visible asteroids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GraphLink {
    pub source: Uuid,
    pub target: Uuid,
}

/// Node/link view for visualization. Never persisted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Graph {
    pub nodes: Vec<GraphNode>,
    pub links: Vec<GraphLink>,
}

impl Graph {
    /// Graph holding one node and no links.
    pub fn single(item: &AsteroidItem) -> Self {
        Self {
            nodes: vec![GraphNode::from(item)],
            links: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}
