//! Raw traversal results returned by the graph store
//!
//! Nodes and relationships are keyed by the store's internal element ids,
//! which are stable for the lifetime of a query but mean nothing outside the
//! store. The materializer maps them onto persistent asteroid ids.

use uuid::Uuid;

/// A graph node as seen by one query.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RawNode {
    /// Store-internal element id
    pub key: String,
    /// Persistent asteroid id
    pub id: Uuid,
}

/// A REFER relationship with both endpoints resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawEdge {
    /// Store-internal relationship id
    pub key: String,
    pub source: RawNode,
    pub target: RawNode,
}

/// Unprocessed node and edge sets from a traversal or a full-graph read.
///
/// `nodes` may be empty when every node of interest is an endpoint of some
/// edge; consumers take the union of both.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawGraph {
    pub nodes: Vec<RawNode>,
    pub edges: Vec<RawEdge>,
}

impl RawGraph {
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.edges.is_empty()
    }
}
