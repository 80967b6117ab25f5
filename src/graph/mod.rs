//! Graph reads: bounded neighbourhoods and whole-owner graphs
//!
//! Raw results come from the graph store keyed by store-internal ids; the
//! materializer collapses duplicates and hydrates them against the document
//! store, which decides what actually exists.

pub mod materializer;
pub mod models;
pub mod service;

pub use materializer::Materializer;
pub use models::{Graph, GraphLink, GraphNode};
pub use service::GraphService;

/// Upper bound on traversal depth.
pub const MAX_TRAVERSAL_DEPTH: u32 = 20;

/// Map a requested depth onto `1..=max`. Zero, negative and over-limit
/// requests all mean `max`.
pub fn clamp_depth(requested: i64, max: u32) -> u32 {
    let max = max.clamp(1, MAX_TRAVERSAL_DEPTH);
    if requested <= 0 || requested > i64::from(max) {
        max
    } else {
        requested as u32
    }
}
