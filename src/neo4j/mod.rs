//! Neo4j client and models for the asteroid link graph

pub mod client;
mod impl_graph_store;
pub mod models;
pub mod traits;

pub use client::Neo4jClient;
pub use models::*;
pub use traits::GraphStore;

#[cfg(test)]
pub(crate) mod mock;
