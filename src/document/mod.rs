//! Document store for asteroid content, ownership and lifecycle
//!
//! The document store is the source of truth for whether an asteroid exists,
//! whether it is active, and who owns it. The graph store only mirrors ids.

pub mod client;
pub mod traits;

pub use client::SurrealClient;
pub use traits::DocumentStore;

#[cfg(test)]
pub(crate) mod mock;
