//! Principal resolution seam
//!
//! Token verification lives upstream. By the time a call reaches the graph
//! engine the caller has already been authenticated and only its identity is
//! carried along, inside a [`RequestContext`].

pub mod context;

pub use context::{Principal, RequestContext};
