//! Asteroids: user-authored notes linked by REFER edges
//!
//! This module handles:
//! - The note data model and its graph projection
//! - Ownership checks on link endpoints
//! - Note and link mutations across the document and graph stores

pub mod error;
pub mod guard;
pub mod models;
pub mod service;

pub use error::AsteroidError;
pub use guard::LinkGuard;
pub use models::*;
pub use service::AsteroidService;
