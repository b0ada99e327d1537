//! Infrastructure Layer
//!
//! Implementations of the domain store traits:
//! - In-memory stores (single process, also used by tests)
//! - PostgreSQL repositories and connection management

pub mod database;
pub mod memory;
pub mod repositories;
