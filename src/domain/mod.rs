//! # Domain Layer
//!
//! Entities of the chat core and the contracts of their persistence.
//! It is independent of any external frameworks or infrastructure concerns.
//!
//! ## Design Principles
//!
//! - No dependencies on infrastructure or presentation layers
//! - Store traits define data access contracts
//! - Stores are passive: they enforce atomicity and uniqueness, never business rules

pub mod entities;

pub use entities::*;
