//! Application Layer
//!
//! Contains the use-case services and data transfer objects (DTOs).
//! This layer orchestrates the flow of data between the presentation
//! and domain layers, and is the only place business rules are decided.

pub mod dto;
pub mod identity;
pub mod services;

pub use identity::RequestIdentity;
