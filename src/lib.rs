//! # Chat Core Library
//!
//! The identity and messaging core of a room-based chat server:
//! - Registration, login, logout and bearer-token authentication
//! - User lookup and presence status updates
//! - Room-scoped message sending, history, edits, deletes and read cursors
//!
//! ## Architecture
//!
//! The crate follows Clean Architecture principles:
//!
//! - **Domain Layer**: Entities and store traits
//! - **Application Layer**: Use-case services and DTOs
//! - **Infrastructure Layer**: In-memory and PostgreSQL stores
//! - **Presentation Layer**: HTTP handlers and middleware
//!
//! ## Module Structure
//!
//! ```text
//! chat_core/
//! +-- config/         Configuration management
//! +-- domain/         Entities and store traits
//! +-- application/    Services and DTOs
//! +-- infrastructure/ Store implementations
//! +-- presentation/   HTTP routes and middleware
//! +-- shared/         Errors, snowflake IDs, clock, validation
//! ```

// Configuration module
pub mod config;

// Domain layer - Entities and store contracts
pub mod domain;

// Application layer - Use-case services
pub mod application;

// Infrastructure layer - Store implementations
pub mod infrastructure;

// Presentation layer - HTTP handlers
pub mod presentation;

// Shared utilities
pub mod shared;

// Application startup and state management
pub mod startup;

// Telemetry and observability
pub mod telemetry;
