//! Application Services
//!
//! Business logic services that coordinate domain operations.
//!
//! ## Available Services
//!
//! - **AuthService**: Registration, login, logout, token resolution
//! - **UserService**: User lookup and presence status
//! - **ChatService**: Room-scoped message operations and read cursors
//!
//! Supporting components:
//!
//! - **PasswordService**: Argon2id hashing on the blocking pool
//! - **TokenIssuer**: JWT issuance, validation and revocation

pub mod auth_service;
pub mod chat_service;
pub mod password_service;
pub mod token_service;
pub mod user_service;

#[cfg(test)]
pub(crate) mod test_support;

// Re-export auth service types
pub use auth_service::{AuthService, AuthServiceImpl, AuthSession};

// Re-export chat service types
pub use chat_service::{ChatService, ChatServiceImpl};

// Re-export user service types
pub use user_service::{StatusAck, UserService, UserServiceImpl};

pub use password_service::PasswordService;
pub use token_service::{Claims, IssuedToken, JwtTokenIssuer, TokenIssuer};
