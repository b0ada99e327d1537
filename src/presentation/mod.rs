//! Presentation Layer
//!
//! HTTP routes, handlers and middleware. Maps requests onto service calls and
//! service results onto responses; decides no business rules.

pub mod http;
pub mod middleware;
