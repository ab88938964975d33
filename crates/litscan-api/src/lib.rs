//! HTTP surface shared by the producer and consumer binaries: request/
//! response shapes, axum routers, and the error-to-response mapping.

pub mod consumer;
pub mod error;
pub mod extract;
pub mod middleware;
pub mod producer;

pub use error::ApiError;
