//! HTTP API: handlers, middleware, extractors and DTOs.

pub mod dto;
pub mod extract;
pub mod handlers;
pub mod middleware;
pub mod routes;

pub use routes::create_router;
