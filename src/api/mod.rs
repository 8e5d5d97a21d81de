//! API Module
//!
//! HTTP handlers and routing for the cache service REST API.
//!
//! # Endpoints
//! - `GET /resources/*key` - Load through the cache
//! - `POST /refresh/*key` - Force a fetch and overwrite
//! - `DELETE /resources/*key` - Remove one entry
//! - `DELETE /resources` - Remove all entries outside the protected prefix
//! - `GET /stats` - Get cache statistics
//! - `GET /events` / `DELETE /events` - Read or clear the analytics history
//! - `GET /health` - Health check endpoint

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
