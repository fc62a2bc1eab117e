//! HTTP control surface
//!
//! - `POST /reindex` rebuilds the indexes for a resource or subtree
//! - `GET /health` reports the repository and registered indexers

pub mod server;

pub use server::{
    create_router, start_server_with_shutdown, AppState, ErrorResponse, HealthResponse,
    ReindexParams,
};
