//! # Marquee API
//!
//! HTTP surface for the Marquee catalog service.
//!
//! Features:
//! - Axum-based server with graceful shutdown
//! - Enqueue endpoint acknowledging with a job id (202)
//! - Job status and catalog read projections
//! - Background worker lifecycle owned by the server

pub mod error;
pub mod jobs;
pub mod middleware;
pub mod routes;
pub mod server;
pub mod state;

pub use error::{ApiError, ApiResult};
pub use server::{MarqueeServer, ServerConfig};
pub use state::AppState;
