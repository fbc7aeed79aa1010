//! HTTP service subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, trace layer)
//!     → handlers.rs
//!         GET /ping        → 204, version header
//!         GET /health      → JSON status
//!         GET /debug/vars  → Monitor::collect() as JSON
//!         POST /write      → Engine::write_points
//!         GET /query       → Engine::read_series
//! ```

pub mod handlers;
pub mod server;

pub use handlers::EngineFailure;
pub use server::{AppState, HttpServer, HttpStats};
