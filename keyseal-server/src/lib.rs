//! keyseal HTTP server
//!
//! Exposes a [`keyseal_core::KeyCoordinator`] over HTTP.
//!
//! ## Endpoints
//!
//! - GET /health - liveness and version
//! - POST {prefix}/geds/{keyname} - create key (201, 409 if it exists)
//! - HEAD {prefix}/geds/{keyname} - key exists (200 / 404)
//! - POST {prefix}/geds/{keyname}/encrypt - encrypt the body
//! - POST {prefix}/geds/{keyname}/decrypt - decrypt the body
//!
//! Key names shorter than the configured minimum get 412; names a storage
//! backend cannot hold (outside `[A-Za-z0-9._-]`) get 400. Errors carry a JSON
//! body `{"error_message": …, "error_details": …}`.

pub mod cli;
pub mod config;
pub mod error;
pub mod routes;
pub mod server;
pub mod state;

pub use cli::{write_master_key_file, Cli, Command, ServeArgs};
pub use config::{ServerConfig, StorageConfig};
pub use error::{ApiError, ApiResult, ErrorResponse, ServerError, ServerResult};
pub use routes::create_router;
pub use server::{create_server, run_server};
pub use state::AppState;
