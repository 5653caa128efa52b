//! # srserver - Axum based HTTP server
//!
//! This crate wraps an Axum router behind a small, ergonomic API used by the
//! SR aggregator binary and by the crates that mount routes on it.
//!
//! ## Features
//!
//! - **High level API**: JSON routes, handlers and sub-routers
//! - **OpenAPI documentation**: Swagger UI generated with `utoipa`
//! - **Request timeout**: every request is bounded, `408` when exceeded
//! - **Logging**: `tracing` subscriber set up from the configuration
//! - **Graceful shutdown** on Ctrl+C
//!
//! ## Architecture
//!
//! - [`server`]: the server and its builder
//! - [`logs`]: logging initialisation
//!
//! Domain crates extend [`Server`] through their own extension traits, so this
//! crate knows nothing about them.
//!
//! ## Example
//!
//! ```rust,no_run
//! use srserver::{ServerBuilder, logs::{LoggingOptions, init_logging}};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = srconfig::Config::load_config("")?;
//!     init_logging(LoggingOptions::from_config(&config));
//!
//!     let mut server = ServerBuilder::new_configured(&config).build();
//!     server.add_route("/api/status", || async {
//!         serde_json::json!({"status": "ok"})
//!     }).await;
//!
//!     server.start().await?;
//!     server.wait().await;
//!     Ok(())
//! }
//! ```

pub mod logs;
pub mod server;

pub use logs::{LoggingOptions, init_logging};
pub use server::{Server, ServerBuilder, ServerInfo};
