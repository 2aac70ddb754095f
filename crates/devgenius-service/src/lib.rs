//! DevGenius HTTP API Service.
//!
//! This crate provides the HTTP API for the DevGenius coding assistant:
//!
//! - Registration, login and session tokens
//! - Plan catalog, payments and subscriptions
//! - Per-user message quotas gating the generative-AI proxy
//! - Product ratings
//!
//! # Authentication
//!
//! The service supports two authentication methods:
//!
//! 1. **Session tokens** - HS256 bearer tokens issued at login
//! 2. **Admin API key** - `X-Admin-Key` for operator endpoints
//!
//! Payment callbacks are authenticated by an HMAC signature over the body.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
// Allow some pedantic lints that are noisy for Axum handler functions
#![allow(clippy::missing_errors_doc)] // Axum handlers all return Result
#![allow(clippy::unused_async)] // Handlers are async for the router even when the store is sync

pub mod auth;
pub mod config;
pub mod crypto;
pub mod error;
pub mod extract;
pub mod genai;
pub mod handlers;
pub mod quota;
pub mod routes;
pub mod state;

pub use config::{ConfigError, ServiceConfig};
pub use error::ApiError;
pub use genai::{GenAiClient, GenAiError};
pub use routes::create_router;
pub use state::AppState;
