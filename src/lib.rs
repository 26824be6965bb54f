//! TransitOps API client.
//!
//! Rust SDK for the TransitOps bus-operations backend. All calls flow through
//! one authenticated pipeline: the current bearer token is attached on
//! dispatch, a 401 triggers a single-flight token refresh, and every request
//! caught by the expiry is replayed once with the new credential. When the
//! refresh itself fails the session is cleared and a session-expired
//! notification fires.
//!
//! # Quick Start
//!
//! ```no_run
//! use transitops::prelude::*;
//!
//! # async fn example() -> transitops::error::Result<()> {
//! let client = ApiClient::from_env()?;
//! let auth = AuthApi::new(client.clone());
//! auth.login(&transitops::api::LoginRequest {
//!     email: "ops@transit.example".to_string(),
//!     password: "secret".to_string(),
//! })
//! .await?;
//!
//! let routes = client.get("/routes").await?;
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod auth;
pub mod client;
pub mod config;
pub mod error;
pub mod notify;
pub mod prelude;

pub use client::ApiClient;
pub use error::{Error, Result};
