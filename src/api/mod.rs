//! Typed wrappers over the REST endpoints.

pub mod auth;
pub mod resource;

pub use auth::{AuthApi, LoginRequest, LoginResponse};
pub use resource::{DeleteOutcome, ListQuery, Page, ResourceClient, SortOrder};
