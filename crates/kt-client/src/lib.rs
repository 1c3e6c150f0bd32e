//! # kt-client
//!
//! HTTP plumbing for exercising a REST resource under test.
//!
//! This crate provides:
//! - [`ApiClient`]: a thin `reqwest` wrapper with a base URL and bearer credential
//! - [`ResourceClient`]: CRUD helpers rooted at one resource path
//! - [`Scoped`]: a created record that is deleted again on every exit path
//! - [`AuthBridge`]: identity resolution and token injection
//!
//! Every helper issues exactly one HTTP request and never retries.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod api;
pub mod auth;
pub mod error;
pub mod resource;
pub mod scoped;

pub use api::{ApiClient, ClientOptions};
pub use auth::{
    AuthBridge, CurrentUser, Grant, IdentityProvider, OidcIdentityProvider, OidcSettings,
    StaticTokenProvider, TokenResponse,
};
pub use error::{ClientError, ClientResult};
pub use resource::{Identified, RecordId, ResourceClient};
pub use scoped::Scoped;
