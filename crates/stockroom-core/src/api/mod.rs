//! REST API client module for the stockroom backend.
//!
//! This module provides the `ApiClient` for talking to the `/api/v1`
//! endpoints. Requests are authenticated with the bearer token from the
//! `Session` passed in through a `RequestContext`.

pub mod client;
pub mod error;

pub use client::{expires_session, is_auth_endpoint, ApiClient, RequestContext, LOGIN_ENDPOINT, REGISTER_ENDPOINT};
pub use error::ApiError;
