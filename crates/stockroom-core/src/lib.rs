//! Core library for the stockroom client.
//!
//! - `router`: static route table and the navigation guard
//! - `auth`: the session (token and cached user) and its storage
//! - `api`: the HTTP client wrapper that attaches the token and classifies 401s
//! - `app`: ties them together and handles expired sessions

pub mod api;
pub mod app;
pub mod auth;
pub mod config;
pub mod models;
pub mod router;
pub mod utils;

pub use api::{ApiClient, ApiError, RequestContext};
pub use app::{App, AppError, Page};
pub use auth::{FileStorage, MemoryStorage, Session, Storage};
pub use config::Config;
pub use router::{NavigationError, RouteEntry, Router, View, ROUTES};
