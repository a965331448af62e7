//! Client-side routing.
//!
//! This module provides:
//! - `ROUTES`: the static path to view table with auth flags
//! - `guard::check`: the pre-navigation decision function
//! - `Router`: current location tracking that follows guard redirects

pub mod guard;
pub mod navigator;
pub mod routes;

pub use guard::Decision;
pub use navigator::{NavigationError, Router};
pub use routes::{is_auth_page, RouteEntry, View, HOME_PATH, LOGIN_PATH, REGISTER_PATH, ROUTES};
