//! Data models exchanged with the backend.
//!
//! - `User`: the opaque cached user object
//! - `LoginRequest`, `RegisterRequest`, `AuthResponse`: auth endpoint bodies

pub mod auth;
pub mod user;

pub use auth::{AuthResponse, LoginRequest, RegisterRequest};
pub use user::User;
