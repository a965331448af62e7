//! Session management.
//!
//! This module provides:
//! - `Session`: the token and cached user, passed explicitly to requests
//! - `Storage`: the key/value seam behind it, with `FileStorage` for
//!   persistence between runs and `MemoryStorage` for tests

pub mod session;
pub mod storage;

pub use session::{Session, TOKEN_KEY, USER_KEY};
pub use storage::{FileStorage, MemoryStorage, Storage, StoredItem};
