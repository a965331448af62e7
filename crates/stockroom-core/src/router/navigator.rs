use thiserror::Error;
use tracing::{debug, info};

use super::guard::{self, Decision};
use super::routes::{self, RouteEntry, LOGIN_PATH};

/// Maximum guard redirects followed for a single navigation.
/// The table needs at most one hop; anything longer means the guard and the
/// table disagree.
const MAX_REDIRECTS: usize = 3;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NavigationError {
    #[error("No route matches {0}")]
    NotFound(String),

    #[error("Too many redirects navigating to {0}")]
    TooManyRedirects(String),
}

/// Tracks the current location and runs the guard before every change.
#[derive(Debug, Clone, Default)]
pub struct Router {
    current: Option<&'static RouteEntry>,
}

impl Router {
    pub fn new() -> Self {
        Self::default()
    }

    /// Navigate to `path`, following guard redirects
    pub fn navigate(
        &mut self,
        path: &str,
        has_token: bool,
    ) -> Result<&'static RouteEntry, NavigationError> {
        let mut target = routes::normalize(path);

        for _ in 0..=MAX_REDIRECTS {
            match guard::check(&target, has_token) {
                Decision::Proceed => {
                    let route = routes::find(&target)
                        .ok_or_else(|| NavigationError::NotFound(target.clone()))?;
                    debug!(from = self.current_path(), to = route.path, "Navigated");
                    self.current = Some(route);
                    return Ok(route);
                }
                Decision::Redirect(next) => {
                    debug!(from = %target, to = next, "Guard redirect");
                    target = next.to_string();
                }
            }
        }

        Err(NavigationError::TooManyRedirects(path.to_string()))
    }

    /// Jump straight to the login page, bypassing the guard.
    pub fn redirect_to_login(&mut self) {
        info!(from = self.current_path(), "Redirecting to login");
        self.current = routes::find(LOGIN_PATH);
    }

    /// Current location, empty before the first navigation
    pub fn current_path(&self) -> &'static str {
        self.current.map(|r| r.path).unwrap_or("")
    }

    pub fn current(&self) -> Option<&'static RouteEntry> {
        self.current
    }
}
