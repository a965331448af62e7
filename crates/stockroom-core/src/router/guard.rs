use tracing::debug;

use super::routes::{self, HOME_PATH, LOGIN_PATH};

/// Outcome of the navigation guard
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Proceed,
    Redirect(&'static str),
}

/// Decide whether a navigation to `path` may proceed.
///
/// Protected routes need a token; the login and registration pages are
/// skipped once a token exists. Paths outside the route table carry no auth
/// flag and always proceed.
pub fn check(path: &str, has_token: bool) -> Decision {
    let requires_auth = routes::find(path).map(|r| r.requires_auth).unwrap_or(false);

    let decision = if requires_auth && !has_token {
        Decision::Redirect(LOGIN_PATH)
    } else if routes::is_auth_page(path) && has_token {
        Decision::Redirect(HOME_PATH)
    } else {
        Decision::Proceed
    };

    debug!(path, has_token, ?decision, "Navigation guard");
    decision
}
