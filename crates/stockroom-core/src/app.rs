//! Application state for the stockroom client.
//!
//! `App` ties the route table, the session and the API client together. It
//! is where the side effects of an expired session happen: the client only
//! reports `ApiError::SessionExpired`, and `App` clears the stored
//! credentials and sends the router back to the login page.

use std::path::PathBuf;

use reqwest::Method;
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::{error, info, warn};

use crate::api::{ApiClient, ApiError, RequestContext};
use crate::auth::Session;
use crate::config::Config;
use crate::models::{LoginRequest, RegisterRequest, User};
use crate::router::{NavigationError, RouteEntry, Router, HOME_PATH, LOGIN_PATH, REGISTER_PATH};

#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Navigation(#[from] NavigationError),

    #[error("Username and password required")]
    MissingCredentials,

    #[error("Server response did not include a token")]
    MissingToken,

    #[error("Storage error: {0:#}")]
    Storage(anyhow::Error),
}

impl AppError {
    pub fn is_session_expired(&self) -> bool {
        matches!(self, AppError::Api(e) if e.is_session_expired())
    }
}

/// A view after navigation, with the collection it displays
#[derive(Debug, Clone)]
pub struct Page {
    pub route: &'static RouteEntry,
    pub data: Option<Value>,
}

pub struct App {
    config: Config,
    config_path: Option<PathBuf>,
    session: Session,
    router: Router,
    api: ApiClient,
}

impl App {
    pub fn new(config: Config, session: Session) -> Result<Self, AppError> {
        let api = ApiClient::new(&config)?;
        info!(base_url = api.base_url(), authenticated = session.has_token(), "App created");
        Ok(Self {
            config,
            config_path: None,
            session,
            router: Router::new(),
            api,
        })
    }

    /// Save config changes to `path` instead of the user's config directory
    pub fn with_config_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config_path = Some(path.into());
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn current_path(&self) -> &'static str {
        self.router.current_path()
    }

    pub fn is_authenticated(&self) -> bool {
        self.session.has_token()
    }

    pub fn current_user(&self) -> Option<User> {
        self.session.user()
    }

    // =========================================================================
    // Navigation
    // =========================================================================

    pub fn navigate(&mut self, path: &str) -> Result<&'static RouteEntry, AppError> {
        Ok(self.router.navigate(path, self.session.has_token())?)
    }

    /// Navigate to `path` and load the collection its view shows
    pub async fn open(&mut self, path: &str) -> Result<Page, AppError> {
        let route = self.navigate(path)?;
        let data = match route.view.resource() {
            Some(resource) => Some(self.fetch::<Value>(resource).await?),
            None => None,
        };
        Ok(Page { route, data })
    }

    // =========================================================================
    // Requests
    // =========================================================================

    /// Send a request from the current location.
    /// An expired session is cleared and the router moved to the login page
    /// before the error is returned.
    pub async fn send<T: DeserializeOwned, B: Serialize + ?Sized>(
        &mut self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> Result<T, AppError> {
        let ctx = RequestContext::new(&self.session, self.router.current_path());
        match self.api.send(&ctx, method, path, body).await {
            Err(ApiError::SessionExpired) => {
                self.expire_session();
                Err(ApiError::SessionExpired.into())
            }
            result => Ok(result?),
        }
    }

    pub async fn fetch<T: DeserializeOwned>(&mut self, path: &str) -> Result<T, AppError> {
        self.send::<T, ()>(Method::GET, path, None).await
    }

    fn expire_session(&mut self) {
        warn!(location = self.router.current_path(), "Session expired, clearing credentials");
        if let Err(e) = self.session.clear() {
            error!(error = %e, "Failed to clear expired session");
        }
        self.router.redirect_to_login();
    }

    // =========================================================================
    // Authentication
    // =========================================================================

    /// Log in and land on the dashboard.
    /// Failures leave any stored session untouched.
    pub async fn login(&mut self, username: &str, password: &str) -> Result<(), AppError> {
        if username.is_empty() || password.is_empty() {
            return Err(AppError::MissingCredentials);
        }

        let credentials = LoginRequest {
            username: username.to_string(),
            password: password.to_string(),
        };
        let ctx = RequestContext::new(&self.session, LOGIN_PATH);
        let response = match self.api.login(&ctx, &credentials).await {
            Ok(response) => response,
            Err(e) => {
                error!(error = %e, "Login failed");
                return Err(e.into());
            }
        };

        let token = response
            .token
            .filter(|t| !t.is_empty())
            .ok_or(AppError::MissingToken)?;
        self.session
            .store(&token, response.user.as_ref())
            .map_err(AppError::Storage)?;
        self.remember_username(username);

        self.navigate(HOME_PATH)?;
        info!(username, "Login successful");
        Ok(())
    }

    /// Create an account. Returns true when the server logged the new user
    /// in directly; otherwise the router is left on the login page.
    pub async fn register(&mut self, username: &str, email: &str, password: &str) -> Result<bool, AppError> {
        if username.is_empty() || email.is_empty() || password.is_empty() {
            return Err(AppError::MissingCredentials);
        }

        let details = RegisterRequest {
            username: username.to_string(),
            email: email.to_string(),
            password: password.to_string(),
        };
        let ctx = RequestContext::new(&self.session, REGISTER_PATH);
        let response = self.api.register(&ctx, &details).await?;

        match response.token.filter(|t| !t.is_empty()) {
            Some(token) => {
                self.session
                    .store(&token, response.user.as_ref())
                    .map_err(AppError::Storage)?;
                self.remember_username(username);
                self.navigate(HOME_PATH)?;
                info!(username, "Registered and logged in");
                Ok(true)
            }
            None => {
                self.navigate(LOGIN_PATH)?;
                info!(username, "Registered");
                Ok(false)
            }
        }
    }

    pub fn logout(&mut self) -> Result<(), AppError> {
        self.session.clear().map_err(AppError::Storage)?;
        self.navigate(LOGIN_PATH)?;
        info!("Logged out");
        Ok(())
    }

    fn remember_username(&mut self, username: &str) {
        self.config.last_username = Some(username.to_string());
        let saved = match self.config_path {
            Some(ref path) => self.config.save_to(path),
            None => self.config.save(),
        };
        if let Err(e) = saved {
            warn!(error = %e, "Failed to save config");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::router::View;
    use axum::http::{HeaderMap, StatusCode};
    use axum::response::IntoResponse;
    use axum::routing::{get, post};
    use axum::Json;
    use serde_json::json;

    const GOOD_TOKEN: &str = "tok-good";

    async fn login(Json(body): Json<Value>) -> axum::response::Response {
        if body["password"] == "secret" {
            Json(json!({
                "token": GOOD_TOKEN,
                "user": {"id": 1, "username": body["username"], "role": "admin"}
            }))
            .into_response()
        } else {
            (StatusCode::UNAUTHORIZED, "Incorrect username or password").into_response()
        }
    }

    async fn register(Json(body): Json<Value>) -> Json<Value> {
        Json(json!({"user": {"id": 2, "username": body["username"]}}))
    }

    async fn clients(headers: HeaderMap) -> axum::response::Response {
        let expected = format!("Bearer {}", GOOD_TOKEN);
        match headers.get("authorization").and_then(|v| v.to_str().ok()) {
            Some(auth) if auth == expected => Json(json!([{"id": 1, "name": "Acme Hardware"}])).into_response(),
            _ => (StatusCode::UNAUTHORIZED, "Could not validate credentials").into_response(),
        }
    }

    async fn spawn_backend() -> String {
        let app = axum::Router::new()
            .route("/api/v1/auth/login", post(login))
            .route("/api/v1/auth/register", post(register))
            .route("/api/v1/clients", get(clients))
            .route("/api/v1/issues", get(|| async { (StatusCode::SERVICE_UNAVAILABLE, "maintenance") }));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}", addr)
    }

    struct Fixture {
        app: App,
        _dir: tempfile::TempDir,
    }

    async fn fixture(session: Session) -> Fixture {
        let dir = tempfile::tempdir().unwrap();
        let config = Config {
            app_origin: Some(spawn_backend().await),
            ..Default::default()
        };
        let app = App::new(config, session)
            .unwrap()
            .with_config_path(dir.path().join("config.json"));
        Fixture { app, _dir: dir }
    }

    fn stale_session() -> Session {
        let mut session = Session::in_memory();
        let user = User::new(json!({"id": 1, "username": "mkent"}));
        session.store("tok-stale", Some(&user)).unwrap();
        session
    }

    #[tokio::test]
    async fn test_open_protected_view_without_token_shows_login() {
        let mut f = fixture(Session::in_memory()).await;
        let page = f.app.open("/clients").await.unwrap();
        assert_eq!(page.route.view, View::Login);
        assert!(page.data.is_none());
        assert_eq!(f.app.current_path(), "/login");
    }

    #[tokio::test]
    async fn test_login_then_open_view() {
        let mut f = fixture(Session::in_memory()).await;
        f.app.navigate("/login").unwrap();

        f.app.login("mkent", "secret").await.unwrap();
        assert_eq!(f.app.session().token(), Some(GOOD_TOKEN));
        assert_eq!(f.app.current_user().and_then(|u| u.role().map(str::to_string)).as_deref(), Some("admin"));
        assert_eq!(f.app.current_path(), "/");
        assert_eq!(f.app.config().last_username.as_deref(), Some("mkent"));

        let page = f.app.open("/clients").await.unwrap();
        assert_eq!(page.route.view, View::Clients);
        assert_eq!(page.data.unwrap()[0]["name"], "Acme Hardware");
    }

    #[tokio::test]
    async fn test_failed_login_keeps_session_and_location() {
        let mut f = fixture(stale_session()).await;
        f.app.navigate("/issues").unwrap();

        let err = f.app.login("mkent", "wrong").await.unwrap_err();
        assert!(matches!(err, AppError::Api(ApiError::Unauthorized(_))));
        assert_eq!(f.app.session().token(), Some("tok-stale"));
        assert!(f.app.current_user().is_some());
        assert_eq!(f.app.current_path(), "/issues");
    }

    #[tokio::test]
    async fn test_expired_session_is_cleared_and_redirected() {
        let mut f = fixture(stale_session()).await;

        let err = f.app.open("/clients").await.unwrap_err();
        assert!(err.is_session_expired());
        assert!(!f.app.is_authenticated());
        assert!(f.app.current_user().is_none());
        assert_eq!(f.app.current_path(), "/login");
    }

    #[tokio::test]
    async fn test_unauthorized_on_login_page_is_not_a_redirect() {
        let mut f = fixture(stale_session()).await;
        // A token is stored, so the guard will not show the login page;
        // the hard redirect puts us there the way an expiry would.
        f.app.router.redirect_to_login();

        let err = f.app.fetch::<Value>("/clients").await.unwrap_err();
        assert!(matches!(err, AppError::Api(ApiError::Unauthorized(_))));
        assert_eq!(f.app.session().token(), Some("tok-stale"));
        assert_eq!(f.app.current_path(), "/login");
    }

    #[tokio::test]
    async fn test_other_errors_leave_session_alone() {
        let mut f = fixture(stale_session()).await;

        let err = f.app.open("/issues").await.unwrap_err();
        assert!(matches!(err, AppError::Api(ApiError::ServerError(_))));
        assert!(f.app.is_authenticated());
        assert_eq!(f.app.current_path(), "/issues");
    }

    #[tokio::test]
    async fn test_login_requires_credentials() {
        let mut f = fixture(Session::in_memory()).await;
        assert!(matches!(f.app.login("", "secret").await, Err(AppError::MissingCredentials)));
        assert!(matches!(f.app.login("mkent", "").await, Err(AppError::MissingCredentials)));
    }

    #[tokio::test]
    async fn test_register_without_token_goes_to_login() {
        let mut f = fixture(Session::in_memory()).await;
        let logged_in = f.app.register("newbie", "newbie@example.com", "pw").await.unwrap();
        assert!(!logged_in);
        assert!(!f.app.is_authenticated());
        assert_eq!(f.app.current_path(), "/login");
    }

    #[tokio::test]
    async fn test_logout() {
        let mut f = fixture(stale_session()).await;
        f.app.navigate("/users").unwrap();

        f.app.logout().unwrap();
        assert!(!f.app.is_authenticated());
        assert!(f.app.current_user().is_none());
        assert_eq!(f.app.current_path(), "/login");
    }

    #[tokio::test]
    async fn test_dashboard_has_no_data() {
        let mut f = fixture(stale_session()).await;
        let page = f.app.open("/").await.unwrap();
        assert_eq!(page.route.view, View::Dashboard);
        assert!(page.data.is_none());
    }
}
