//! Request and response bodies for the authentication endpoints.

use serde::{Deserialize, Serialize};

use super::User;

#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

/// Body returned by `/auth/login` and `/auth/register`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AuthResponse {
    #[serde(default, alias = "access_token")]
    pub token: Option<String>,
    #[serde(default)]
    pub user: Option<User>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_auth_response() {
        let json = r#"{"token": "abc.def", "user": {"id": 1, "username": "mkent"}}"#;
        let resp: AuthResponse = serde_json::from_str(json).unwrap();
        assert_eq!(resp.token.as_deref(), Some("abc.def"));
        assert_eq!(resp.user.unwrap().username(), Some("mkent"));
    }

    #[test]
    fn test_parse_auth_response_access_token_alias() {
        let json = r#"{"access_token": "xyz", "token_type": "bearer"}"#;
        let resp: AuthResponse = serde_json::from_str(json).unwrap();
        assert_eq!(resp.token.as_deref(), Some("xyz"));
        assert!(resp.user.is_none());
    }

    #[test]
    fn test_parse_register_response_without_token() {
        let json = r#"{"user": {"id": 9}}"#;
        let resp: AuthResponse = serde_json::from_str(json).unwrap();
        assert!(resp.token.is_none());
        assert!(resp.user.is_some());
    }
}
