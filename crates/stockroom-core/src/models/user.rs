//! The cached user object.
//!
//! The backend's user record is kept opaque: it is stored and returned as the
//! JSON the server sent, with accessors for the fields most backends share.

use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct User(Value);

impl User {
    pub fn new(value: Value) -> Self {
        Self(value)
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }

    fn str_field(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(Value::as_str).filter(|s| !s.is_empty())
    }

    pub fn username(&self) -> Option<&str> {
        self.str_field("username")
    }

    pub fn name(&self) -> Option<&str> {
        self.str_field("full_name").or_else(|| self.str_field("name"))
    }

    pub fn email(&self) -> Option<&str> {
        self.str_field("email")
    }

    pub fn role(&self) -> Option<&str> {
        self.str_field("role")
    }

    /// Best available label for display
    pub fn display_name(&self) -> String {
        self.name()
            .or_else(|| self.username())
            .or_else(|| self.email())
            .unwrap_or("Unknown user")
            .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_display_name_prefers_full_name() {
        let user = User::new(json!({"username": "mkent", "full_name": "Maya Kent"}));
        assert_eq!(user.display_name(), "Maya Kent");

        let user = User::new(json!({"username": "mkent", "name": ""}));
        assert_eq!(user.display_name(), "mkent");

        let user = User::new(json!({"email": "ops@example.com"}));
        assert_eq!(user.display_name(), "ops@example.com");

        let user = User::new(json!({"id": 7}));
        assert_eq!(user.display_name(), "Unknown user");
    }

    #[test]
    fn test_unknown_fields_survive_serialization() {
        let raw = json!({"id": 3, "role": "admin", "warehouse": {"code": "W1"}});
        let user: User = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(user.role(), Some("admin"));
        assert_eq!(serde_json::to_value(&user).unwrap(), raw);
    }
}
