use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

pub type UserId = i64;

/// Account row. Identified by email; `password` holds an argon2 PHC string.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: UserId,
    pub email: String,
    pub name: String,
    #[serde(skip_serializing)]
    pub password: String,
    pub is_active: bool,
    pub is_staff: bool,
    pub is_superuser: bool,
    pub created_at: DateTime<Utc>,
}

/// Values for a user insert. The password is already hashed.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub name: String,
    pub password: String,
    pub is_active: bool,
    pub is_staff: bool,
    pub is_superuser: bool,
}

impl NewUser {
    pub fn regular(email: String, name: String, password: String) -> Self {
        Self {
            email,
            name,
            password,
            is_active: true,
            is_staff: false,
            is_superuser: false,
        }
    }

    pub fn superuser(email: String, password: String) -> Self {
        Self {
            email,
            name: String::new(),
            password,
            is_active: true,
            is_staff: true,
            is_superuser: true,
        }
    }
}

/// Partial profile update; `None` leaves the column as is.
#[derive(Debug, Clone, Default)]
pub struct UserChanges {
    pub email: Option<String>,
    pub name: Option<String>,
    pub password: Option<String>,
}

impl UserChanges {
    pub fn is_empty(&self) -> bool {
        self.email.is_none() && self.name.is_none() && self.password.is_none()
    }
}

/// Lower-case the domain part of an address, leaving the local part untouched.
pub fn normalize_email(email: &str) -> String {
    let email = email.trim();
    match email.rsplit_once('@') {
        Some((local, domain)) => format!("{}@{}", local, domain.to_lowercase()),
        None => email.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_only_the_domain() {
        assert_eq!(normalize_email("Test1@EXAMPLE.com"), "Test1@example.com");
        assert_eq!(normalize_email("test4@example.COM"), "test4@example.com");
        assert_eq!(normalize_email("  plain@Example.org "), "plain@example.org");
        assert_eq!(normalize_email("no-at-sign"), "no-at-sign");
    }

    #[test]
    fn password_is_never_serialized() {
        let user = User {
            id: 1,
            email: "a@example.com".to_string(),
            name: "A".to_string(),
            password: "$argon2id$secret".to_string(),
            is_active: true,
            is_staff: false,
            is_superuser: false,
            created_at: Utc::now(),
        };
        let value = serde_json::to_value(&user).unwrap();
        assert!(value.get("password").is_none());
        assert_eq!(value["email"], "a@example.com");
    }
}
