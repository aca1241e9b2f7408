// src/models/user.rs

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// Letters, digits and `@ . + - _`.
static USERNAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[\w.@+-]+\z").expect("username pattern is valid"));

/// Account role. Stored lowercase in `users.role`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum Role {
    #[default]
    User,
    Moderator,
    Admin,
}

/// Represents the 'users' table in the database.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct User {
    #[serde(skip)]
    pub id: i64,

    /// Unique username.
    pub username: String,

    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub bio: String,
    pub role: Role,

    /// Argon2 hash of the last confirmation code issued.
    /// Skipped during serialization to prevent leaking sensitive data.
    #[serde(skip)]
    pub confirmation_code: Option<String>,
}

/// Rejects the reserved `me` path segment as a username.
fn validate_not_me(username: &str) -> Result<(), validator::ValidationError> {
    if username.eq_ignore_ascii_case("me") {
        let mut err = validator::ValidationError::new("reserved_username");
        err.message = Some("Username 'me' is reserved.".into());
        return Err(err);
    }
    Ok(())
}

/// DTO for `POST /auth/signup/`.
#[derive(Debug, Deserialize, Validate)]
pub struct SignupRequest {
    #[validate(
        length(min = 1, max = 150, message = "Username length must be between 1 and 150 characters."),
        regex(path = *USERNAME_RE, message = "Username may contain only letters, digits and @/./+/-/_."),
        custom(function = validate_not_me)
    )]
    pub username: String,

    #[validate(
        email(message = "Enter a valid email address."),
        length(max = 254, message = "Email must be at most 254 characters.")
    )]
    pub email: String,
}

/// DTO for `POST /auth/token/`.
#[derive(Debug, Deserialize, Validate)]
pub struct TokenRequest {
    #[validate(length(min = 1, max = 150))]
    pub username: String,
    #[validate(length(min = 1, max = 64))]
    pub confirmation_code: String,
}

/// DTO for an admin creating an account (can specify role).
#[derive(Debug, Deserialize, Validate)]
pub struct CreateUserRequest {
    #[validate(
        length(min = 1, max = 150, message = "Username length must be between 1 and 150 characters."),
        regex(path = *USERNAME_RE, message = "Username may contain only letters, digits and @/./+/-/_."),
        custom(function = validate_not_me)
    )]
    pub username: String,

    #[validate(
        email(message = "Enter a valid email address."),
        length(max = 254, message = "Email must be at most 254 characters.")
    )]
    pub email: String,

    #[serde(default)]
    #[validate(length(max = 150))]
    pub first_name: String,

    #[serde(default)]
    #[validate(length(max = 150))]
    pub last_name: String,

    #[serde(default)]
    pub bio: String,

    #[serde(default)]
    pub role: Role,
}

/// DTO for updating an account. Fields are optional.
///
/// The admin endpoint honours `role`; `/users/me/` clears it before use.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateUserRequest {
    #[validate(
        length(min = 1, max = 150, message = "Username length must be between 1 and 150 characters."),
        regex(path = *USERNAME_RE, message = "Username may contain only letters, digits and @/./+/-/_."),
        custom(function = validate_not_me)
    )]
    pub username: Option<String>,

    #[validate(
        email(message = "Enter a valid email address."),
        length(max = 254, message = "Email must be at most 254 characters.")
    )]
    pub email: Option<String>,

    #[validate(length(max = 150))]
    pub first_name: Option<String>,

    #[validate(length(max = 150))]
    pub last_name: Option<String>,

    pub bio: Option<String>,

    pub role: Option<Role>,
}

/// Query parameters for listing accounts.
#[derive(Debug, Deserialize)]
pub struct UserListParams {
    pub search: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signup(username: &str, email: &str) -> SignupRequest {
        SignupRequest {
            username: username.to_string(),
            email: email.to_string(),
        }
    }

    #[test]
    fn signup_accepts_django_style_usernames() {
        assert!(signup("alice.b+1@x-y_z", "alice@example.com").validate().is_ok());
    }

    #[test]
    fn signup_rejects_reserved_and_malformed_usernames() {
        assert!(signup("me", "me@example.com").validate().is_err());
        assert!(signup("ME", "me@example.com").validate().is_err());
        assert!(signup("bad name", "a@example.com").validate().is_err());
        assert!(signup("", "a@example.com").validate().is_err());
        assert!(signup("alice", "not-an-email").validate().is_err());
    }

    #[test]
    fn role_defaults_to_user_and_serializes_lowercase() {
        assert_eq!(Role::default(), Role::User);
        assert_eq!(serde_json::to_value(Role::Moderator).unwrap(), "moderator");
    }
}
