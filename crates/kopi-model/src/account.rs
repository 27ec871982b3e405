// SPDX-License-Identifier: Apache-2.0

use crate::ids::{ParseError, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

pub const USERNAME_MAX_LEN: usize = 150;
pub const PASSWORD_MIN_LEN: usize = 8;
pub const TOKEN_MAX_LEN: usize = 64;

/// A registered customer. The password never leaves the store layer; only
/// its argon2 hash is persisted, and it is not serialized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistrationDraft {
    pub username: String,
    pub email: String,
    pub password: String,
}

impl RegistrationDraft {
    pub fn validate(&self) -> Result<(), ParseError> {
        if self.username.trim().is_empty() {
            return Err(ParseError::Empty("username"));
        }
        if self.username.trim() != self.username {
            return Err(ParseError::Trimmed("username"));
        }
        if self.username.len() > USERNAME_MAX_LEN {
            return Err(ParseError::TooLong("username", USERNAME_MAX_LEN));
        }
        if self.email.trim().is_empty() {
            return Err(ParseError::Empty("email"));
        }
        if !self.email.contains('@') {
            return Err(ParseError::InvalidFormat("email must contain '@'"));
        }
        if self.password.len() < PASSWORD_MIN_LEN {
            return Err(ParseError::InvalidFormat(
                "password must be at least 8 characters",
            ));
        }
        Ok(())
    }
}

/// An opaque session token carried in the session cookie.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionToken(String);

impl SessionToken {
    pub fn parse(input: &str) -> Result<Self, ParseError> {
        if input.is_empty() {
            return Err(ParseError::Empty("session_token"));
        }
        if input.trim() != input {
            return Err(ParseError::Trimmed("session_token"));
        }
        if input.len() > TOKEN_MAX_LEN {
            return Err(ParseError::TooLong("session_token", TOKEN_MAX_LEN));
        }
        Ok(Self(input.to_string()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for SessionToken {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Explicit session lifecycle: issued at login or registration, deleted at
/// logout, invalid once `expires_at` has passed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Session {
    pub token: SessionToken,
    pub user_id: UserId,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl Session {
    #[must_use]
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn draft() -> RegistrationDraft {
        RegistrationDraft {
            username: "mia".to_string(),
            email: "mia@example.com".to_string(),
            password: "correct horse".to_string(),
        }
    }

    #[test]
    fn registration_draft_validates_fields() {
        assert!(draft().validate().is_ok());

        let mut short = draft();
        short.password = "short".to_string();
        assert!(short.validate().is_err());

        let mut bad_email = draft();
        bad_email.email = "mia.example.com".to_string();
        assert!(bad_email.validate().is_err());
    }

    #[test]
    fn session_expiry_is_inclusive_of_the_deadline() {
        let now = Utc::now();
        let session = Session {
            token: SessionToken::parse("abc123").unwrap(),
            user_id: UserId::from_raw(1),
            created_at: now,
            expires_at: now + Duration::hours(12),
        };
        assert!(!session.is_expired_at(now));
        assert!(session.is_expired_at(now + Duration::hours(12)));
        assert!(session.is_expired_at(now + Duration::hours(13)));
    }
}
