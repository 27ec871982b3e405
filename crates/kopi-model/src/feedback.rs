// SPDX-License-Identifier: Apache-2.0

use crate::ids::{ContactMessageId, ParseError, ReviewId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const REVIEWER_NAME_MAX_LEN: usize = 100;
pub const SUBJECT_MAX_LEN: usize = 200;
pub const MESSAGE_MAX_LEN: usize = 8192;

/// A public review. The 1-5 rating range is a form-level hint; the store
/// accepts whatever integer was submitted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Review {
    pub id: ReviewId,
    pub name: String,
    pub image: Option<String>,
    pub rating: i32,
    pub message: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ReviewDraft {
    pub name: String,
    pub image: Option<String>,
    pub rating: i32,
    pub message: String,
}

impl ReviewDraft {
    pub fn validate(&self) -> Result<(), ParseError> {
        if self.name.trim().is_empty() {
            return Err(ParseError::Empty("name"));
        }
        if self.name.len() > REVIEWER_NAME_MAX_LEN {
            return Err(ParseError::TooLong("name", REVIEWER_NAME_MAX_LEN));
        }
        if self.message.trim().is_empty() {
            return Err(ParseError::Empty("message"));
        }
        if self.message.len() > MESSAGE_MAX_LEN {
            return Err(ParseError::TooLong("message", MESSAGE_MAX_LEN));
        }
        Ok(())
    }
}

/// A message submitted through the public contact form. Read-only once
/// stored; an administrator may delete it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ContactMessage {
    pub id: ContactMessageId,
    pub name: String,
    pub email: String,
    pub subject: String,
    pub message: String,
    pub sent_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ContactDraft {
    pub name: String,
    pub email: String,
    pub subject: String,
    pub message: String,
}

impl ContactDraft {
    pub fn validate(&self) -> Result<(), ParseError> {
        if self.name.trim().is_empty() {
            return Err(ParseError::Empty("name"));
        }
        if self.email.trim().is_empty() {
            return Err(ParseError::Empty("email"));
        }
        if !self.email.contains('@') {
            return Err(ParseError::InvalidFormat("email must contain '@'"));
        }
        if self.subject.trim().is_empty() {
            return Err(ParseError::Empty("subject"));
        }
        if self.subject.len() > SUBJECT_MAX_LEN {
            return Err(ParseError::TooLong("subject", SUBJECT_MAX_LEN));
        }
        if self.message.trim().is_empty() {
            return Err(ParseError::Empty("message"));
        }
        if self.message.len() > MESSAGE_MAX_LEN {
            return Err(ParseError::TooLong("message", MESSAGE_MAX_LEN));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn review_draft_requires_name_and_message() {
        let ok = ReviewDraft {
            name: "Mia".to_string(),
            image: None,
            rating: 5,
            message: "Best flat white in town.".to_string(),
        };
        assert!(ok.validate().is_ok());

        let mut missing = ok.clone();
        missing.message = String::new();
        assert!(missing.validate().is_err());
    }

    #[test]
    fn contact_draft_requires_a_plausible_email() {
        let mut draft = ContactDraft {
            name: "Sam".to_string(),
            email: "sam@example.com".to_string(),
            subject: "Catering".to_string(),
            message: "Do you cater weddings?".to_string(),
        };
        assert!(draft.validate().is_ok());

        draft.email = "not-an-email".to_string();
        assert!(draft.validate().is_err());
    }
}
