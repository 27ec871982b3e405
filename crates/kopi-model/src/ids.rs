// SPDX-License-Identifier: Apache-2.0

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ParseError {
    Empty(&'static str),
    Trimmed(&'static str),
    TooLong(&'static str, usize),
    NotPositive(&'static str),
    InvalidFormat(&'static str),
}

impl Display for ParseError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Empty(name) => write!(f, "{name} must not be empty"),
            Self::Trimmed(name) => {
                write!(f, "{name} must not contain leading/trailing whitespace")
            }
            Self::TooLong(name, max) => write!(f, "{name} exceeds max length {max}"),
            Self::NotPositive(name) => write!(f, "{name} must be a positive integer"),
            Self::InvalidFormat(msg) => f.write_str(msg),
        }
    }
}

impl std::error::Error for ParseError {}

macro_rules! row_id {
    ($(#[$doc:meta])* $name:ident, $label:literal) => {
        $(#[$doc])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(i64);

        impl $name {
            /// Wraps a row id freshly assigned by the store.
            #[must_use]
            pub const fn from_raw(raw: i64) -> Self {
                Self(raw)
            }

            /// Parses a decimal id as it appears in a path segment or form field.
            pub fn parse(input: &str) -> Result<Self, ParseError> {
                let raw = input
                    .parse::<i64>()
                    .map_err(|_| ParseError::NotPositive($label))?;
                if raw <= 0 {
                    return Err(ParseError::NotPositive($label));
                }
                Ok(Self(raw))
            }

            #[must_use]
            pub const fn as_i64(self) -> i64 {
                self.0
            }
        }

        impl Display for $name {
            fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

row_id!(CoffeeId, "coffee_id");
row_id!(OrderId, "order_id");
row_id!(OrderItemId, "order_item_id");
row_id!(UserId, "user_id");
row_id!(ReviewId, "review_id");
row_id!(ContactMessageId, "contact_message_id");
