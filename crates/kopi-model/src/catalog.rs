// SPDX-License-Identifier: Apache-2.0

use crate::ids::{CoffeeId, ParseError};
use crate::money::Price;
use serde::{Deserialize, Serialize};

pub const NAME_MAX_LEN: usize = 100;
pub const DESCRIPTION_MAX_LEN: usize = 4096;

/// A purchasable catalog entry. Read-only at runtime; mutated only through
/// administrative store operations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Coffee {
    pub id: CoffeeId,
    pub name: String,
    pub price: Price,
    pub description: String,
    /// Path into the media directory, e.g. `coffee_images/espresso.jpg`.
    pub image: String,
}

/// Fields for a coffee about to be created or updated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CoffeeDraft {
    pub name: String,
    pub price: Price,
    pub description: String,
    pub image: String,
}

impl CoffeeDraft {
    pub fn validate(&self) -> Result<(), ParseError> {
        if self.name.trim().is_empty() {
            return Err(ParseError::Empty("name"));
        }
        if self.name.len() > NAME_MAX_LEN {
            return Err(ParseError::TooLong("name", NAME_MAX_LEN));
        }
        if self.description.len() > DESCRIPTION_MAX_LEN {
            return Err(ParseError::TooLong("description", DESCRIPTION_MAX_LEN));
        }
        Ok(())
    }
}
