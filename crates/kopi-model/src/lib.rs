// SPDX-License-Identifier: Apache-2.0

#![forbid(unsafe_code)]

pub mod account;
pub mod catalog;
pub mod feedback;
pub mod ids;
pub mod money;
pub mod order;

pub use account::{RegistrationDraft, Session, SessionToken, User};
pub use catalog::{Coffee, CoffeeDraft};
pub use feedback::{ContactDraft, ContactMessage, Review, ReviewDraft};
pub use ids::{
    CoffeeId, ContactMessageId, OrderId, OrderItemId, ParseError, ReviewId, UserId,
};
pub use money::Price;
pub use order::{Order, OrderItem, OrderLine, OrderStatus, OrderView, Selection};

pub const CRATE_NAME: &str = "kopi-model";
