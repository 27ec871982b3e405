// SPDX-License-Identifier: Apache-2.0

use crate::ids::{CoffeeId, OrderId, OrderItemId, ParseError, UserId};
use crate::money::Price;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Order lifecycle. `Completed` and `Cancelled` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Pending,
    Processing,
    Completed,
    Cancelled,
}

impl OrderStatus {
    pub fn parse(raw: &str) -> Result<Self, ParseError> {
        match raw {
            "pending" => Ok(Self::Pending),
            "processing" => Ok(Self::Processing),
            "completed" => Ok(Self::Completed),
            "cancelled" => Ok(Self::Cancelled),
            _ => Err(ParseError::InvalidFormat(
                "status must be one of pending, processing, completed, cancelled",
            )),
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Processing => "processing",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }

    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled)
    }

    /// Allowed transitions: Pending -> Processing | Cancelled,
    /// Processing -> Completed | Cancelled. Terminal states accept nothing.
    #[must_use]
    pub fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::Processing)
                | (Self::Pending, Self::Cancelled)
                | (Self::Processing, Self::Completed)
                | (Self::Processing, Self::Cancelled)
        )
    }
}

/// An order aggregate root. `total` is derived: it must equal the sum of
/// line totals across the order's items after every item write.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Order {
    pub id: OrderId,
    pub user_id: UserId,
    pub placed_at: DateTime<Utc>,
    pub status: OrderStatus,
    pub total: Price,
}

/// A line owned by exactly one order. `unit_price` is snapshotted from the
/// catalog at creation and never changes, even if the coffee is re-priced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OrderItem {
    pub id: OrderItemId,
    pub order_id: OrderId,
    pub coffee_id: CoffeeId,
    pub quantity: u32,
    pub unit_price: Price,
}

impl OrderItem {
    #[must_use]
    pub fn line_total(&self) -> Price {
        self.unit_price.times(self.quantity)
    }
}

/// An item joined with its coffee's display name, for order listings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OrderLine {
    pub item: OrderItem,
    pub coffee_name: String,
}

/// An order together with all of its lines.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OrderView {
    pub order: Order,
    pub lines: Vec<OrderLine>,
}

impl OrderView {
    /// Checks the derived-total invariant.
    pub fn validate(&self) -> Result<(), ParseError> {
        let expected: Price = self.lines.iter().map(|l| l.item.line_total()).sum();
        if self.order.total != expected {
            return Err(ParseError::InvalidFormat(
                "order total must equal the sum of its line totals",
            ));
        }
        Ok(())
    }
}

/// One row of a submitted cart: a coffee and how many units of it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Selection {
    pub coffee_id: CoffeeId,
    pub quantity: u32,
}
