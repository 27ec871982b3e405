// SPDX-License-Identifier: Apache-2.0

use crate::StoreError;
use rusqlite::Connection;

/// Idempotent schema. Prices are canonical two-digit decimal TEXT; all
/// timestamps are RFC 3339 UTC TEXT.
///
/// `order_items.order_id` cascades with its order; `order_items.coffee_id`
/// is delete-protected so a referenced coffee cannot leave the catalog.
const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS coffees (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    name        TEXT NOT NULL,
    price       TEXT NOT NULL,
    description TEXT NOT NULL,
    image       TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS users (
    id            INTEGER PRIMARY KEY AUTOINCREMENT,
    username      TEXT NOT NULL UNIQUE,
    email         TEXT NOT NULL UNIQUE,
    password_hash TEXT NOT NULL,
    created_at    TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS sessions (
    token      TEXT PRIMARY KEY,
    user_id    INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    created_at TEXT NOT NULL,
    expires_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS orders (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id     INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    placed_at   TEXT NOT NULL,
    status      TEXT NOT NULL DEFAULT 'pending',
    total_price TEXT NOT NULL DEFAULT '0.00'
);

CREATE TABLE IF NOT EXISTS order_items (
    id         INTEGER PRIMARY KEY AUTOINCREMENT,
    order_id   INTEGER NOT NULL REFERENCES orders(id) ON DELETE CASCADE,
    coffee_id  INTEGER NOT NULL REFERENCES coffees(id) ON DELETE RESTRICT,
    quantity   INTEGER NOT NULL CHECK (quantity > 0),
    unit_price TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS reviews (
    id         INTEGER PRIMARY KEY AUTOINCREMENT,
    name       TEXT NOT NULL,
    image      TEXT,
    rating     INTEGER NOT NULL,
    message    TEXT NOT NULL,
    created_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS contact_messages (
    id      INTEGER PRIMARY KEY AUTOINCREMENT,
    name    TEXT NOT NULL,
    email   TEXT NOT NULL,
    subject TEXT NOT NULL,
    message TEXT NOT NULL,
    sent_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_orders_user_placed
    ON orders(user_id, placed_at DESC);
CREATE INDEX IF NOT EXISTS idx_order_items_order
    ON order_items(order_id);
CREATE INDEX IF NOT EXISTS idx_order_items_coffee
    ON order_items(coffee_id);
CREATE INDEX IF NOT EXISTS idx_sessions_user
    ON sessions(user_id);
";

pub(crate) fn apply(conn: &Connection) -> Result<(), StoreError> {
    conn.execute_batch(SCHEMA)?;
    Ok(())
}
