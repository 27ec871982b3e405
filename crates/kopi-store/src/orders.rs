// SPDX-License-Identifier: Apache-2.0

use crate::{price_from_db, timestamp_from_db, Store, StoreError};
use chrono::Utc;
use kopi_model::{
    CoffeeId, Order, OrderId, OrderItem, OrderItemId, OrderLine, OrderStatus, OrderView, Price,
    Selection, UserId,
};
use rusqlite::{params, Connection, OptionalExtension};
use tracing::info;

fn fetch_order(conn: &Connection, id: OrderId) -> Result<Option<Order>, StoreError> {
    let raw = conn
        .query_row(
            "SELECT id, user_id, placed_at, status, total_price FROM orders WHERE id = ?1",
            [id.as_i64()],
            |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, i64>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, String>(3)?,
                    row.get::<_, String>(4)?,
                ))
            },
        )
        .optional()?;
    let Some((id, user_id, placed_at, status, total)) = raw else {
        return Ok(None);
    };
    Ok(Some(Order {
        id: OrderId::from_raw(id),
        user_id: UserId::from_raw(user_id),
        placed_at: timestamp_from_db(&placed_at)?,
        status: OrderStatus::parse(&status)
            .map_err(|e| StoreError::Internal(format!("corrupt status column: {e}")))?,
        total: price_from_db(&total)?,
    }))
}

fn fetch_lines(conn: &Connection, order_id: OrderId) -> Result<Vec<OrderLine>, StoreError> {
    let mut stmt = conn.prepare(
        "SELECT i.id, i.coffee_id, i.quantity, i.unit_price, c.name
         FROM order_items i JOIN coffees c ON c.id = i.coffee_id
         WHERE i.order_id = ?1 ORDER BY i.id",
    )?;
    let rows = stmt
        .query_map([order_id.as_i64()], |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, i64>(1)?,
                row.get::<_, i64>(2)?,
                row.get::<_, String>(3)?,
                row.get::<_, String>(4)?,
            ))
        })?
        .collect::<Result<Vec<_>, _>>()?;
    rows.into_iter()
        .map(|(id, coffee_id, quantity, unit_price, coffee_name)| {
            Ok(OrderLine {
                item: OrderItem {
                    id: OrderItemId::from_raw(id),
                    order_id,
                    coffee_id: CoffeeId::from_raw(coffee_id),
                    quantity: u32::try_from(quantity).map_err(|_| {
                        StoreError::Internal("corrupt quantity column".to_string())
                    })?,
                    unit_price: price_from_db(&unit_price)?,
                },
                coffee_name,
            })
        })
        .collect()
}

/// Sums line totals and persists the result on the parent order. Every item
/// write goes through here before its transaction commits, which is what
/// keeps the derived total readable immediately after the write.
fn recompute_total_on(conn: &Connection, order_id: OrderId) -> Result<Price, StoreError> {
    let lines = fetch_lines(conn, order_id)?;
    let total: Price = lines.iter().map(|l| l.item.line_total()).sum();
    let changed = conn.execute(
        "UPDATE orders SET total_price = ?1 WHERE id = ?2",
        params![total.canonical_string(), order_id.as_i64()],
    )?;
    if changed == 0 {
        return Err(StoreError::NotFound(format!("no order with id {order_id}")));
    }
    Ok(total)
}

fn snapshot_unit_price(conn: &Connection, coffee_id: CoffeeId) -> Result<Price, StoreError> {
    let raw = conn
        .query_row(
            "SELECT price FROM coffees WHERE id = ?1",
            [coffee_id.as_i64()],
            |row| row.get::<_, String>(0),
        )
        .optional()?
        .ok_or_else(|| StoreError::NotFound(format!("no coffee with id {coffee_id}")))?;
    price_from_db(&raw)
}

fn insert_item(
    conn: &Connection,
    order_id: OrderId,
    coffee_id: CoffeeId,
    quantity: u32,
    unit_price: Price,
) -> Result<OrderItem, StoreError> {
    conn.execute(
        "INSERT INTO order_items (order_id, coffee_id, quantity, unit_price)
         VALUES (?1, ?2, ?3, ?4)",
        params![
            order_id.as_i64(),
            coffee_id.as_i64(),
            i64::from(quantity),
            unit_price.canonical_string()
        ],
    )?;
    Ok(OrderItem {
        id: OrderItemId::from_raw(conn.last_insert_rowid()),
        order_id,
        coffee_id,
        quantity,
        unit_price,
    })
}

impl Store {
    /// Creates one order plus one item per selection with quantity > 0,
    /// snapshotting each unit price from the catalog and persisting the
    /// derived total, all in one transaction. An unknown coffee id aborts
    /// the whole placement; nothing from the submission persists.
    pub fn place_order(
        &mut self,
        user_id: UserId,
        selections: &[Selection],
    ) -> Result<OrderView, StoreError> {
        let picked: Vec<Selection> = selections
            .iter()
            .copied()
            .filter(|s| s.quantity > 0)
            .collect();
        if picked.is_empty() {
            return Err(StoreError::Validation(
                "an order needs at least one item".to_string(),
            ));
        }

        let tx = self.conn.transaction()?;
        let placed_at = Utc::now();
        tx.execute(
            "INSERT INTO orders (user_id, placed_at, status, total_price)
             VALUES (?1, ?2, ?3, ?4)",
            params![
                user_id.as_i64(),
                placed_at.to_rfc3339(),
                OrderStatus::Pending.as_str(),
                Price::ZERO.canonical_string()
            ],
        )?;
        let order_id = OrderId::from_raw(tx.last_insert_rowid());

        for selection in &picked {
            let unit_price = snapshot_unit_price(&tx, selection.coffee_id)?;
            insert_item(&tx, order_id, selection.coffee_id, selection.quantity, unit_price)?;
        }
        let total = recompute_total_on(&tx, order_id)?;

        let order = Order {
            id: order_id,
            user_id,
            placed_at,
            status: OrderStatus::Pending,
            total,
        };
        let lines = fetch_lines(&tx, order_id)?;
        tx.commit()?;

        info!(
            order_id = order_id.as_i64(),
            user_id = user_id.as_i64(),
            items = lines.len(),
            total = %total,
            "order placed"
        );
        Ok(OrderView { order, lines })
    }

    /// Adds one item to an existing order and recomputes the total before
    /// committing. The recompute is an explicit step of this command, not a
    /// hidden save hook.
    pub fn record_item(
        &mut self,
        order_id: OrderId,
        coffee_id: CoffeeId,
        quantity: u32,
    ) -> Result<OrderItem, StoreError> {
        if quantity == 0 {
            return Err(StoreError::Validation(
                "quantity must be greater than zero".to_string(),
            ));
        }
        let tx = self.conn.transaction()?;
        if fetch_order(&tx, order_id)?.is_none() {
            return Err(StoreError::NotFound(format!("no order with id {order_id}")));
        }
        let unit_price = snapshot_unit_price(&tx, coffee_id)?;
        let item = insert_item(&tx, order_id, coffee_id, quantity, unit_price)?;
        recompute_total_on(&tx, order_id)?;
        tx.commit()?;
        Ok(item)
    }

    /// Re-derives and persists an order's total from its items.
    pub fn recompute_total(&self, order_id: OrderId) -> Result<Price, StoreError> {
        recompute_total_on(&self.conn, order_id)
    }

    pub fn get_order(&self, order_id: OrderId) -> Result<OrderView, StoreError> {
        let order = fetch_order(&self.conn, order_id)?
            .ok_or_else(|| StoreError::NotFound(format!("no order with id {order_id}")))?;
        let lines = fetch_lines(&self.conn, order_id)?;
        Ok(OrderView { order, lines })
    }

    /// The user's orders, newest first, each with its lines.
    pub fn orders_for_user(&self, user_id: UserId) -> Result<Vec<OrderView>, StoreError> {
        let mut stmt = self
            .conn
            .prepare("SELECT id FROM orders WHERE user_id = ?1 ORDER BY placed_at DESC, id DESC")?;
        let ids = stmt
            .query_map([user_id.as_i64()], |row| row.get::<_, i64>(0))?
            .collect::<Result<Vec<_>, _>>()?;
        ids.into_iter()
            .map(|id| self.get_order(OrderId::from_raw(id)))
            .collect()
    }

    /// The most recently placed order, shown by the payment page.
    pub fn latest_order_for_user(&self, user_id: UserId) -> Result<Option<OrderView>, StoreError> {
        let id = self
            .conn
            .query_row(
                "SELECT id FROM orders WHERE user_id = ?1 ORDER BY placed_at DESC, id DESC LIMIT 1",
                [user_id.as_i64()],
                |row| row.get::<_, i64>(0),
            )
            .optional()?;
        match id {
            Some(id) => Ok(Some(self.get_order(OrderId::from_raw(id))?)),
            None => Ok(None),
        }
    }

    /// Administrator-driven status change, validated against the lifecycle
    /// table before anything is written.
    pub fn set_status(&self, order_id: OrderId, next: OrderStatus) -> Result<Order, StoreError> {
        let order = fetch_order(&self.conn, order_id)?
            .ok_or_else(|| StoreError::NotFound(format!("no order with id {order_id}")))?;
        if !order.status.can_transition_to(next) {
            return Err(StoreError::Validation(format!(
                "cannot move order {order_id} from {} to {}",
                order.status.as_str(),
                next.as_str()
            )));
        }
        self.conn.execute(
            "UPDATE orders SET status = ?1 WHERE id = ?2",
            params![next.as_str(), order_id.as_i64()],
        )?;
        Ok(Order {
            status: next,
            ..order
        })
    }

    /// Administrative delete; items cascade with the order.
    pub fn delete_order(&self, order_id: OrderId) -> Result<(), StoreError> {
        let changed = self
            .conn
            .execute("DELETE FROM orders WHERE id = ?1", [order_id.as_i64()])?;
        if changed == 0 {
            return Err(StoreError::NotFound(format!("no order with id {order_id}")));
        }
        Ok(())
    }

    /// Items of one order, without the coffee join. Used by tests asserting
    /// cascade behavior.
    pub fn items_for_order(&self, order_id: OrderId) -> Result<Vec<OrderItem>, StoreError> {
        Ok(fetch_lines(&self.conn, order_id)?
            .into_iter()
            .map(|l| l.item)
            .collect())
    }
}
