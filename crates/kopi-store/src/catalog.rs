// SPDX-License-Identifier: Apache-2.0

use crate::{price_from_db, Store, StoreError};
use kopi_model::{Coffee, CoffeeDraft, CoffeeId};
use rusqlite::{params, OptionalExtension, Row};

fn coffee_from_row(row: &Row<'_>) -> rusqlite::Result<(i64, String, String, String, String)> {
    Ok((
        row.get(0)?,
        row.get(1)?,
        row.get(2)?,
        row.get(3)?,
        row.get(4)?,
    ))
}

fn into_coffee(
    (id, name, price, description, image): (i64, String, String, String, String),
) -> Result<Coffee, StoreError> {
    Ok(Coffee {
        id: CoffeeId::from_raw(id),
        name,
        price: price_from_db(&price)?,
        description,
        image,
    })
}

impl Store {
    pub fn create_coffee(&self, draft: &CoffeeDraft) -> Result<Coffee, StoreError> {
        draft.validate()?;
        self.conn.execute(
            "INSERT INTO coffees (name, price, description, image) VALUES (?1, ?2, ?3, ?4)",
            params![
                draft.name,
                draft.price.canonical_string(),
                draft.description,
                draft.image
            ],
        )?;
        let id = CoffeeId::from_raw(self.conn.last_insert_rowid());
        Ok(Coffee {
            id,
            name: draft.name.clone(),
            price: draft.price,
            description: draft.description.clone(),
            image: draft.image.clone(),
        })
    }

    pub fn get_coffee(&self, id: CoffeeId) -> Result<Coffee, StoreError> {
        let raw = self
            .conn
            .query_row(
                "SELECT id, name, price, description, image FROM coffees WHERE id = ?1",
                [id.as_i64()],
                coffee_from_row,
            )
            .optional()?
            .ok_or_else(|| StoreError::NotFound(format!("no coffee with id {id}")))?;
        into_coffee(raw)
    }

    /// Full catalog in name order, for the landing and menu pages.
    pub fn list_coffees(&self) -> Result<Vec<Coffee>, StoreError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, name, price, description, image FROM coffees ORDER BY name, id",
        )?;
        let rows = stmt
            .query_map([], coffee_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        rows.into_iter().map(into_coffee).collect()
    }

    /// Administrative edit. Existing order items keep their snapshot price.
    pub fn update_coffee(&self, id: CoffeeId, draft: &CoffeeDraft) -> Result<Coffee, StoreError> {
        draft.validate()?;
        let changed = self.conn.execute(
            "UPDATE coffees SET name = ?1, price = ?2, description = ?3, image = ?4 WHERE id = ?5",
            params![
                draft.name,
                draft.price.canonical_string(),
                draft.description,
                draft.image,
                id.as_i64()
            ],
        )?;
        if changed == 0 {
            return Err(StoreError::NotFound(format!("no coffee with id {id}")));
        }
        self.get_coffee(id)
    }

    /// Administrative delete. Refused with [`StoreError::Integrity`] while
    /// any order item references the coffee.
    pub fn delete_coffee(&self, id: CoffeeId) -> Result<(), StoreError> {
        let result = self
            .conn
            .execute("DELETE FROM coffees WHERE id = ?1", [id.as_i64()]);
        match result {
            Ok(0) => Err(StoreError::NotFound(format!("no coffee with id {id}"))),
            Ok(_) => Ok(()),
            Err(err) => match StoreError::from(err) {
                StoreError::Integrity(_) => Err(StoreError::Integrity(format!(
                    "coffee {id} is referenced by existing order items"
                ))),
                other => Err(other),
            },
        }
    }
}
