// SPDX-License-Identifier: Apache-2.0

use crate::{timestamp_from_db, Store, StoreError};
use chrono::Utc;
use kopi_model::{
    ContactDraft, ContactMessage, ContactMessageId, Review, ReviewDraft, ReviewId,
};
use rusqlite::{params, Row};

fn review_from_row(
    row: &Row<'_>,
) -> rusqlite::Result<(i64, String, Option<String>, i64, String, String)> {
    Ok((
        row.get(0)?,
        row.get(1)?,
        row.get(2)?,
        row.get(3)?,
        row.get(4)?,
        row.get(5)?,
    ))
}

impl Store {
    pub fn create_review(&self, draft: &ReviewDraft) -> Result<Review, StoreError> {
        draft.validate()?;
        let created_at = Utc::now();
        self.conn.execute(
            "INSERT INTO reviews (name, image, rating, message, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                draft.name,
                draft.image,
                i64::from(draft.rating),
                draft.message,
                created_at.to_rfc3339()
            ],
        )?;
        Ok(Review {
            id: ReviewId::from_raw(self.conn.last_insert_rowid()),
            name: draft.name.clone(),
            image: draft.image.clone(),
            rating: draft.rating,
            message: draft.message.clone(),
            created_at,
        })
    }

    /// Most recent reviews first, capped at `limit`. The review page shows
    /// the latest six.
    pub fn recent_reviews(&self, limit: usize) -> Result<Vec<Review>, StoreError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, name, image, rating, message, created_at
             FROM reviews ORDER BY id DESC LIMIT ?1",
        )?;
        let rows = stmt
            .query_map([limit as i64], review_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        rows.into_iter()
            .map(|(id, name, image, rating, message, created_at)| {
                Ok(Review {
                    id: ReviewId::from_raw(id),
                    name,
                    image,
                    rating: i32::try_from(rating)
                        .map_err(|_| StoreError::Internal("corrupt rating column".to_string()))?,
                    message,
                    created_at: timestamp_from_db(&created_at)?,
                })
            })
            .collect()
    }

    pub fn create_contact_message(
        &self,
        draft: &ContactDraft,
    ) -> Result<ContactMessage, StoreError> {
        draft.validate()?;
        let sent_at = Utc::now();
        self.conn.execute(
            "INSERT INTO contact_messages (name, email, subject, message, sent_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                draft.name,
                draft.email,
                draft.subject,
                draft.message,
                sent_at.to_rfc3339()
            ],
        )?;
        Ok(ContactMessage {
            id: ContactMessageId::from_raw(self.conn.last_insert_rowid()),
            name: draft.name.clone(),
            email: draft.email.clone(),
            subject: draft.subject.clone(),
            message: draft.message.clone(),
            sent_at,
        })
    }

    /// Administrative read of the inbox, newest first.
    pub fn list_contact_messages(&self) -> Result<Vec<ContactMessage>, StoreError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, name, email, subject, message, sent_at
             FROM contact_messages ORDER BY id DESC",
        )?;
        let rows = stmt
            .query_map([], |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, String>(3)?,
                    row.get::<_, String>(4)?,
                    row.get::<_, String>(5)?,
                ))
            })?
            .collect::<Result<Vec<_>, _>>()?;
        rows.into_iter()
            .map(|(id, name, email, subject, message, sent_at)| {
                Ok(ContactMessage {
                    id: ContactMessageId::from_raw(id),
                    name,
                    email,
                    subject,
                    message,
                    sent_at: timestamp_from_db(&sent_at)?,
                })
            })
            .collect()
    }

    pub fn delete_contact_message(&self, id: ContactMessageId) -> Result<(), StoreError> {
        let changed = self
            .conn
            .execute("DELETE FROM contact_messages WHERE id = ?1", [id.as_i64()])?;
        if changed == 0 {
            return Err(StoreError::NotFound(format!(
                "no contact message with id {id}"
            )));
        }
        Ok(())
    }
}
