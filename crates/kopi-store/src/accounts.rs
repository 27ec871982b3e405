// SPDX-License-Identifier: Apache-2.0

use crate::{timestamp_from_db, Store, StoreError};
use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use chrono::{Duration, Utc};
use kopi_model::{RegistrationDraft, Session, SessionToken, User, UserId};
use rusqlite::{params, OptionalExtension, Row};
use tracing::info;
use uuid::Uuid;

const INVALID_CREDENTIALS: &str = "invalid username/email or password";

fn user_from_row(row: &Row<'_>) -> rusqlite::Result<(i64, String, String, String, String)> {
    Ok((
        row.get(0)?,
        row.get(1)?,
        row.get(2)?,
        row.get(3)?,
        row.get(4)?,
    ))
}

fn into_user(
    (id, username, email, password_hash, created_at): (i64, String, String, String, String),
) -> Result<User, StoreError> {
    Ok(User {
        id: UserId::from_raw(id),
        username,
        email,
        password_hash,
        created_at: timestamp_from_db(&created_at)?,
    })
}

fn hash_password(password: &str) -> Result<String, StoreError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|e| StoreError::Internal(format!("password hashing failed: {e}")))
}

fn verify_password(password: &str, stored_hash: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(stored_hash) else {
        return false;
    };
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}

impl Store {
    /// Creates an account. Username and email clashes are reported with
    /// distinct messages; password storage is an argon2 hash.
    pub fn register(&self, draft: &RegistrationDraft) -> Result<User, StoreError> {
        draft.validate()?;
        if self.find_user_by_username(&draft.username)?.is_some() {
            return Err(StoreError::Conflict("username already exists".to_string()));
        }
        if self.find_user_by_email(&draft.email)?.is_some() {
            return Err(StoreError::Conflict("email already exists".to_string()));
        }
        let password_hash = hash_password(&draft.password)?;
        let created_at = Utc::now();
        self.conn.execute(
            "INSERT INTO users (username, email, password_hash, created_at)
             VALUES (?1, ?2, ?3, ?4)",
            params![
                draft.username,
                draft.email,
                password_hash,
                created_at.to_rfc3339()
            ],
        )?;
        let user = User {
            id: UserId::from_raw(self.conn.last_insert_rowid()),
            username: draft.username.clone(),
            email: draft.email.clone(),
            password_hash,
            created_at,
        };
        info!(user_id = user.id.as_i64(), "user registered");
        Ok(user)
    }

    /// Authenticates with a username or an email plus the password. Failure
    /// is always the same generic message, whichever part was wrong.
    pub fn login(&self, identifier: &str, password: &str) -> Result<User, StoreError> {
        let found = match self.find_user_by_username(identifier)? {
            Some(user) => Some(user),
            None => self.find_user_by_email(identifier)?,
        };
        let Some(user) = found else {
            return Err(StoreError::Unauthorized(INVALID_CREDENTIALS.to_string()));
        };
        if !verify_password(password, &user.password_hash) {
            return Err(StoreError::Unauthorized(INVALID_CREDENTIALS.to_string()));
        }
        Ok(user)
    }

    pub fn find_user_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        let raw = self
            .conn
            .query_row(
                "SELECT id, username, email, password_hash, created_at
                 FROM users WHERE username = ?1",
                [username],
                user_from_row,
            )
            .optional()?;
        raw.map(into_user).transpose()
    }

    pub fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let raw = self
            .conn
            .query_row(
                "SELECT id, username, email, password_hash, created_at
                 FROM users WHERE email = ?1",
                [email],
                user_from_row,
            )
            .optional()?;
        raw.map(into_user).transpose()
    }

    /// Issues a fresh session token for the user, valid for `ttl`.
    pub fn create_session(&self, user_id: UserId, ttl: Duration) -> Result<Session, StoreError> {
        let token = SessionToken::parse(&Uuid::new_v4().simple().to_string())?;
        let created_at = Utc::now();
        let expires_at = created_at + ttl;
        self.conn.execute(
            "INSERT INTO sessions (token, user_id, created_at, expires_at)
             VALUES (?1, ?2, ?3, ?4)",
            params![
                token.as_str(),
                user_id.as_i64(),
                created_at.to_rfc3339(),
                expires_at.to_rfc3339()
            ],
        )?;
        Ok(Session {
            token,
            user_id,
            created_at,
            expires_at,
        })
    }

    /// Resolves a token to its user. Expired sessions are deleted on sight
    /// and resolve to `None`, same as unknown tokens.
    pub fn session_user(&self, token: &SessionToken) -> Result<Option<User>, StoreError> {
        let raw = self
            .conn
            .query_row(
                "SELECT user_id, created_at, expires_at FROM sessions WHERE token = ?1",
                [token.as_str()],
                |row| {
                    Ok((
                        row.get::<_, i64>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, String>(2)?,
                    ))
                },
            )
            .optional()?;
        let Some((user_id, created_at, expires_at)) = raw else {
            return Ok(None);
        };
        let session = Session {
            token: token.clone(),
            user_id: UserId::from_raw(user_id),
            created_at: timestamp_from_db(&created_at)?,
            expires_at: timestamp_from_db(&expires_at)?,
        };
        if session.is_expired_at(Utc::now()) {
            self.delete_session(token)?;
            return Ok(None);
        }
        let raw_user = self
            .conn
            .query_row(
                "SELECT id, username, email, password_hash, created_at
                 FROM users WHERE id = ?1",
                [session.user_id.as_i64()],
                user_from_row,
            )
            .optional()?;
        raw_user.map(into_user).transpose()
    }

    /// Invalidates a session token. Unknown tokens are a no-op; logout must
    /// not fail.
    pub fn delete_session(&self, token: &SessionToken) -> Result<(), StoreError> {
        self.conn
            .execute("DELETE FROM sessions WHERE token = ?1", [token.as_str()])?;
        Ok(())
    }
}
