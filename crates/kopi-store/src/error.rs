// SPDX-License-Identifier: Apache-2.0

use kopi_model::ParseError;
use std::fmt;

/// Store-level error taxonomy. The HTTP layer converts every variant into a
/// flash message plus a redirect; nothing here reaches a client raw.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum StoreError {
    /// Missing or malformed input (empty fields, zero-item carts, illegal
    /// status transitions).
    Validation(String),
    /// Unknown primary key.
    NotFound(String),
    /// Bad credentials or a missing/expired session.
    Unauthorized(String),
    /// Uniqueness clash at registration, with a distinct message per field.
    Conflict(String),
    /// Referential-integrity refusal, e.g. deleting a coffee that order
    /// items still reference.
    Integrity(String),
    /// Anything the underlying database reported that the layers above have
    /// no better name for.
    Internal(String),
}

impl StoreError {
    #[must_use]
    pub fn message(&self) -> &str {
        match self {
            Self::Validation(m)
            | Self::NotFound(m)
            | Self::Unauthorized(m)
            | Self::Conflict(m)
            | Self::Integrity(m)
            | Self::Internal(m) => m,
        }
    }
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Validation(m) => write!(f, "validation: {m}"),
            Self::NotFound(m) => write!(f, "not found: {m}"),
            Self::Unauthorized(m) => write!(f, "unauthorized: {m}"),
            Self::Conflict(m) => write!(f, "conflict: {m}"),
            Self::Integrity(m) => write!(f, "integrity: {m}"),
            Self::Internal(m) => write!(f, "internal: {m}"),
        }
    }
}

impl std::error::Error for StoreError {}

impl From<rusqlite::Error> for StoreError {
    fn from(err: rusqlite::Error) -> Self {
        if let rusqlite::Error::SqliteFailure(code, ref message) = err {
            if code.code == rusqlite::ErrorCode::ConstraintViolation {
                let detail = message
                    .clone()
                    .unwrap_or_else(|| "constraint violation".to_string());
                return Self::Integrity(detail);
            }
        }
        Self::Internal(err.to_string())
    }
}

impl From<ParseError> for StoreError {
    fn from(err: ParseError) -> Self {
        Self::Validation(err.to_string())
    }
}
