// SPDX-License-Identifier: Apache-2.0

pub(crate) mod accounts;
pub(crate) mod feedback;
pub(crate) mod orders;
pub(crate) mod pages;

use kopi_store::StoreError;
use std::collections::HashMap;

/// Submitted form bodies are decoded as plain key/value pairs so that a
/// missing field flashes like any other validation failure instead of
/// surfacing as an extractor rejection.
pub(crate) type FormFields = HashMap<String, String>;

pub(crate) fn field(form: &FormFields, name: &str) -> Result<String, StoreError> {
    form.get(name)
        .cloned()
        .ok_or_else(|| StoreError::Validation(format!("please fill in all fields ({name} is missing)")))
}

pub(crate) fn int_field(form: &FormFields, name: &str) -> Result<i32, StoreError> {
    field(form, name)?
        .trim()
        .parse::<i32>()
        .map_err(|_| StoreError::Validation(format!("{name} must be a whole number")))
}
