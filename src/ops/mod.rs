//! Domain operations over the store tables.
//!
//! Every mutating operation is a plain function over `&mut Tables` meant to
//! run inside [`Store::apply`](crate::store::Store::apply): returning an
//! error discards every change the operation made. Read operations take
//! `&Tables` and return owned views ready for serialization.

use std::fmt::Display;

use thiserror::Error;

use crate::store::StoreError;

pub mod dashboard;
pub mod desert_storm;
pub mod events;
pub mod help;
pub mod members;
pub mod reference;
pub mod trains;
pub mod vs;

#[derive(Debug, Error)]
pub enum OpError {
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: String },

    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Conflict(String),

    #[error(transparent)]
    Storage(#[from] StoreError),
}

pub type OpResult<T> = Result<T, OpError>;

impl OpError {
    pub fn not_found(entity: &'static str, id: impl Display) -> Self {
        OpError::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        OpError::Validation(message.into())
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        OpError::Conflict(message.into())
    }
}

/// Trims an optional free-text field, mapping blank input to `None`.
pub(crate) fn clean(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Trims a required text field, failing when it is missing or blank.
pub(crate) fn required(value: Option<String>, field: &str) -> OpResult<String> {
    clean(value).ok_or_else(|| OpError::validation(format!("{field} is required")))
}

/// Trims and deduplicates a tag list, keeping first-seen order.
pub(crate) fn clean_tags(tags: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(tags.len());
    for tag in tags {
        let tag = tag.trim();
        if !tag.is_empty() && !out.iter().any(|t| t.eq_ignore_ascii_case(tag)) {
            out.push(tag.to_string());
        }
    }
    out
}
