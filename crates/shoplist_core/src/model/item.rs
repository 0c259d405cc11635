//! Item domain model.
//!
//! # Responsibility
//! - Define the persisted item record and its insert-side counterpart.
//! - Provide name validation/normalization shared by every write path.
//!
//! # Invariants
//! - `id` is assigned by the store and never reused for another item.
//! - `name` is never empty after trimming.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid ws regex"));

/// Store-generated item identifier (SQLite rowid).
pub type ItemId = i64;

/// Validation failures for item writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemValidationError {
    /// Name is empty or whitespace only.
    EmptyName,
    /// Identifier is not a store-generated value.
    InvalidId(ItemId),
}

impl Display for ItemValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyName => write!(f, "item name cannot be empty"),
            Self::InvalidId(id) => write!(f, "item id must be positive, got {id}"),
        }
    }
}

impl Error for ItemValidationError {}

/// One entry of the shopping list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    pub id: ItemId,
    pub name: String,
    pub is_bought: bool,
}

impl Item {
    /// Returns a copy of this item carrying `name` instead.
    pub fn renamed(&self, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..self.clone()
        }
    }

    /// Returns a copy of this item with `is_bought` flipped.
    pub fn toggled(&self) -> Self {
        Self {
            is_bought: !self.is_bought,
            ..self.clone()
        }
    }

    /// Checks write-side invariants.
    pub fn validate(&self) -> Result<(), ItemValidationError> {
        if self.id <= 0 {
            return Err(ItemValidationError::InvalidId(self.id));
        }
        validate_name(&self.name)
    }
}

/// Insert input: an item before the store assigns its id.
///
/// New items always start with `is_bought = false`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewItem {
    pub name: String,
}

impl NewItem {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    pub fn validate(&self) -> Result<(), ItemValidationError> {
        validate_name(&self.name)
    }
}

/// Trims `raw` and collapses inner whitespace runs to single spaces.
///
/// Returns `None` when nothing but whitespace remains.
pub fn normalize_item_name(raw: &str) -> Option<String> {
    let collapsed = WHITESPACE_RE.replace_all(raw.trim(), " ");
    if collapsed.is_empty() {
        None
    } else {
        Some(collapsed.into_owned())
    }
}

fn validate_name(name: &str) -> Result<(), ItemValidationError> {
    if name.trim().is_empty() {
        return Err(ItemValidationError::EmptyName);
    }
    Ok(())
}
