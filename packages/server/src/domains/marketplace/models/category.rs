use serde::{Deserialize, Serialize};
use std::fmt;

use crate::common::MarketplaceError;

const MIN_LENGTH: usize = 2;
const MAX_LENGTH: usize = 50;

/// A free-form listing category ("Vegetables", "Dairy", ...).
///
/// Trimmed on construction; 2-50 characters. Categories are plain values,
/// not a curated taxonomy.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Category(String);

impl Category {
    /// Validating factory.
    pub fn of(category: &str) -> Result<Self, MarketplaceError> {
        let normalized = category.trim();

        if normalized.is_empty() {
            return Err(MarketplaceError::validation(
                "category",
                "Category cannot be empty",
            ));
        }

        if normalized.chars().count() < MIN_LENGTH {
            return Err(MarketplaceError::validation(
                "category",
                format!("Category must be at least {} characters", MIN_LENGTH),
            ));
        }

        if normalized.chars().count() > MAX_LENGTH {
            return Err(MarketplaceError::validation(
                "category",
                format!("Category cannot exceed {} characters", MAX_LENGTH),
            ));
        }

        Ok(Self(normalized.to_string()))
    }

    pub fn value(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
