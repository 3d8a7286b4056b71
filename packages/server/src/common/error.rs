use std::collections::BTreeMap;
use thiserror::Error;

/// Error taxonomy for the marketplace core.
///
/// All variants are propagated untouched to the host: the core performs no
/// retries or swallowing. Validation variants map to 4xx-equivalents with a
/// field -> message payload; `Conflict` is retryable by the caller.
#[derive(Error, Debug)]
pub enum MarketplaceError {
    /// A single input field violated a shape/range constraint.
    #[error("{message}")]
    Validation { field: String, message: String },

    /// Multiple fields failed validation; all violations are reported at once.
    #[error("validation failed")]
    ValidationFailed(BTreeMap<String, String>),

    /// The requested listing does not exist.
    #[error("Listing not found")]
    NotFound,

    /// The caller does not own the listing they tried to modify.
    #[error("You do not have permission to modify this listing")]
    PermissionDenied,

    /// A concurrent update won the version race; the caller may retry.
    #[error("Listing was modified concurrently")]
    Conflict,

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl MarketplaceError {
    /// Build a single-field validation error.
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// The offending field name, when this is a single-field violation.
    pub fn field(&self) -> Option<&str> {
        match self {
            Self::Validation { field, .. } => Some(field),
            _ => None,
        }
    }

    /// Field -> message map for validation errors, for 4xx presentation.
    pub fn field_errors(&self) -> Option<BTreeMap<String, String>> {
        match self {
            Self::Validation { field, message } => {
                let mut map = BTreeMap::new();
                map.insert(field.clone(), message.clone());
                Some(map)
            }
            Self::ValidationFailed(map) => Some(map.clone()),
            _ => None,
        }
    }
}
