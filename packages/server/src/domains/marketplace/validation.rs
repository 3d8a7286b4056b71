//! Cross-field request validation.
//!
//! Rules that span multiple fields or need context the value objects don't
//! have: ownership, fail-fast creation checks, and search-parameter sanity.
//! Single-field shape rules live on the value objects themselves.

use std::collections::BTreeMap;

use crate::common::{MarketplaceError, UserId};

use super::models::Listing;

const KEYWORD_MIN_LENGTH: usize = 2;
const MAX_RADIUS_KM: f64 = 1000.0;

/// Fail with `PermissionDenied` unless `user_id` owns the listing.
///
/// Callers look the listing up first, so a non-owner learns the listing
/// exists before this rejects them. That matches the original API behavior
/// and is kept deliberately.
pub fn validate_ownership(listing: &Listing, user_id: UserId) -> Result<(), MarketplaceError> {
    if !listing.belongs_to(user_id) {
        return Err(MarketplaceError::PermissionDenied);
    }
    Ok(())
}

/// Cheap fail-fast checks before any value-object construction.
pub fn validate_listing_for_creation(
    title: &str,
    description: &str,
) -> Result<(), MarketplaceError> {
    if title.trim().is_empty() {
        return Err(MarketplaceError::validation(
            "title",
            "Title cannot be empty",
        ));
    }

    if description.trim().is_empty() {
        return Err(MarketplaceError::validation(
            "description",
            "Description cannot be empty",
        ));
    }

    Ok(())
}

/// Sanity-check optional search parameters.
///
/// A keyword, if present, must be at least 2 characters after trimming;
/// a radius, if present, must be in (0, 1000] km.
pub fn validate_search_parameters(
    keyword: Option<&str>,
    radius_km: Option<f64>,
) -> Result<(), MarketplaceError> {
    if let Some(keyword) = keyword {
        if keyword.trim().chars().count() < KEYWORD_MIN_LENGTH {
            return Err(MarketplaceError::validation(
                "keyword",
                "Search keyword must be at least 2 characters",
            ));
        }
    }

    if let Some(radius_km) = radius_km {
        if !(radius_km > 0.0) {
            return Err(MarketplaceError::validation(
                "radiusKm",
                "Search radius must be positive",
            ));
        }

        if radius_km > MAX_RADIUS_KM {
            return Err(MarketplaceError::validation(
                "radiusKm",
                "Search radius cannot exceed 1000 km",
            ));
        }
    }

    Ok(())
}

/// Validate every creation field at once, accumulating a field -> message
/// map instead of stopping at the first violation. Used by transports that
/// want to show all form errors in one response.
pub fn validate_all_fields(
    title: &str,
    description: &str,
    category: &str,
    latitude: Option<f64>,
    longitude: Option<f64>,
) -> Result<(), MarketplaceError> {
    let mut errors: BTreeMap<String, String> = BTreeMap::new();

    let title_len = title.trim().chars().count();
    if title.trim().is_empty() {
        errors.insert("title".into(), "Title cannot be empty".into());
    } else if title_len < 3 {
        errors.insert("title".into(), "Title must be at least 3 characters".into());
    } else if title_len > 100 {
        errors.insert("title".into(), "Title cannot exceed 100 characters".into());
    }

    let description_len = description.trim().chars().count();
    if description.trim().is_empty() {
        errors.insert("description".into(), "Description cannot be empty".into());
    } else if description_len < 10 {
        errors.insert(
            "description".into(),
            "Description must be at least 10 characters".into(),
        );
    } else if description_len > 2000 {
        errors.insert(
            "description".into(),
            "Description cannot exceed 2000 characters".into(),
        );
    }

    if category.trim().is_empty() {
        errors.insert("category".into(), "Category cannot be empty".into());
    }

    match latitude {
        None => {
            errors.insert("latitude".into(), "Latitude cannot be null".into());
        }
        Some(lat) if !(-90.0..=90.0).contains(&lat) => {
            errors.insert(
                "latitude".into(),
                "Latitude must be between -90 and 90".into(),
            );
        }
        _ => {}
    }

    match longitude {
        None => {
            errors.insert("longitude".into(), "Longitude cannot be null".into());
        }
        Some(lon) if !(-180.0..=180.0).contains(&lon) => {
            errors.insert(
                "longitude".into(),
                "Longitude must be between -180 and 180".into(),
            );
        }
        _ => {}
    }

    if !errors.is_empty() {
        return Err(MarketplaceError::ValidationFailed(errors));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domains::marketplace::models::{Category, ListingType, Location};

    fn listing_owned_by(owner: UserId) -> Listing {
        Listing::create(
            owner,
            "Fresh tomatoes",
            "Organic tomatoes straight from the greenhouse",
            ListingType::Offer,
            Category::of("Vegetables").unwrap(),
            Location::of(0.0, 0.0).unwrap(),
            None,
        )
        .unwrap()
    }

    #[test]
    fn test_ownership() {
        let owner = UserId::new();
        let listing = listing_owned_by(owner);

        assert!(validate_ownership(&listing, owner).is_ok());
        assert!(matches!(
            validate_ownership(&listing, UserId::new()),
            Err(MarketplaceError::PermissionDenied)
        ));
    }

    #[test]
    fn test_creation_fail_fast() {
        assert!(validate_listing_for_creation("Tomatoes", "A fine description").is_ok());
        assert_eq!(
            validate_listing_for_creation("  ", "A fine description")
                .unwrap_err()
                .field(),
            Some("title")
        );
        assert_eq!(
            validate_listing_for_creation("Tomatoes", "")
                .unwrap_err()
                .field(),
            Some("description")
        );
    }

    #[test]
    fn test_keyword_minimum_length() {
        assert!(validate_search_parameters(Some("a"), None).is_err());
        assert!(validate_search_parameters(Some(" a "), None).is_err());
        assert!(validate_search_parameters(Some("ab"), None).is_ok());
        assert!(validate_search_parameters(None, None).is_ok());
    }

    #[test]
    fn test_radius_bounds() {
        assert!(validate_search_parameters(None, Some(0.0)).is_err());
        assert!(validate_search_parameters(None, Some(-5.0)).is_err());
        assert!(validate_search_parameters(None, Some(0.1)).is_ok());
        assert!(validate_search_parameters(None, Some(1000.0)).is_ok());
        assert!(validate_search_parameters(None, Some(1000.1)).is_err());
        assert!(validate_search_parameters(None, Some(f64::NAN)).is_err());
    }

    #[test]
    fn test_validate_all_fields_accumulates() {
        let err = validate_all_fields("ab", "short", "", Some(95.0), None).unwrap_err();
        let MarketplaceError::ValidationFailed(map) = err else {
            panic!("expected ValidationFailed");
        };
        assert!(map.contains_key("title"));
        assert!(map.contains_key("description"));
        assert!(map.contains_key("category"));
        assert!(map.contains_key("latitude"));
        assert!(map.contains_key("longitude"));
    }

    #[test]
    fn test_validate_all_fields_passes() {
        assert!(validate_all_fields(
            "Fresh tomatoes",
            "Organic tomatoes straight from the greenhouse",
            "Vegetables",
            Some(40.0),
            Some(-3.7),
        )
        .is_ok());
    }
}
