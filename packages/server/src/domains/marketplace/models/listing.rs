use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::common::{ListingId, MarketplaceError, UserId};

use super::{Category, Location, Price};

const TITLE_MIN_LENGTH: usize = 3;
const TITLE_MAX_LENGTH: usize = 100;
const DESCRIPTION_MIN_LENGTH: usize = 10;
const DESCRIPTION_MAX_LENGTH: usize = 2000;
const MAX_IMAGES: usize = 5;

// =============================================================================
// Listing type
// =============================================================================

/// What side of the marketplace a listing sits on.
///
/// `Offer` is a supplier advertising availability; `Demand` is a consumer
/// advertising a want.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ListingType {
    Offer,
    Demand,
}

impl fmt::Display for ListingType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ListingType::Offer => write!(f, "OFFER"),
            ListingType::Demand => write!(f, "DEMAND"),
        }
    }
}

impl FromStr for ListingType {
    type Err = MarketplaceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "OFFER" => Ok(ListingType::Offer),
            "DEMAND" => Ok(ListingType::Demand),
            _ => Err(MarketplaceError::validation(
                "type",
                format!("Invalid listing type: {}", s),
            )),
        }
    }
}

// =============================================================================
// Listing aggregate
// =============================================================================

/// A marketplace listing - the aggregate root of this domain.
///
/// Fields are private so every mutation goes through a validating operation;
/// either a fully valid listing exists or none does. The `version` counter
/// belongs to the persistence adapter, which uses it for optimistic conflict
/// detection when concurrent updates race on the same listing id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Listing {
    id: ListingId,
    user_id: UserId,
    title: String,
    description: String,
    listing_type: ListingType,
    category: Category,
    location: Location,
    price: Option<Price>,
    images: Vec<String>,
    active: bool,
    version: i64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Listing {
    /// Create a new listing, validating all invariants atomically.
    ///
    /// Starts active with an empty image list and a fresh id.
    pub fn create(
        user_id: UserId,
        title: &str,
        description: &str,
        listing_type: ListingType,
        category: Category,
        location: Location,
        price: Option<Price>,
    ) -> Result<Self, MarketplaceError> {
        validate_title(title)?;
        validate_description(description)?;

        let now = Utc::now();

        Ok(Self {
            id: ListingId::new(),
            user_id,
            title: title.trim().to_string(),
            description: description.trim().to_string(),
            listing_type,
            category,
            location,
            price,
            images: Vec::new(),
            active: true,
            version: 0,
            created_at: now,
            updated_at: now,
        })
    }

    // -------------------------------------------------------------------------
    // Mutations
    // -------------------------------------------------------------------------

    /// Update content fields. Each `Some` non-blank argument is validated with
    /// the creation rule and replaces the field; omitted or blank arguments
    /// leave the field untouched, so a partial update never clears anything.
    pub fn update_details(
        &mut self,
        title: Option<&str>,
        description: Option<&str>,
        category: Option<Category>,
        price: Option<Price>,
    ) -> Result<(), MarketplaceError> {
        if let Some(title) = title.filter(|t| !t.trim().is_empty()) {
            validate_title(title)?;
            self.title = title.trim().to_string();
        }

        if let Some(description) = description.filter(|d| !d.trim().is_empty()) {
            validate_description(description)?;
            self.description = description.trim().to_string();
        }

        if let Some(category) = category {
            self.category = category;
        }

        if let Some(price) = price {
            self.price = Some(price);
        }

        self.touch();
        Ok(())
    }

    /// Replace the location. A listing is never left without one.
    pub fn update_location(&mut self, location: Location) {
        self.location = location;
        self.touch();
    }

    /// Append an image reference. Fails on a blank url or when the listing
    /// already carries the maximum of 5 images; the list is unchanged on
    /// failure.
    pub fn add_image(&mut self, image_url: &str) -> Result<(), MarketplaceError> {
        let trimmed = image_url.trim();
        if trimmed.is_empty() {
            return Err(MarketplaceError::validation(
                "images",
                "Image URL cannot be empty",
            ));
        }

        if self.images.len() >= MAX_IMAGES {
            return Err(MarketplaceError::validation(
                "images",
                format!("Cannot add more than {} images", MAX_IMAGES),
            ));
        }

        self.images.push(trimmed.to_string());
        self.touch();
        Ok(())
    }

    pub fn remove_image(&mut self, image_url: &str) {
        self.images.retain(|url| url != image_url);
        self.touch();
    }

    pub fn clear_images(&mut self) {
        self.images.clear();
        self.touch();
    }

    /// Idempotent flag flips.
    pub fn activate(&mut self) {
        self.active = true;
        self.touch();
    }

    pub fn deactivate(&mut self) {
        self.active = false;
        self.touch();
    }

    /// Ownership predicate used by the use-case layer before allowing
    /// mutation or deletion. Ownership never transfers.
    pub fn belongs_to(&self, user_id: UserId) -> bool {
        self.user_id == user_id
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    // -------------------------------------------------------------------------
    // Accessors
    // -------------------------------------------------------------------------

    pub fn id(&self) -> ListingId {
        self.id
    }

    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn listing_type(&self) -> ListingType {
        self.listing_type
    }

    pub fn category(&self) -> &Category {
        &self.category
    }

    pub fn location(&self) -> Location {
        self.location
    }

    pub fn price(&self) -> Option<&Price> {
        self.price.as_ref()
    }

    pub fn images(&self) -> &[String] {
        &self.images
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Optimistic-lock counter, owned by the persistence adapter.
    pub fn version(&self) -> i64 {
        self.version
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    // -------------------------------------------------------------------------
    // Persistence support (crate-internal)
    // -------------------------------------------------------------------------

    /// Rehydrate a listing from stored parts. Only persistence adapters use
    /// this; the parts are trusted to have passed validation on the way in.
    pub(crate) fn from_stored(parts: StoredListing) -> Self {
        Self {
            id: parts.id,
            user_id: parts.user_id,
            title: parts.title,
            description: parts.description,
            listing_type: parts.listing_type,
            category: parts.category,
            location: parts.location,
            price: parts.price,
            images: parts.images,
            active: parts.active,
            version: parts.version,
            created_at: parts.created_at,
            updated_at: parts.updated_at,
        }
    }

    pub(crate) fn set_version(&mut self, version: i64) {
        self.version = version;
    }
}

/// Raw listing parts, as a persistence adapter reads them back.
pub(crate) struct StoredListing {
    pub id: ListingId,
    pub user_id: UserId,
    pub title: String,
    pub description: String,
    pub listing_type: ListingType,
    pub category: Category,
    pub location: Location,
    pub price: Option<Price>,
    pub images: Vec<String>,
    pub active: bool,
    pub version: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// =============================================================================
// Field validation
// =============================================================================

fn validate_title(title: &str) -> Result<(), MarketplaceError> {
    let trimmed = title.trim();

    if trimmed.is_empty() {
        return Err(MarketplaceError::validation(
            "title",
            "Title cannot be empty",
        ));
    }

    let length = trimmed.chars().count();
    if length < TITLE_MIN_LENGTH {
        return Err(MarketplaceError::validation(
            "title",
            format!("Title must be at least {} characters", TITLE_MIN_LENGTH),
        ));
    }

    if length > TITLE_MAX_LENGTH {
        return Err(MarketplaceError::validation(
            "title",
            format!("Title cannot exceed {} characters", TITLE_MAX_LENGTH),
        ));
    }

    Ok(())
}

fn validate_description(description: &str) -> Result<(), MarketplaceError> {
    let trimmed = description.trim();

    if trimmed.is_empty() {
        return Err(MarketplaceError::validation(
            "description",
            "Description cannot be empty",
        ));
    }

    let length = trimmed.chars().count();
    if length < DESCRIPTION_MIN_LENGTH {
        return Err(MarketplaceError::validation(
            "description",
            format!(
                "Description must be at least {} characters",
                DESCRIPTION_MIN_LENGTH
            ),
        ));
    }

    if length > DESCRIPTION_MAX_LENGTH {
        return Err(MarketplaceError::validation(
            "description",
            format!(
                "Description cannot exceed {} characters",
                DESCRIPTION_MAX_LENGTH
            ),
        ));
    }

    Ok(())
}

// =============================================================================
// Tests
// =============================================================================
