//! Listing use cases.
//!
//! Thin orchestration over the aggregate and the store: look up, authorize,
//! mutate through the aggregate's validating operations, persist. All
//! ownership checks happen here, after the lookup, so a missing listing is
//! always reported as not found rather than as a permission problem.

use std::sync::Arc;

use rust_decimal::Decimal;
use tracing::info;

use crate::common::{ListingId, MarketplaceError, UserId};

use super::geo;
use super::models::{Category, Listing, ListingType, Location, Price};
use super::search::SearchHit;
use super::store::ListingStore;
use super::validation::{validate_listing_for_creation, validate_ownership};

/// Input for creating a listing. Price is optional and only takes effect
/// when both amount and currency are present.
#[derive(Debug, Clone)]
pub struct CreateListing {
    pub user_id: UserId,
    pub title: String,
    pub description: String,
    pub listing_type: ListingType,
    pub category: String,
    pub latitude: f64,
    pub longitude: f64,
    pub price_amount: Option<Decimal>,
    pub price_currency: Option<String>,
    pub images: Vec<String>,
}

/// Input for a partial update. `None` fields are left untouched.
#[derive(Debug, Clone, Default)]
pub struct UpdateListing {
    pub title: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub price_amount: Option<Decimal>,
    pub price_currency: Option<String>,
}

/// The listing command surface: create, update, delete, image management
/// and status flips, plus the owner-facing reads.
pub struct ListingCommands {
    store: Arc<dyn ListingStore>,
}

impl ListingCommands {
    pub fn new(store: Arc<dyn ListingStore>) -> Self {
        Self { store }
    }

    pub async fn create(&self, command: CreateListing) -> Result<Listing, MarketplaceError> {
        info!(user_id = %command.user_id, title = %command.title, "Creating listing");

        validate_listing_for_creation(&command.title, &command.description)?;

        let category = Category::of(&command.category)?;
        let location = Location::of(command.latitude, command.longitude)?;
        let price = resolve_price(command.price_amount, command.price_currency.as_deref())?;

        let mut listing = Listing::create(
            command.user_id,
            &command.title,
            &command.description,
            command.listing_type,
            category,
            location,
            price,
        )?;

        for image_url in &command.images {
            listing.add_image(image_url)?;
        }

        self.store.save(&listing).await
    }

    pub async fn update(
        &self,
        listing_id: ListingId,
        user_id: UserId,
        command: UpdateListing,
    ) -> Result<Listing, MarketplaceError> {
        info!(listing_id = %listing_id, user_id = %user_id, "Updating listing");

        let mut listing = self.load(listing_id).await?;
        validate_ownership(&listing, user_id)?;

        let category = command.category.as_deref().map(Category::of).transpose()?;
        let price = resolve_price(command.price_amount, command.price_currency.as_deref())?;

        listing.update_details(
            command.title.as_deref(),
            command.description.as_deref(),
            category,
            price,
        )?;

        if let (Some(latitude), Some(longitude)) = (command.latitude, command.longitude) {
            listing.update_location(Location::of(latitude, longitude)?);
        }

        self.store.save(&listing).await
    }

    pub async fn delete(
        &self,
        listing_id: ListingId,
        user_id: UserId,
    ) -> Result<(), MarketplaceError> {
        info!(listing_id = %listing_id, user_id = %user_id, "Deleting listing");

        let listing = self.load(listing_id).await?;
        validate_ownership(&listing, user_id)?;

        self.store.delete(listing_id).await
    }

    pub async fn add_image(
        &self,
        listing_id: ListingId,
        user_id: UserId,
        image_url: &str,
    ) -> Result<Listing, MarketplaceError> {
        let mut listing = self.load(listing_id).await?;
        validate_ownership(&listing, user_id)?;

        listing.add_image(image_url)?;
        self.store.save(&listing).await
    }

    pub async fn remove_image(
        &self,
        listing_id: ListingId,
        user_id: UserId,
        image_url: &str,
    ) -> Result<Listing, MarketplaceError> {
        let mut listing = self.load(listing_id).await?;
        validate_ownership(&listing, user_id)?;

        listing.remove_image(image_url);
        self.store.save(&listing).await
    }

    pub async fn set_active(
        &self,
        listing_id: ListingId,
        user_id: UserId,
        active: bool,
    ) -> Result<Listing, MarketplaceError> {
        info!(listing_id = %listing_id, active, "Changing listing status");

        let mut listing = self.load(listing_id).await?;
        validate_ownership(&listing, user_id)?;

        if active {
            listing.activate();
        } else {
            listing.deactivate();
        }

        self.store.save(&listing).await
    }

    pub async fn get(&self, listing_id: ListingId) -> Result<Listing, MarketplaceError> {
        self.load(listing_id).await
    }

    /// Fetch a listing, attaching its distance from the viewer when both
    /// coordinates are supplied.
    pub async fn get_with_distance(
        &self,
        listing_id: ListingId,
        viewer_latitude: Option<f64>,
        viewer_longitude: Option<f64>,
    ) -> Result<SearchHit, MarketplaceError> {
        let listing = self.load(listing_id).await?;

        let distance_km = match (viewer_latitude, viewer_longitude) {
            (Some(latitude), Some(longitude)) => {
                let viewer = Location::of(latitude, longitude)?;
                Some(geo::distance_km(viewer, listing.location()))
            }
            _ => None,
        };

        Ok(SearchHit {
            listing,
            distance_km,
        })
    }

    /// All listings owned by a user, newest first.
    pub async fn get_user_listings(
        &self,
        user_id: UserId,
    ) -> Result<Vec<Listing>, MarketplaceError> {
        self.store.find_by_user(user_id).await
    }

    async fn load(&self, listing_id: ListingId) -> Result<Listing, MarketplaceError> {
        self.store
            .find_by_id(listing_id)
            .await?
            .ok_or(MarketplaceError::NotFound)
    }
}

fn resolve_price(
    amount: Option<Decimal>,
    currency: Option<&str>,
) -> Result<Option<Price>, MarketplaceError> {
    match (amount, currency) {
        (Some(amount), Some(currency)) => Ok(Some(Price::of(amount, currency)?)),
        _ => Ok(None),
    }
}
