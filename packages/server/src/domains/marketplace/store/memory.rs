// In-memory listing store for tests
//
// Implements the full store contract in-process: haversine radius
// filtering, the same ordering rules as the Postgres adapter, and
// version-guarded saves. Tests exercise the engine against this double
// without a database.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use rust_decimal::Decimal;

use crate::common::{ListingId, MarketplaceError, Page, UserId};
use crate::domains::marketplace::geo;
use crate::domains::marketplace::models::Listing;
use crate::domains::marketplace::search::{SortBy, SortDirection};

use super::{ListingStore, StoreQuery};

#[derive(Default)]
pub struct InMemoryListingStore {
    listings: RwLock<HashMap<ListingId, Listing>>,
}

impl InMemoryListingStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored listings (test assertions).
    pub fn len(&self) -> usize {
        self.listings.read().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl ListingStore for InMemoryListingStore {
    async fn save(&self, listing: &Listing) -> Result<Listing, MarketplaceError> {
        let mut listings = self.listings.write().unwrap();

        match listings.get(&listing.id()) {
            Some(stored) if stored.version() != listing.version() => {
                Err(MarketplaceError::Conflict)
            }
            Some(_) => {
                let mut updated = listing.clone();
                updated.set_version(listing.version() + 1);
                listings.insert(updated.id(), updated.clone());
                Ok(updated)
            }
            None => {
                listings.insert(listing.id(), listing.clone());
                Ok(listing.clone())
            }
        }
    }

    async fn find_by_id(&self, id: ListingId) -> Result<Option<Listing>, MarketplaceError> {
        Ok(self.listings.read().unwrap().get(&id).cloned())
    }

    async fn find_by_user(&self, user_id: UserId) -> Result<Vec<Listing>, MarketplaceError> {
        let mut owned: Vec<Listing> = self
            .listings
            .read()
            .unwrap()
            .values()
            .filter(|listing| listing.belongs_to(user_id))
            .cloned()
            .collect();
        owned.sort_by(|a, b| b.created_at().cmp(&a.created_at()));
        Ok(owned)
    }

    async fn search(&self, query: &StoreQuery) -> Result<Page<Listing>, MarketplaceError> {
        let listings = self.listings.read().unwrap();
        let keyword = query.keyword.as_ref().map(|k| k.to_lowercase());

        let mut matches: Vec<Listing> = listings
            .values()
            .filter(|listing| {
                if let Some(keyword) = &keyword {
                    let in_title = listing.title().to_lowercase().contains(keyword);
                    let in_description = listing.description().to_lowercase().contains(keyword);
                    let in_category =
                        listing.category().value().to_lowercase().contains(keyword);
                    if !(in_title || in_description || in_category) {
                        return false;
                    }
                }

                if let Some(listing_type) = query.listing_type {
                    if listing.listing_type() != listing_type {
                        return false;
                    }
                }

                if let Some(category) = &query.category {
                    if listing.category().value() != category {
                        return false;
                    }
                }

                // Compared in the query's native meters; the boundary is
                // inclusive
                if let (Some(center), Some(radius_meters)) = (query.center, query.radius_meters) {
                    if geo::distance_km(center, listing.location()) * 1000.0 > radius_meters {
                        return false;
                    }
                }

                true
            })
            .cloned()
            .collect();

        matches.sort_by(|a, b| {
            if let Some(center) = query.center {
                let da = geo::distance_km(center, a.location());
                let db = geo::distance_km(center, b.location());
                match da.partial_cmp(&db).unwrap_or(Ordering::Equal) {
                    Ordering::Equal => compare_by_sort(a, b, query.sort_by, query.sort_direction),
                    ordering => ordering,
                }
            } else {
                compare_by_sort(a, b, query.sort_by, query.sort_direction)
            }
        });

        let total = matches.len() as i64;
        let offset = query.page.saturating_mul(query.size) as usize;
        let items: Vec<Listing> = matches
            .into_iter()
            .skip(offset)
            .take(query.size as usize)
            .collect();

        Ok(Page::new(items, query.page, query.size, total))
    }

    async fn delete(&self, id: ListingId) -> Result<(), MarketplaceError> {
        self.listings.write().unwrap().remove(&id);
        Ok(())
    }
}

fn compare_by_sort(
    a: &Listing,
    b: &Listing,
    sort_by: SortBy,
    direction: SortDirection,
) -> Ordering {
    let ordering = match sort_by {
        SortBy::CreatedAt => a.created_at().cmp(&b.created_at()),
        SortBy::Title => a.title().cmp(b.title()),
        SortBy::PriceAmount => price_amount(a).cmp(&price_amount(b)),
    };

    match direction {
        SortDirection::Asc => ordering,
        SortDirection::Desc => ordering.reverse(),
    }
}

fn price_amount(listing: &Listing) -> Option<Decimal> {
    listing.price().map(|price| price.amount())
}
