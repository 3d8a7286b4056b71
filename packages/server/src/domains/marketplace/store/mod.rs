// Listing store abstraction
//
// The store owns the heavy lifting of search: text matching, the spatial
// predicate, ordering, and pagination. The domain layer only supplies
// parameters and interprets results. Two implementations live here: the
// Postgres adapter used in production and an in-memory double for tests.

use async_trait::async_trait;

use crate::common::{ListingId, MarketplaceError, Page, UserId};

use super::models::{Listing, ListingType, Location};
use super::search::{SortBy, SortDirection};

pub mod memory;
pub mod postgres;

pub use memory::InMemoryListingStore;
pub use postgres::PgListingStore;

/// Parameters for the store's combined-filter search.
///
/// All filters are optional and AND together. `radius_meters` is in the
/// store's native unit; the engine converts from kilometers. The radius
/// only applies when `center` is present; `center` alone still drives
/// distance-ascending ordering.
#[derive(Debug, Clone)]
pub struct StoreQuery {
    pub keyword: Option<String>,
    pub listing_type: Option<ListingType>,
    pub category: Option<String>,
    pub center: Option<Location>,
    pub radius_meters: Option<f64>,
    /// Zero-based page index; size is already clamped by the engine.
    pub page: i64,
    pub size: i64,
    pub sort_by: SortBy,
    pub sort_direction: SortDirection,
}

/// Persistence boundary for listings.
///
/// `save` enforces optimistic conflict detection: updating a listing whose
/// stored version no longer matches surfaces as `Conflict`, so two
/// concurrent updates never silently lose one of them.
#[async_trait]
pub trait ListingStore: Send + Sync {
    /// Insert a new listing or update an existing one (version-guarded).
    /// Returns the stored state, with the version the store assigned.
    async fn save(&self, listing: &Listing) -> Result<Listing, MarketplaceError>;

    async fn find_by_id(&self, id: ListingId) -> Result<Option<Listing>, MarketplaceError>;

    /// All listings owned by a user, newest first.
    async fn find_by_user(&self, user_id: UserId) -> Result<Vec<Listing>, MarketplaceError>;

    /// Combined-filter search: filtering, ranking, and pagination happen
    /// store-side.
    async fn search(&self, query: &StoreQuery) -> Result<Page<Listing>, MarketplaceError>;

    async fn delete(&self, id: ListingId) -> Result<(), MarketplaceError>;
}
