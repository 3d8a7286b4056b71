//! Combined-filter listing search.
//!
//! One engine turns a set of optional filters (keyword, type, category,
//! radius around a point) into a ranked, paginated result set. The store
//! does the heavy filtering; the engine normalizes parameters, converts
//! kilometers to the store's native meters, and attaches a per-result
//! distance for client display whenever viewer coordinates are present.
//!
//! Both entry points (`search` and `nearby`) run through the same path, so
//! identical inputs always produce identical distances and ranking.

use std::str::FromStr;
use std::sync::Arc;

use tracing::info;

use crate::common::{MarketplaceError, Page};

use super::geo;
use super::models::{Listing, ListingType, Location};
use super::store::{ListingStore, StoreQuery};
use super::validation::validate_search_parameters;

const DEFAULT_PAGE_SIZE: i64 = 20;
const MAX_PAGE_SIZE: i64 = 100;

// =============================================================================
// Sorting
// =============================================================================

/// Sortable listing fields. Wire names follow the API ("createdAt", ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortBy {
    #[default]
    CreatedAt,
    Title,
    PriceAmount,
}

impl FromStr for SortBy {
    type Err = MarketplaceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "createdAt" => Ok(SortBy::CreatedAt),
            "title" => Ok(SortBy::Title),
            "priceAmount" => Ok(SortBy::PriceAmount),
            _ => Err(MarketplaceError::validation(
                "sortBy",
                format!("Invalid sort field: {}", s),
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    Asc,
    #[default]
    Desc,
}

impl FromStr for SortDirection {
    type Err = MarketplaceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("ASC") {
            Ok(SortDirection::Asc)
        } else if s.eq_ignore_ascii_case("DESC") {
            Ok(SortDirection::Desc)
        } else {
            Err(MarketplaceError::validation(
                "sortDirection",
                format!("Invalid sort direction: {}", s),
            ))
        }
    }
}

// =============================================================================
// Request / result types
// =============================================================================

/// An advanced-search request. All filters are optional and AND together.
///
/// Paging and sorting are normalized (clamped/defaulted) before any
/// validation runs, so out-of-range paging never fails a request.
#[derive(Debug, Clone)]
pub struct SearchRequest {
    /// Case-insensitive substring match against title, description or
    /// category.
    pub keyword: Option<String>,
    pub listing_type: Option<ListingType>,
    /// Exact category match.
    pub category: Option<String>,
    /// Viewer coordinates; both must be present to take effect.
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    /// Radius filter around the viewer, in kilometers.
    pub radius_km: Option<f64>,
    /// Zero-based page index.
    pub page: i64,
    pub size: i64,
    pub sort_by: Option<SortBy>,
    pub sort_direction: Option<SortDirection>,
}

impl Default for SearchRequest {
    fn default() -> Self {
        Self {
            keyword: None,
            listing_type: None,
            category: None,
            latitude: None,
            longitude: None,
            radius_km: None,
            page: 0,
            size: DEFAULT_PAGE_SIZE,
            sort_by: None,
            sort_direction: None,
        }
    }
}

/// One ranked search result. `distance_km` is present exactly when the
/// request carried viewer coordinates.
#[derive(Debug, Clone)]
pub struct SearchHit {
    pub listing: Listing,
    pub distance_km: Option<f64>,
}

// =============================================================================
// Engine
// =============================================================================

/// Composes optional predicates into one ranked, paged store query.
///
/// Read-only: no listing is mutated during search.
pub struct SearchEngine {
    store: Arc<dyn ListingStore>,
}

impl SearchEngine {
    pub fn new(store: Arc<dyn ListingStore>) -> Self {
        Self { store }
    }

    /// Full advanced search: keyword AND type AND category AND radius.
    ///
    /// When viewer coordinates are supplied, results are ordered by
    /// ascending distance with the requested sort as tie-break; otherwise
    /// purely by the requested sort (created-at descending by default).
    pub async fn search(
        &self,
        request: &SearchRequest,
    ) -> Result<Page<SearchHit>, MarketplaceError> {
        info!(
            listing_type = ?request.listing_type,
            category = ?request.category,
            keyword = ?request.keyword,
            "Searching listings with filters"
        );

        // Clamping happens before validation, never after
        let page = clamp_page(request.page);
        let size = clamp_size(request.size);
        let sort_by = request.sort_by.unwrap_or_default();
        let sort_direction = request.sort_direction.unwrap_or_default();

        validate_search_parameters(request.keyword.as_deref(), request.radius_km)?;

        let viewer = match (request.latitude, request.longitude) {
            (Some(latitude), Some(longitude)) => Some(Location::of(latitude, longitude)?),
            _ => None,
        };

        // The store's native distance unit is meters
        let radius_meters = match (viewer, request.radius_km) {
            (Some(_), Some(radius_km)) => Some(radius_km * 1000.0),
            _ => None,
        };

        let query = StoreQuery {
            keyword: request.keyword.as_ref().map(|k| k.trim().to_string()),
            listing_type: request.listing_type,
            category: request.category.clone(),
            center: viewer,
            radius_meters,
            page,
            size,
            sort_by,
            sort_direction,
        };

        let listings = self.store.search(&query).await?;

        // Reported distance is always recomputed here, independent of how
        // the store filtered
        Ok(listings.map(|listing| SearchHit {
            distance_km: viewer.map(|v| geo::distance_km(v, listing.location())),
            listing,
        }))
    }

    /// Pure-radius "nearby" query: coordinates + radius + optional type.
    ///
    /// Shares the engine with `search`, so distances are identical for
    /// identical inputs.
    pub async fn nearby(
        &self,
        latitude: f64,
        longitude: f64,
        radius_km: f64,
        listing_type: Option<ListingType>,
        page: i64,
        size: i64,
    ) -> Result<Page<SearchHit>, MarketplaceError> {
        info!(
            latitude,
            longitude, radius_km, listing_type = ?listing_type,
            "Searching nearby listings"
        );

        // Reject bad coordinates before anything else
        Location::of(latitude, longitude)?;

        let request = SearchRequest {
            latitude: Some(latitude),
            longitude: Some(longitude),
            radius_km: Some(radius_km),
            listing_type,
            page,
            size,
            ..SearchRequest::default()
        };

        self.search(&request).await
    }
}

fn clamp_page(page: i64) -> i64 {
    page.max(0)
}

fn clamp_size(size: i64) -> i64 {
    if size < 1 {
        DEFAULT_PAGE_SIZE
    } else if size > MAX_PAGE_SIZE {
        MAX_PAGE_SIZE
    } else {
        size
    }
}
