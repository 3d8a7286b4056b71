//! End-to-end search behavior against the in-memory store.
//!
//! Listings are created through the command surface and queried through the
//! engine, the same wiring a transport would use.

use std::sync::Arc;
use std::time::Duration;

use rust_decimal::Decimal;

use marketplace_core::common::{MarketplaceError, UserId};
use marketplace_core::domains::marketplace::{
    CreateListing, ListingCommands, ListingType, SearchEngine, SearchRequest,
};
use marketplace_core::domains::marketplace::store::InMemoryListingStore;

struct Harness {
    commands: ListingCommands,
    engine: SearchEngine,
    store: Arc<InMemoryListingStore>,
}

fn harness() -> Harness {
    let store = Arc::new(InMemoryListingStore::new());
    Harness {
        commands: ListingCommands::new(store.clone()),
        engine: SearchEngine::new(store.clone()),
        store,
    }
}

fn listing_at(
    user_id: UserId,
    title: &str,
    latitude: f64,
    longitude: f64,
) -> CreateListing {
    CreateListing {
        user_id,
        title: title.into(),
        description: format!("{} sold directly by a local producer", title),
        listing_type: ListingType::Offer,
        category: "Vegetables".into(),
        latitude,
        longitude,
        price_amount: None,
        price_currency: None,
        images: Vec::new(),
    }
}

// One degree of latitude is roughly 111.2 km.

#[tokio::test]
async fn radius_search_returns_only_nearby_nearest_first() {
    let h = harness();
    let user = UserId::new();

    h.commands
        .create(listing_at(user, "At the center", 0.0, 0.0))
        .await
        .unwrap();
    h.commands
        .create(listing_at(user, "One kilometer away", 0.01, 0.0))
        .await
        .unwrap();
    h.commands
        .create(listing_at(user, "Ten kilometers away", 0.09, 0.0))
        .await
        .unwrap();

    let page = h
        .engine
        .nearby(0.0, 0.0, 5.0, None, 0, 20)
        .await
        .unwrap();

    assert_eq!(page.total_elements, 2);
    assert_eq!(page.items[0].listing.title(), "At the center");
    assert_eq!(page.items[1].listing.title(), "One kilometer away");

    // Each hit carries its distance, ascending
    let d0 = page.items[0].distance_km.unwrap();
    let d1 = page.items[1].distance_km.unwrap();
    assert!(d0 < 0.001);
    assert!((d1 - 1.112).abs() < 0.01);
}

#[tokio::test]
async fn radius_boundary_is_inclusive() {
    use marketplace_core::domains::marketplace::geo::distance_km;
    use marketplace_core::domains::marketplace::Location;

    let h = harness();
    let user = UserId::new();

    // 0.5 degrees of latitude is about 55.6 km out
    h.commands
        .create(listing_at(user, "At the fence", 0.5, 0.0))
        .await
        .unwrap();

    let exact = distance_km(
        Location::of(0.0, 0.0).unwrap(),
        Location::of(0.5, 0.0).unwrap(),
    );

    // A radius of exactly the listing's distance still includes it
    let at_boundary = h.engine.nearby(0.0, 0.0, exact, None, 0, 20).await.unwrap();
    assert_eq!(at_boundary.total_elements, 1);

    let just_inside = h
        .engine
        .nearby(0.0, 0.0, exact - 0.001, None, 0, 20)
        .await
        .unwrap();
    assert!(just_inside.is_empty());
}

#[tokio::test]
async fn nearby_and_search_agree_on_distances() {
    let h = harness();
    let user = UserId::new();
    h.commands
        .create(listing_at(user, "One kilometer away", 0.01, 0.0))
        .await
        .unwrap();

    let via_nearby = h.engine.nearby(0.0, 0.0, 5.0, None, 0, 20).await.unwrap();
    let via_search = h
        .engine
        .search(&SearchRequest {
            latitude: Some(0.0),
            longitude: Some(0.0),
            radius_km: Some(5.0),
            ..SearchRequest::default()
        })
        .await
        .unwrap();

    assert_eq!(
        via_nearby.items[0].distance_km,
        via_search.items[0].distance_km
    );
}

#[tokio::test]
async fn search_without_coordinates_sorts_newest_first() {
    let h = harness();
    let user = UserId::new();

    h.commands
        .create(listing_at(user, "Older listing", 0.0, 0.0))
        .await
        .unwrap();
    tokio::time::sleep(Duration::from_millis(5)).await;
    h.commands
        .create(listing_at(user, "Newer listing", 10.0, 10.0))
        .await
        .unwrap();

    let page = h.engine.search(&SearchRequest::default()).await.unwrap();

    assert_eq!(page.items[0].listing.title(), "Newer listing");
    assert_eq!(page.items[1].listing.title(), "Older listing");
    // No viewer coordinates, no distances
    assert!(page.items.iter().all(|hit| hit.distance_km.is_none()));
}

#[tokio::test]
async fn filters_combine_with_and_semantics() {
    let h = harness();
    let user = UserId::new();

    h.commands
        .create(listing_at(user, "Tomato crates", 0.0, 0.0))
        .await
        .unwrap();

    let mut demand = listing_at(user, "Tomato wanted", 0.0, 0.0);
    demand.listing_type = ListingType::Demand;
    h.commands.create(demand).await.unwrap();

    let mut other_category = listing_at(user, "Tomato-red bicycle", 0.0, 0.0);
    other_category.category = "Transport".into();
    h.commands.create(other_category).await.unwrap();

    // Keyword alone matches all three, case-insensitively
    let by_keyword = h
        .engine
        .search(&SearchRequest {
            keyword: Some("tomato".into()),
            ..SearchRequest::default()
        })
        .await
        .unwrap();
    assert_eq!(by_keyword.total_elements, 3);

    // Keyword AND type AND category narrows to one
    let narrowed = h
        .engine
        .search(&SearchRequest {
            keyword: Some("tomato".into()),
            listing_type: Some(ListingType::Offer),
            category: Some("Vegetables".into()),
            ..SearchRequest::default()
        })
        .await
        .unwrap();
    assert_eq!(narrowed.total_elements, 1);
    assert_eq!(narrowed.items[0].listing.title(), "Tomato crates");
}

#[tokio::test]
async fn keyword_matches_description_and_category() {
    let h = harness();
    let user = UserId::new();
    h.commands
        .create(listing_at(user, "Crate of produce", 0.0, 0.0))
        .await
        .unwrap();

    // "producer" appears in the generated description
    let by_description = h
        .engine
        .search(&SearchRequest {
            keyword: Some("producer".into()),
            ..SearchRequest::default()
        })
        .await
        .unwrap();
    assert_eq!(by_description.total_elements, 1);

    let by_category = h
        .engine
        .search(&SearchRequest {
            keyword: Some("vegeta".into()),
            ..SearchRequest::default()
        })
        .await
        .unwrap();
    assert_eq!(by_category.total_elements, 1);
}

#[tokio::test]
async fn invalid_search_parameters_are_rejected() {
    let h = harness();

    let err = h
        .engine
        .search(&SearchRequest {
            keyword: Some("a".into()),
            ..SearchRequest::default()
        })
        .await
        .unwrap_err();
    assert_eq!(err.field(), Some("keyword"));

    let err = h
        .engine
        .nearby(0.0, 0.0, 1000.5, None, 0, 20)
        .await
        .unwrap_err();
    assert_eq!(err.field(), Some("radiusKm"));

    let err = h
        .engine
        .nearby(91.0, 0.0, 5.0, None, 0, 20)
        .await
        .unwrap_err();
    assert_eq!(err.field(), Some("latitude"));
}

#[tokio::test]
async fn pagination_reports_totals_and_clamps() {
    let h = harness();
    let user = UserId::new();

    for i in 0..5 {
        h.commands
            .create(listing_at(user, &format!("Listing number {}", i), 0.0, 0.0))
            .await
            .unwrap();
        tokio::time::sleep(Duration::from_millis(2)).await;
    }

    let first = h
        .engine
        .search(&SearchRequest {
            size: 2,
            ..SearchRequest::default()
        })
        .await
        .unwrap();
    assert_eq!(first.len(), 2);
    assert_eq!(first.total_elements, 5);
    assert_eq!(first.total_pages, 3);

    let last = h
        .engine
        .search(&SearchRequest {
            page: 2,
            size: 2,
            ..SearchRequest::default()
        })
        .await
        .unwrap();
    assert_eq!(last.len(), 1);

    let beyond = h
        .engine
        .search(&SearchRequest {
            page: 10,
            size: 2,
            ..SearchRequest::default()
        })
        .await
        .unwrap();
    assert!(beyond.is_empty());
    assert_eq!(beyond.total_elements, 5);

    // Negative page and zero size are normalized, not rejected
    let normalized = h
        .engine
        .search(&SearchRequest {
            page: -1,
            size: 0,
            ..SearchRequest::default()
        })
        .await
        .unwrap();
    assert_eq!(normalized.page, 0);
    assert_eq!(normalized.size, 20);

    // An absurd page index yields an empty page rather than overflowing
    // the offset
    let absurd = h
        .engine
        .search(&SearchRequest {
            page: i64::MAX,
            size: 2,
            ..SearchRequest::default()
        })
        .await
        .unwrap();
    assert!(absurd.is_empty());
    assert_eq!(absurd.total_elements, 5);
}

#[tokio::test]
async fn stale_update_conflicts() {
    use marketplace_core::domains::marketplace::ListingStore;

    let h = harness();
    let user = UserId::new();
    let created = h
        .commands
        .create(listing_at(user, "Contended listing", 0.0, 0.0))
        .await
        .unwrap();

    // First writer bumps the version
    h.store.save(&created).await.unwrap();

    // Second writer still holds the old version
    let err = h.store.save(&created).await.unwrap_err();
    assert!(matches!(err, MarketplaceError::Conflict));
}

#[tokio::test]
async fn updated_listing_is_searchable_under_new_title() {
    use marketplace_core::domains::marketplace::UpdateListing;

    let h = harness();
    let user = UserId::new();
    let listing = h
        .commands
        .create(listing_at(user, "Winter squash", 0.0, 0.0))
        .await
        .unwrap();

    h.commands
        .update(
            listing.id(),
            user,
            UpdateListing {
                title: Some("Butternut squash".into()),
                price_amount: Some(Decimal::new(499, 2)),
                price_currency: Some("EUR".into()),
                ..UpdateListing::default()
            },
        )
        .await
        .unwrap();

    let found = h
        .engine
        .search(&SearchRequest {
            keyword: Some("butternut".into()),
            ..SearchRequest::default()
        })
        .await
        .unwrap();
    assert_eq!(found.total_elements, 1);
    assert_eq!(
        found.items[0].listing.price().unwrap().amount(),
        Decimal::new(499, 2)
    );
}
