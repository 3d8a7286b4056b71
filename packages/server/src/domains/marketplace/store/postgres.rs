// Postgres listing store
//
// The listings table stores plain latitude/longitude columns; this adapter
// builds the geography point inside the queries (a GiST expression index
// backs it, see migrations). Optimistic locking rides on the version
// column: an UPDATE guarded by the caller's version that matches no row
// means a concurrent writer won, surfaced as Conflict.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;

use crate::common::{ListingId, MarketplaceError, Page, UserId};
use crate::domains::marketplace::models::listing::StoredListing;
use crate::domains::marketplace::models::{Category, Listing, ListingType, Location, Price};
use crate::domains::marketplace::search::{SortBy, SortDirection};

use super::{ListingStore, StoreQuery};

const COLUMNS: &str = "id, user_id, title, description, listing_type, category, \
                       latitude, longitude, price_amount, price_currency, images, \
                       active, version, created_at, updated_at";

pub struct PgListingStore {
    pool: PgPool,
}

impl PgListingStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct ListingRow {
    id: ListingId,
    user_id: UserId,
    title: String,
    description: String,
    listing_type: String,
    category: String,
    latitude: f64,
    longitude: f64,
    price_amount: Option<Decimal>,
    price_currency: Option<String>,
    images: Vec<String>,
    active: bool,
    version: i64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl ListingRow {
    fn into_listing(self) -> Result<Listing, MarketplaceError> {
        let listing_type: ListingType = self.listing_type.parse()?;
        let category = Category::of(&self.category)?;
        let location = Location::of(self.latitude, self.longitude)?;
        let price = match (self.price_amount, self.price_currency) {
            (Some(amount), Some(currency)) => Some(Price::of(amount, &currency)?),
            _ => None,
        };

        Ok(Listing::from_stored(StoredListing {
            id: self.id,
            user_id: self.user_id,
            title: self.title,
            description: self.description,
            listing_type,
            category,
            location,
            price,
            images: self.images,
            active: self.active,
            version: self.version,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }))
    }
}

#[async_trait]
impl ListingStore for PgListingStore {
    async fn save(&self, listing: &Listing) -> Result<Listing, MarketplaceError> {
        // Version-guarded update first; zero rows means either a new listing
        // or a lost version race.
        let updated = sqlx::query_as::<_, ListingRow>(&format!(
            r#"
            UPDATE listings
            SET title = $2,
                description = $3,
                listing_type = $4,
                category = $5,
                latitude = $6,
                longitude = $7,
                price_amount = $8,
                price_currency = $9,
                images = $10,
                active = $11,
                version = version + 1,
                updated_at = NOW()
            WHERE id = $1 AND version = $12
            RETURNING {COLUMNS}
            "#
        ))
        .bind(listing.id())
        .bind(listing.title())
        .bind(listing.description())
        .bind(listing.listing_type().to_string())
        .bind(listing.category().value())
        .bind(listing.location().latitude())
        .bind(listing.location().longitude())
        .bind(listing.price().map(|price| price.amount()))
        .bind(listing.price().map(|price| price.currency().to_string()))
        .bind(listing.images())
        .bind(listing.is_active())
        .bind(listing.version())
        .fetch_optional(&self.pool)
        .await?;

        if let Some(row) = updated {
            return row.into_listing();
        }

        let exists: Option<i64> = sqlx::query_scalar("SELECT version FROM listings WHERE id = $1")
            .bind(listing.id())
            .fetch_optional(&self.pool)
            .await?;

        if exists.is_some() {
            return Err(MarketplaceError::Conflict);
        }

        let inserted = sqlx::query_as::<_, ListingRow>(&format!(
            r#"
            INSERT INTO listings (
                id, user_id, title, description, listing_type, category,
                latitude, longitude, price_amount, price_currency, images,
                active, version, created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)
            RETURNING {COLUMNS}
            "#
        ))
        .bind(listing.id())
        .bind(listing.user_id())
        .bind(listing.title())
        .bind(listing.description())
        .bind(listing.listing_type().to_string())
        .bind(listing.category().value())
        .bind(listing.location().latitude())
        .bind(listing.location().longitude())
        .bind(listing.price().map(|price| price.amount()))
        .bind(listing.price().map(|price| price.currency().to_string()))
        .bind(listing.images())
        .bind(listing.is_active())
        .bind(listing.version())
        .bind(listing.created_at())
        .bind(listing.updated_at())
        .fetch_one(&self.pool)
        .await?;

        inserted.into_listing()
    }

    async fn find_by_id(&self, id: ListingId) -> Result<Option<Listing>, MarketplaceError> {
        let row = sqlx::query_as::<_, ListingRow>(&format!(
            "SELECT {COLUMNS} FROM listings WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(ListingRow::into_listing).transpose()
    }

    async fn find_by_user(&self, user_id: UserId) -> Result<Vec<Listing>, MarketplaceError> {
        let rows = sqlx::query_as::<_, ListingRow>(&format!(
            "SELECT {COLUMNS} FROM listings WHERE user_id = $1 ORDER BY created_at DESC"
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(ListingRow::into_listing).collect()
    }

    async fn search(&self, query: &StoreQuery) -> Result<Page<Listing>, MarketplaceError> {
        let filters = r#"
            ($1::text IS NULL
                OR title ILIKE '%' || $1 || '%'
                OR description ILIKE '%' || $1 || '%'
                OR category ILIKE '%' || $1 || '%')
            AND ($2::text IS NULL OR listing_type = $2)
            AND ($3::text IS NULL OR category = $3)
            AND ($4::float8 IS NULL OR $5::float8 IS NULL OR $6::float8 IS NULL
                OR ST_DWithin(
                    ST_SetSRID(ST_MakePoint(longitude, latitude), 4326)::geography,
                    ST_SetSRID(ST_MakePoint($5, $4), 4326)::geography,
                    $6))
        "#;

        let order_column = match query.sort_by {
            SortBy::CreatedAt => "created_at",
            SortBy::Title => "title",
            SortBy::PriceAmount => "price_amount",
        };
        let order_direction = match query.sort_direction {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        };

        // Distance-ascending first whenever a center point is present, then
        // the requested sort as tie-break.
        let select_sql = format!(
            r#"
            SELECT {COLUMNS} FROM listings
            WHERE {filters}
            ORDER BY
                CASE WHEN $4::float8 IS NOT NULL AND $5::float8 IS NOT NULL
                    THEN ST_Distance(
                        ST_SetSRID(ST_MakePoint(longitude, latitude), 4326)::geography,
                        ST_SetSRID(ST_MakePoint($5, $4), 4326)::geography)
                    ELSE 0 END,
                {order_column} {order_direction}
            LIMIT $7 OFFSET $8
            "#
        );
        let count_sql = format!("SELECT COUNT(*) FROM listings WHERE {filters}");

        let keyword = query.keyword.clone();
        let listing_type = query.listing_type.map(|t| t.to_string());
        let latitude = query.center.map(|c| c.latitude());
        let longitude = query.center.map(|c| c.longitude());

        let rows = sqlx::query_as::<_, ListingRow>(&select_sql)
            .bind(&keyword)
            .bind(&listing_type)
            .bind(&query.category)
            .bind(latitude)
            .bind(longitude)
            .bind(query.radius_meters)
            .bind(query.size)
            .bind(query.page.saturating_mul(query.size))
            .fetch_all(&self.pool)
            .await?;

        let total: i64 = sqlx::query_scalar(&count_sql)
            .bind(&keyword)
            .bind(&listing_type)
            .bind(&query.category)
            .bind(latitude)
            .bind(longitude)
            .bind(query.radius_meters)
            .fetch_one(&self.pool)
            .await?;

        let listings: Vec<Listing> = rows
            .into_iter()
            .map(ListingRow::into_listing)
            .collect::<Result<_, _>>()?;

        Ok(Page::new(listings, query.page, query.size, total))
    }

    async fn delete(&self, id: ListingId) -> Result<(), MarketplaceError> {
        sqlx::query("DELETE FROM listings WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
