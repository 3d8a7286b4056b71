//! Typed ID definitions for the marketplace domain entities.
//!
//! # Example
//!
//! ```rust
//! use marketplace_core::common::{ListingId, UserId};
//!
//! // These are incompatible types - the compiler prevents mixing them up
//! let listing_id: ListingId = ListingId::new();
//! let user_id: UserId = UserId::new();
//!
//! // This would be a compile error:
//! // let wrong: ListingId = user_id;
//! ```

// Re-export the core Id type
pub use super::id::Id;

// ============================================================================
// Entity marker types
// ============================================================================

/// Marker type for Listing aggregates.
pub struct Listing;

/// Marker type for User entities (listing owners; managed by the auth module).
pub struct User;

// ============================================================================
// Type aliases - the primary API
// ============================================================================

/// Typed ID for Listing aggregates.
pub type ListingId = Id<Listing>;

/// Typed ID for User entities.
pub type UserId = Id<User>;
