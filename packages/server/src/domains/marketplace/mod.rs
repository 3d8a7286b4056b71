pub mod commands;
pub mod geo;
pub mod models;
pub mod search;
pub mod store;
pub mod validation;

// Re-export the command surface
pub use commands::{CreateListing, ListingCommands, UpdateListing};

// Re-export models (domain models)
pub use models::listing::{Listing, ListingType};
pub use models::{Category, Location, Price};

// Re-export search types
pub use search::{SearchEngine, SearchHit, SearchRequest, SortBy, SortDirection};

// Re-export the store abstraction
pub use store::{ListingStore, StoreQuery};
