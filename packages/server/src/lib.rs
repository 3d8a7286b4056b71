// Ecomama Marketplace - Listing Domain Core
//
// This crate provides the listing domain model and the geospatial/keyword
// search engine for a marketplace matching farmers and consumers.
// It is a library-style domain + query layer: authentication, HTTP transport
// and image storage live in the host service and are not part of this crate.

pub mod common;
pub mod config;
pub mod domains;

pub use config::*;
