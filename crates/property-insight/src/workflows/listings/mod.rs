mod catalog;
mod filter;

pub use catalog::{ListingCatalog, ListingRecord, PropertyListing};
pub use filter::{ListingFilter, ListingQuery};
