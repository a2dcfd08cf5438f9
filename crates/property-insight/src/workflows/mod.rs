pub mod analytics;
pub mod dataset;
pub mod listings;
pub mod valuation;
