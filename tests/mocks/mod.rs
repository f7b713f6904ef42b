//! Mock implementations for integration tests
//!
//! An in-memory [`MockMarketplace`] stands in for the Wildberries API.

pub mod mock_marketplace;

#[allow(unused_imports)]
pub use mock_marketplace::MockMarketplace;
