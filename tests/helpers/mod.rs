//! Test helpers module
//!
//! Database setup (container or TEST_DATABASE_URL) and builders for the
//! entity graph the integration tests need.

pub mod database_helper;
pub mod test_data;

pub use database_helper::*;
pub use test_data::*;
