//! API boundary module
//!
//! Transport-agnostic response types shared by whatever server embeds the
//! services.

pub mod response;

pub use response::{into_response, ApiResponse};
