//! Remote directory access.
//!
//! `RepeaterSource` is the seam between the core and whatever downloads
//! repeater records. `ApiClient` implements it against the RepeaterBook
//! export API; tests substitute an in-process fake.

pub mod client;
pub mod error;

use async_trait::async_trait;

use crate::models::{ExportQuery, Repeater};

pub use client::{ApiClient, ExportRequest};
pub use error::ApiError;

/// Something that can download the repeaters matching an export query.
#[async_trait]
pub trait RepeaterSource: Send + Sync {
    async fn download(&self, query: &ExportQuery) -> Result<Vec<Repeater>, ApiError>;
}
