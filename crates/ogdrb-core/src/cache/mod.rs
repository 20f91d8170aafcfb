//! Local repeater store.
//!
//! This module provides the `RepeaterStore`, an upsert-by-natural-key store
//! of downloaded repeaters, optionally persisted as JSON so repeated exports
//! can reuse earlier downloads. Reads take predicates (`StoreQuery`): a
//! bounding box, a country/state restriction and the compatibility filter.

pub mod store;

pub use store::{CachedData, RepeaterStore, StoreQuery};
