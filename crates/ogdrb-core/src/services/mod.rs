//! Export pipeline services.
//!
//! - `compat`: the OpenGD77 compatibility predicate
//! - `split`: turning a selection into download queries
//! - `fetch`: concurrent downloads into the local store
//! - `resolve`: zone circles to compatible repeaters

pub mod compat;
pub mod fetch;
pub mod resolve;
pub mod split;

pub use compat::is_compatible;
pub use fetch::RepeaterFetcher;
pub use resolve::{UniRepeater, ZoneRepeaters, ZoneResolver};
pub use split::build_export_queries;
