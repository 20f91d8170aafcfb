//! Core of ogdrb: turns circular zones into an OpenGD77 codeplug of the
//! RepeaterBook repeaters inside them.
//!
//! The pipeline runs leaf-first through these modules:
//! - `services::split` and `services::fetch` download a country/state
//!   selection into the local `cache::RepeaterStore`
//! - `services::resolve` cuts the store down to each zone's circle
//! - `convert` turns repeaters into uniquely named channels and zones
//! - `export::Exporter` ties the steps together behind up-front validation

pub mod api;
pub mod cache;
pub mod config;
pub mod convert;
pub mod error;
pub mod export;
pub mod geo;
pub mod models;
pub mod services;
pub mod utils;
pub mod zones;

#[cfg(test)]
mod testing;

pub use api::{ApiClient, ApiError, RepeaterSource};
pub use cache::RepeaterStore;
pub use config::Config;
pub use error::{Error, Result};
pub use export::Exporter;
pub use models::{Codeplug, Country, ExportQuery, Limits, Zone};
pub use services::{RepeaterFetcher, ZoneResolver};
pub use zones::{ZoneBook, ZoneCommand, ZoneDraft};
