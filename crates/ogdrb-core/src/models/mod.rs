//! Data models for repeaters, export selections, zones and codeplugs.
//!
//! - `Repeater`, `RepeaterId`: directory records and their natural key, plus
//!   the RepeaterBook wire types (`ExportResponse`, `RawRepeater`)
//! - `Country`, `ExportQuery`, `RegionFilter`: what to download and keep
//! - `Zone`: a named circle drawn by the user
//! - `AnalogChannel`, `DigitalChannel`, `Channel`, `Limits`: OpenGD77 channels
//! - `Codeplug`, `CodeplugZone`: the export package

pub mod channel;
pub mod codeplug;
pub mod query;
pub mod repeater;
pub mod zone;

pub use channel::{AnalogChannel, Bandwidth, Channel, DigitalChannel, Limits, TalkerAlias};
pub use codeplug::{Codeplug, CodeplugZone, ANALOG_ZONE, DIGITAL_ZONE};
pub use query::{Country, ExportQuery, RegionFilter, US_COUNTRY_CODE, US_COUNTRY_NAME};
pub use repeater::{
    ExportResponse, FmBandwidth, Membership, OperationalStatus, RawRepeater, Repeater, RepeaterId,
    Tone,
};
pub use zone::Zone;
