//! Conversion of resolved repeaters into an OpenGD77 codeplug.

pub mod channel;
pub mod organize;

pub use channel::{make_name, to_channels, to_channels_with_limits};
pub use organize::{organize, organize_with_limits};
