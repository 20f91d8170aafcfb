//! String helpers for building channel names.

pub mod format;
pub mod unique;

// Re-export commonly used functions at module level
pub use format::{capitalize, normalize_ascii, truncate_chars};
pub use unique::MakeUnique;
