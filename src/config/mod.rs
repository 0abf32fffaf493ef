//! Chart configuration.
//!
//! All settings have defaults matching the classic bar chart race look, so an empty JSON
//! object is a valid config.

pub(crate) mod chart;
