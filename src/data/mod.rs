//! Results document ingestion.
//!
//! The document maps `YY_MM_DD` date keys to one result list per test, where each result is a
//! `(team, time, commit)` triple. [`parse_records`] flattens it into one
//! [`PerformanceRecord`](crate::PerformanceRecord) per roster team per date.

pub(crate) mod document;
pub(crate) mod parse;
