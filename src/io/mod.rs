//! File plumbing: CSV row sources and sinks, with transparent compression.

pub mod compression;
pub mod csv;
