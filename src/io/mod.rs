//! File output helpers.

/// CSV export of the request journal.
pub mod export;
