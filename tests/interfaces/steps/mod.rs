//! Step definitions.

pub mod registry;
pub mod reporting;
