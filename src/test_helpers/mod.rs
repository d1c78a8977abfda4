//! Helpers shared by unit tests across the crate.

pub(crate) mod tracing;
