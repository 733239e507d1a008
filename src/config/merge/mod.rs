//! Config composition: source ordering and defaults.

pub mod policy;
pub mod service;
