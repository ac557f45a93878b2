//! Shared visitor counter domain primitives.
//!
//! This crate owns the counter identity, the atomic update expression, method
//! routing, and response body contracts. It intentionally excludes AWS SDK and
//! Lambda runtime concerns so handlers can be exercised without live services.

pub mod contract;
pub mod routing;
