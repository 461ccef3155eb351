//! Port adapters
//!
//! Production deployments implement [`crate::ports::BillingPort`]
//! against the real persistence service; the in-memory adapter here
//! backs tests and local demos.

pub mod memory;
