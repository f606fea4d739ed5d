//! Skill swap marketplace: a user directory plus the swap request lifecycle,
//! exposed over an axum router.

pub mod config;
pub mod error;
pub mod marketplace;
pub mod telemetry;
