//! `maas-core`: foundational types shared by every `maas-*` crate.
//!
//! This crate has no `maas-*` dependencies.
//!
//! # What lives here
//!
//! | Module     | Contents                                              |
//! |------------|-------------------------------------------------------|
//! | [`ids`]    | `NodeId`, `EdgeId`                                    |
//! | [`geo`]    | `GeoPoint`                                            |
//! | [`rng`]    | `SimRng`: the seedable random source threaded through|
//! |            | feature sampling, dropout, and scenario designation   |
//! | [`config`] | `load_toml` for serde-backed configuration files      |
//! | [`error`]  | `MaasError`, `MaasResult`                             |

pub mod config;
pub mod error;
pub mod geo;
pub mod ids;
pub mod rng;

#[cfg(test)]
mod tests;

// ── Re-exports ────────────────────────────────────────────────────────────────

pub use config::load_toml;
pub use error::{MaasError, MaasResult};
pub use geo::GeoPoint;
pub use ids::{EdgeId, NodeId};
pub use rng::SimRng;
