//! Shared test fixtures for Armory crates.
//!
//! This crate provides catalogs and a reference search for testing.
//! It depends only on `armory-core` so every other crate can use it as a
//! dev-dependency without cycles.
//!
//! - [`fixtures`] - small hand-written catalogs
//! - [`random`] - seeded random catalogs and desired sets
//! - [`oracle`] - exhaustive reference search
//!
//! # Usage
//!
//! ```toml
//! [dev-dependencies]
//! armory-test = { workspace = true }
//! ```

pub mod fixtures;
pub mod oracle;
pub mod random;

pub use fixtures::{hunter_catalog, ATTACK, EVADE, GUARD};
pub use oracle::{brute_force, Loadout};
pub use random::RandomCatalog;
