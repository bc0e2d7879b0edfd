//! Worldgen Core - Foundational types for the worldgen client
//!
//! This crate provides the types the other worldgen crates depend on:
//! - `WorldgenError` - Error taxonomy and `Result` alias
//! - `ContentHash` - SHA-256 based content hashing for downloaded artifacts
//! - Timestamp helpers for manifests and per-run output directories

mod error;
mod hash;
mod time;

pub use error::{Result, WorldgenError};
pub use hash::ContentHash;
pub use time::{now_iso8601, run_slug};
