//! # CardScan Common Library
//!
//! Shared code for the CardScan price tracker including:
//! - Card identity and normalized key model
//! - Snapshot and comparison record types
//! - Error taxonomy
//! - Atomic JSON persistence and snapshot stores
//! - Configuration loading and data directory resolution
//! - Timestamp helpers

pub mod config;
pub mod error;
pub mod identity;
pub mod records;
pub mod store;
pub mod time;

pub use error::{Error, Result};
pub use identity::CardIdentity;
pub use records::{ComparisonRow, SnapshotRecord};
