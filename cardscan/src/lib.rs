//! # CardScan
//!
//! Collectible card price tracker:
//! - Builds a deduplicated catalog (`catalog`)
//! - Prices every entry through a pluggable `PriceSource` with bounded
//!   concurrency and rate-limit retries (`pricing`)
//! - Persists the current snapshot (`scan`) and promotes it to baseline
//!   with first-seen provenance (`promote`)
//! - Compares baseline against current for gainers, $1.00 crossers and
//!   fallen items (`compare`, `report`)

pub mod catalog;
pub mod compare;
pub mod pricing;
pub mod promote;
pub mod report;
pub mod scan;
pub mod scan_log;

pub use compare::{compare_snapshots, Comparison};
pub use pricing::{BatchFetcher, FetchConfig, FetchError, PriceQuote, PriceSource};
pub use promote::{promote, promote_baseline};
pub use report::{assemble_report, generate_report, Report};
pub use scan::{build_snapshot, perform_scan, ScanOutcome};
