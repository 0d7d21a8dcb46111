//! Catalog construction and persistence
//!
//! The catalog is the ordered, deduplicated list of identities a scan
//! prices. It is built once, saved to `catalog.json`, and reused until a
//! rebuild is forced (for example after the rarity filter changes).

pub mod mock_source;
pub mod synthetic;

use cardscan_common::identity::validate_identity;
use cardscan_common::store::{read_json, write_json_atomic};
use cardscan_common::{CardIdentity, Result};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

pub use mock_source::mock_raw_catalog;
pub use synthetic::synthetic_catalog;

/// Validate, filter by rarity, and dedupe raw identities
///
/// Validation failures are fatal. The rarity filter is an exact match on
/// the raw rarity string. Duplicates (same normalized key) keep the first
/// occurrence.
pub fn build_catalog(
    raw: &[CardIdentity],
    allowed_rarities: Option<&[String]>,
) -> Result<Vec<CardIdentity>> {
    let mut seen = HashSet::with_capacity(raw.len());
    let mut catalog = Vec::with_capacity(raw.len());

    for identity in raw {
        validate_identity(identity)?;

        if let Some(allowed) = allowed_rarities {
            if !allowed.iter().any(|r| r == &identity.rarity) {
                continue;
            }
        }

        if !seen.insert(identity.key()) {
            debug!(key = %identity.key(), "Skipping duplicate catalog entry");
            continue;
        }

        catalog.push(identity.clone());
    }

    Ok(catalog)
}

/// `catalog.json` persistence
#[derive(Debug, Clone)]
pub struct CatalogStore {
    path: PathBuf,
}

impl CatalogStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Persisted catalog, or empty when missing or unreadable
    pub fn load(&self) -> Vec<CardIdentity> {
        match read_json::<Vec<CardIdentity>>(&self.path) {
            Ok(catalog) => catalog.unwrap_or_default(),
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "Failed to load catalog");
                Vec::new()
            }
        }
    }

    pub fn save(&self, catalog: &[CardIdentity]) -> Result<()> {
        write_json_atomic(&self.path, catalog)
    }

    /// Reuse the persisted catalog unless it is empty or a rebuild is forced
    pub fn ensure<F>(&self, build: F, force_rebuild: bool) -> Result<Vec<CardIdentity>>
    where
        F: FnOnce() -> Result<Vec<CardIdentity>>,
    {
        if !force_rebuild {
            let existing = self.load();
            if !existing.is_empty() {
                debug!(entries = existing.len(), "Reusing persisted catalog");
                return Ok(existing);
            }
        }

        let catalog = build()?;
        self.save(&catalog)?;
        info!(
            entries = catalog.len(),
            path = %self.path.display(),
            "Catalog built"
        );
        Ok(catalog)
    }
}
