//! Fixed sample of raw identities used by the command line scan

use cardscan_common::CardIdentity;

pub fn mock_raw_catalog() -> Vec<CardIdentity> {
    vec![
        CardIdentity::new("Lightning Bolt", "LEA", "161", "Common", "Nonfoil"),
        CardIdentity::new("Lightning Bolt", "LEA", "161", "Common", "Foil"),
        CardIdentity::new("Black Lotus", "LEA", "232", "Rare", "Nonfoil"),
        CardIdentity::new("Counterspell", "LEA", "55", "Common", "Nonfoil"),
        CardIdentity::new("Ancestral Recall", "LEA", "48", "Rare", "Nonfoil"),
        CardIdentity::new("Sol Ring", "C21", "263", "Uncommon", "Nonfoil"),
        CardIdentity::new("Sol Ring", "C21", "263", "Uncommon", "Reverse"),
        CardIdentity::new("Mox Ruby", "LEA", "265", "Rare", "Nonfoil").with_promo_id("P001"),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::build_catalog;

    #[test]
    fn test_mock_catalog_is_valid_and_unique() {
        let raw = mock_raw_catalog();
        let catalog = build_catalog(&raw, None).unwrap();
        assert_eq!(catalog.len(), raw.len());
        assert_eq!(catalog.iter().filter(|c| c.promo_id.is_some()).count(), 1);
    }
}
