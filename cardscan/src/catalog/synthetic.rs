//! Synthetic catalog generation for benchmarks and load tests

use cardscan_common::CardIdentity;
use rand::distributions::WeightedIndex;
use rand::prelude::*;
use std::collections::HashSet;

const CARD_NAMES: [&str; 30] = [
    "Lightning Bolt", "Black Lotus", "Counterspell", "Ancestral Recall", "Sol Ring",
    "Mox Ruby", "Mox Sapphire", "Mox Pearl", "Mox Emerald", "Mox Jet",
    "Time Walk", "Demonic Tutor", "Dark Ritual", "Giant Growth", "Healing Salve",
    "Fireball", "Disenchant", "Terror", "Shatter", "Stone Rain",
    "Swords to Plowshares", "Path to Exile", "Brainstorm", "Ponder", "Preordain",
    "Birds of Paradise", "Llanowar Elves", "Elvish Mystic", "Noble Hierarch", "Deathrite Shaman",
];

const SET_CODES: [&str; 30] = [
    "LEA", "LEB", "UNL", "REV", "4ED", "5ED", "6ED", "7ED", "8ED", "9ED",
    "ARN", "ATQ", "LEG", "DRK", "FEM", "ICE", "HML", "ALL", "MIR", "VIS",
    "WTH", "TMP", "STH", "EXO", "USG", "ULG", "UDS", "MMQ", "NEM", "PCY",
];

const FINISHES: [&str; 4] = ["Nonfoil", "Foil", "Reverse", "Holo"];

/// Rarity distribution: commons dominate, promos are rare
pub const RARITY_WEIGHTS: [(&str, u32); 6] = [
    ("Common", 50),
    ("Uncommon", 30),
    ("Rare", 15),
    ("Rare Holo", 3),
    ("Reverse", 1),
    ("Promo", 1),
];

const MAX_DRAWS_PER_ENTRY: usize = 100;

/// Generate `n` identities with unique normalized keys
///
/// Promo-rarity entries carry a `promo_id`.
pub fn synthetic_catalog<R: Rng>(n: usize, rng: &mut R) -> Vec<CardIdentity> {
    let rarity_dist = match WeightedIndex::new(RARITY_WEIGHTS.iter().map(|(_, w)| *w)) {
        Ok(dist) => dist,
        Err(_) => return Vec::new(),
    };

    let mut catalog = Vec::with_capacity(n);
    let mut used_keys = HashSet::with_capacity(n);

    for index in 0..n {
        let mut identity = draw_identity(rng, &rarity_dist);
        let mut draws = 1;

        while used_keys.contains(&identity.key()) {
            if draws >= MAX_DRAWS_PER_ENTRY {
                // Combination space exhausted; disambiguate by position
                identity.card_number = format!("{}-{}", identity.card_number, index);
                break;
            }
            identity = draw_identity(rng, &rarity_dist);
            draws += 1;
        }

        used_keys.insert(identity.key());
        catalog.push(identity);
    }

    catalog
}

fn draw_identity<R: Rng>(rng: &mut R, rarity_dist: &WeightedIndex<u32>) -> CardIdentity {
    let name = CARD_NAMES[rng.gen_range(0..CARD_NAMES.len())];
    let set_code = SET_CODES[rng.gen_range(0..SET_CODES.len())];
    let card_number = format!("{:03}", rng.gen_range(1..=999));
    let rarity = RARITY_WEIGHTS[rarity_dist.sample(rng)].0;
    let finish = FINISHES[rng.gen_range(0..FINISHES.len())];

    let identity = CardIdentity::new(name, set_code, card_number, rarity, finish);
    if rarity == "Promo" {
        identity.with_promo_id(format!("P{}", rng.gen_range(1..=999)))
    } else {
        identity
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;

    #[test]
    fn test_generates_requested_count_with_unique_keys() {
        let mut rng = StdRng::seed_from_u64(7);
        let catalog = synthetic_catalog(2_000, &mut rng);

        assert_eq!(catalog.len(), 2_000);
        let keys: HashSet<String> = catalog.iter().map(CardIdentity::key).collect();
        assert_eq!(keys.len(), 2_000);
    }

    #[test]
    fn test_rarity_distribution_is_weighted() {
        let mut rng = StdRng::seed_from_u64(42);
        let catalog = synthetic_catalog(5_000, &mut rng);

        let commons = catalog.iter().filter(|c| c.rarity == "Common").count();
        let rares = catalog.iter().filter(|c| c.rarity == "Rare").count();
        assert!(commons > rares * 2, "commons={} rares={}", commons, rares);
    }

    #[test]
    fn test_promos_carry_promo_id() {
        let mut rng = StdRng::seed_from_u64(3);
        let catalog = synthetic_catalog(3_000, &mut rng);

        for card in &catalog {
            assert_eq!(card.rarity == "Promo", card.promo_id.is_some());
        }
    }

    #[test]
    fn test_same_seed_same_catalog() {
        let a = synthetic_catalog(100, &mut StdRng::seed_from_u64(1));
        let b = synthetic_catalog(100, &mut StdRng::seed_from_u64(1));
        assert_eq!(a, b);
    }
}
