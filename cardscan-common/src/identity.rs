//! Card identity and normalized lookup key
//!
//! The normalized key is the join column for deduplication, price fetch
//! addressing, and cross-snapshot comparison:
//! `setCode|cardNumber|rarity|finish|name`, each component trimmed,
//! whitespace runs collapsed to a single space, and lowercased.
//!
//! `promo_id` is not part of the key. Two promo variants that differ only
//! by promo id share a key and are treated as the same item.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};

/// Immutable real-world identity of a trackable card variant
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardIdentity {
    pub name: String,
    pub set_code: String,
    pub card_number: String,
    pub rarity: String,
    pub finish: String,
    /// Distinguishes promotional variants; absent otherwise
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub promo_id: Option<String>,
}

impl CardIdentity {
    pub fn new(
        name: impl Into<String>,
        set_code: impl Into<String>,
        card_number: impl Into<String>,
        rarity: impl Into<String>,
        finish: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            set_code: set_code.into(),
            card_number: card_number.into(),
            rarity: rarity.into(),
            finish: finish.into(),
            promo_id: None,
        }
    }

    pub fn with_promo_id(mut self, promo_id: impl Into<String>) -> Self {
        self.promo_id = Some(promo_id.into());
        self
    }

    /// Normalized lookup key for this identity
    pub fn key(&self) -> String {
        card_key(
            &self.set_code,
            &self.card_number,
            &self.rarity,
            &self.finish,
            &self.name,
        )
    }

    /// Copy of this identity with every key component normalized
    pub fn normalized(&self) -> Self {
        Self {
            name: normalize_component(&self.name),
            set_code: normalize_component(&self.set_code),
            card_number: normalize_component(&self.card_number),
            rarity: normalize_component(&self.rarity),
            finish: normalize_component(&self.finish),
            promo_id: self.promo_id.clone(),
        }
    }
}

/// Trim, collapse internal whitespace runs to one space, lowercase
pub fn normalize_component(value: &str) -> String {
    value
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Build the normalized key from raw identity components
pub fn card_key(
    set_code: &str,
    card_number: &str,
    rarity: &str,
    finish: &str,
    name: &str,
) -> String {
    [set_code, card_number, rarity, finish, name]
        .iter()
        .map(|part| normalize_component(part))
        .collect::<Vec<_>>()
        .join("|")
}

/// Reject identities with a required field that is empty after trimming
pub fn validate_identity(identity: &CardIdentity) -> Result<()> {
    let required = [
        ("name", &identity.name),
        ("setCode", &identity.set_code),
        ("cardNumber", &identity.card_number),
        ("rarity", &identity.rarity),
        ("finish", &identity.finish),
    ];

    for (field, value) in required {
        if value.trim().is_empty() {
            return Err(Error::Validation(format!(
                "CardIdentity field '{}' is required and cannot be empty",
                field
            )));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bolt() -> CardIdentity {
        CardIdentity::new("Lightning Bolt", "LEA", "161", "Common", "Nonfoil")
    }

    #[test]
    fn test_key_format() {
        assert_eq!(bolt().key(), "lea|161|common|nonfoil|lightning bolt");
    }

    #[test]
    fn test_key_ignores_case_and_whitespace() {
        let messy = CardIdentity::new(
            "  LIGHTNING \t  bolt ",
            " lea",
            "161 ",
            "COMMON",
            "Non\nFoil",
        );
        let messy_key = messy.key();
        assert_eq!(messy_key, "lea|161|common|non foil|lightning bolt");

        let spaced = CardIdentity::new("Lightning   Bolt", "LEA", "161", "Common", "Nonfoil");
        assert_eq!(spaced.key(), bolt().key());
    }

    #[test]
    fn test_key_is_idempotent_under_normalization() {
        let messy = CardIdentity::new(" Sol   RING", "C21 ", " 263", "Uncommon ", "REVERSE");
        assert_eq!(messy.key(), messy.normalized().key());
        assert_eq!(messy.normalized(), messy.normalized().normalized());
    }

    #[test]
    fn test_promo_id_excluded_from_key() {
        let a = bolt().with_promo_id("P001");
        let b = bolt().with_promo_id("P002");
        assert_eq!(a.key(), b.key());
        assert_eq!(a.key(), bolt().key());
    }

    #[test]
    fn test_validate_rejects_blank_field() {
        let mut card = bolt();
        card.finish = "   ".to_string();
        let err = validate_identity(&card).unwrap_err();
        assert!(matches!(err, Error::Validation(ref msg) if msg.contains("finish")));

        assert!(validate_identity(&bolt()).is_ok());
    }

    #[test]
    fn test_json_shape_is_camel_case_without_absent_promo() {
        let json = serde_json::to_value(bolt()).unwrap();
        assert_eq!(json["setCode"], "LEA");
        assert_eq!(json["cardNumber"], "161");
        assert!(json.get("promoId").is_none());

        let promo: CardIdentity = serde_json::from_str(
            r#"{"name":"Mox Ruby","setCode":"LEA","cardNumber":"265","rarity":"Rare","finish":"Nonfoil","promoId":null}"#,
        )
        .unwrap();
        assert_eq!(promo.promo_id, None);
    }
}
