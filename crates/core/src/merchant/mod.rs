//! Merchant identification: domain match, then keyword match, then a low-confidence guess.

pub mod reference;

pub use reference::MerchantReference;

use crate::catalog::Catalog;
use crate::domain::{Card, FALLBACK_CATEGORY};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    High,
    Medium,
    Low,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MerchantClassification {
    pub name: String,
    /// Candidate categories in match order; never empty. The first one is the primary category.
    pub categories: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subcategory: Option<String>,
    pub confidence: Confidence,
    pub average_transaction: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,
    pub is_checkout: bool,
    pub is_international: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub special_reward_cards: Vec<String>,
}

impl MerchantClassification {
    pub fn category(&self) -> &str {
        self.categories
            .first()
            .map_or(FALLBACK_CATEGORY, String::as_str)
    }

    pub fn boosts_card(&self, card: &Card) -> bool {
        self.special_reward_cards.iter().any(|name| card.is_named(name))
    }
}

/// Classifies `reference` against the catalog. Pure and total: unknown input resolves to
/// `"other"` with low confidence.
pub fn identify(
    reference: &str,
    catalog: &Catalog,
    default_average_transaction: f64,
) -> MerchantClassification {
    let parsed = MerchantReference::parse(reference);
    let is_checkout = parsed.is_checkout();
    let is_international = parsed.looks_international();

    if let Some(host) = parsed.host.as_deref() {
        if let Some(retailer) = catalog.retailer_for_domain(host, &parsed.path) {
            let average_transaction = retailer
                .average_transaction
                .or_else(|| catalog.average_transaction_for(&retailer.category))
                .unwrap_or(default_average_transaction);

            let mut categories = vec![retailer.category.clone()];
            let name = retailer.name.to_lowercase();
            let pattern = retailer.primary_domain_pattern.to_lowercase();
            for category in catalog
                .keywords()
                .match_merchant_categories(&[name.as_str(), pattern.as_str()])
            {
                if !categories.contains(&category) {
                    categories.push(category);
                }
            }

            return MerchantClassification {
                name: retailer.name.clone(),
                categories,
                subcategory: retailer.subcategory.clone(),
                confidence: Confidence::High,
                average_transaction,
                domain: Some(host.to_string()),
                is_checkout,
                is_international,
                special_reward_cards: retailer.special_reward_cards.clone(),
            };
        }
    }

    let mut categories = catalog
        .keywords()
        .match_categories(&[parsed.lowered.as_str(), parsed.path.as_str()]);
    let confidence = if categories.is_empty() {
        categories.push(FALLBACK_CATEGORY.to_string());
        Confidence::Low
    } else {
        Confidence::Medium
    };

    let average_transaction = catalog
        .average_transaction_for(&categories[0])
        .unwrap_or(default_average_transaction);

    MerchantClassification {
        name: guess_name(&parsed),
        categories,
        subcategory: None,
        confidence,
        average_transaction,
        domain: parsed.host.clone(),
        is_checkout,
        is_international,
        special_reward_cards: Vec::new(),
    }
}

fn guess_name(parsed: &MerchantReference) -> String {
    if let Some(label) = parsed.first_label() {
        let mut chars = label.chars();
        if let Some(first) = chars.next() {
            return first.to_uppercase().chain(chars).collect();
        }
    }
    if parsed.raw.is_empty() {
        "Unknown".to_string()
    } else {
        parsed.raw.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::fixtures;

    fn classify(reference: &str) -> MerchantClassification {
        identify(reference, &fixtures::catalog(), 50.0)
    }

    #[test]
    fn domain_match_is_high_confidence() {
        let m = classify("https://www.amazon.com/gp/cart");
        assert_eq!(m.name, "Amazon");
        assert_eq!(m.category(), "online_retail");
        assert_eq!(m.confidence, Confidence::High);
        assert_eq!(m.domain.as_deref(), Some("amazon.com"));
        assert!(m.is_checkout);
        assert_eq!(m.average_transaction, 45.0);
    }

    #[test]
    fn subdomains_and_alternate_domains_match() {
        assert_eq!(classify("smile.amazon.com").name, "Amazon");
        assert_eq!(classify("amazon.co.uk/basket").name, "Amazon");
        assert!(classify("amazon.co.uk").is_international);
    }

    #[test]
    fn label_boundary_is_respected() {
        let m = classify("notamazon.com");
        assert_ne!(m.name, "Amazon");
        assert_ne!(m.confidence, Confidence::High);
    }

    #[test]
    fn domain_match_adds_merchant_named_categories() {
        let m = classify("https://www.amazon.com/gp/cart");
        assert_eq!(m.categories, vec!["online_retail".to_string(), "amazon".to_string()]);

        let m = classify("doordash.com");
        assert_eq!(m.categories, vec!["dining".to_string()]);
    }

    #[test]
    fn marketplace_path_resolves_hosted_brand() {
        let m = classify("https://www.amazon.com/wholefoodsmarket/deals");
        assert_eq!(m.name, "Whole Foods");
        assert_eq!(m.categories, vec!["grocery".to_string()]);
        assert_eq!(m.category(), "grocery");
        assert_eq!(m.subcategory.as_deref(), Some("organic"));
    }

    #[test]
    fn keyword_match_is_medium_confidence() {
        let m = classify("Joe's Pizza Restaurant");
        assert_eq!(m.confidence, Confidence::Medium);
        assert_eq!(m.categories, vec!["dining".to_string()]);
        assert_eq!(m.name, "Joe's Pizza Restaurant");
        // Mean of the dining retailers in the fixture.
        assert_eq!(m.average_transaction, 30.0);
    }

    #[test]
    fn keyword_match_uses_domain_label_for_name() {
        let m = classify("https://luckyhotel.example.jp/book");
        assert_eq!(m.confidence, Confidence::Medium);
        assert_eq!(m.category(), "travel");
        assert_eq!(m.name, "Luckyhotel");
    }

    #[test]
    fn multiple_keyword_categories_are_kept() {
        let m = classify("grocery store and gas station");
        assert!(m.categories.contains(&"grocery".to_string()));
        assert!(m.categories.contains(&"gas".to_string()));
        assert_eq!(m.confidence, Confidence::Medium);
    }

    #[test]
    fn unknown_merchant_defaults_to_other() {
        let m = classify("https://zzqx.io/");
        assert_eq!(m.category(), "other");
        assert_eq!(m.confidence, Confidence::Low);
        assert_eq!(m.name, "Zzqx");
        assert_eq!(m.average_transaction, 50.0);

        for raw in ["", "   ", "???", "東京ラーメン", "\u{1F600}"] {
            let m = classify(raw);
            assert_eq!(m.categories, vec!["other".to_string()]);
            assert_eq!(m.confidence, Confidence::Low);
            assert!(!m.name.is_empty());
        }
    }

    #[test]
    fn special_reward_cards_surface_from_retailer() {
        let catalog = fixtures::catalog();
        let m = identify("amazon.com", &catalog, 50.0);
        let prime = catalog.card("amazon-prime-visa").unwrap();
        let citi = catalog.card("citi-double-cash").unwrap();
        assert!(m.boosts_card(prime));
        assert!(!m.boosts_card(citi));
    }
}
