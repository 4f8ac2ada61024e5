use serde::Serialize;

/// Alternate domain or `host/path` pattern owned by a retailer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RetailerDomain {
    pub domain_pattern: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Retailer {
    pub id: String,
    pub name: String,
    pub primary_domain_pattern: String,
    pub category: String,
    pub subcategory: Option<String>,
    pub average_transaction: Option<f64>,
    pub alternate_domains: Vec<RetailerDomain>,
    /// Card names that earn the special merchant boost here.
    pub special_reward_cards: Vec<String>,
}

