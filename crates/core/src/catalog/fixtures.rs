//! Small catalog shared by the unit tests.

use super::{Catalog, CatalogDocument};
use serde_json::{json, Value};

pub(crate) fn document() -> Value {
    json!({
        "cards": [
            {
                "id": "chase-sapphire-preferred",
                "name": "Chase Sapphire Preferred",
                "issuer": "Chase",
                "network": "Visa",
                "annual_fee": 95,
                "reward_type": "points",
                "points_value_cents": 1.25,
                "has_foreign_transaction_fee": false,
                "rewards": [
                    {"category": "travel", "subcategory": "chase_portal", "reward_rate": 5,
                     "merchant_restrictions": "Chase Travel portal only"},
                    {"category": "travel", "reward_rate": 2},
                    {"category": "dining", "reward_rate": 3},
                    {"category": "other", "reward_rate": 1}
                ],
                "limited_time_offers": [
                    {"category": "rideshare", "reward_rate": 10,
                     "start_date": "2026-02-01", "end_date": "2026-03-31",
                     "description": "10% back on Lyft rides"}
                ],
                "benefits": [
                    {"name": "Trip cancellation insurance", "kind": "travel"},
                    {"name": "Primary rental car coverage", "kind": "insurance"},
                    {"name": "DoorDash DashPass", "kind": "dining"}
                ]
            },
            {
                "id": "amex-gold",
                "name": "American Express Gold",
                "issuer": "American Express",
                "network": "Amex",
                "annual_fee": 250,
                "annual_credits": 120,
                "reward_type": "points",
                "points_value_cents": 1.0,
                "has_foreign_transaction_fee": false,
                "rewards": [
                    {"category": "dining", "reward_rate": 4},
                    {"category": "grocery", "reward_rate": 4, "max_spend": 25000},
                    {"category": "travel", "subcategory": "flights", "reward_rate": 3},
                    {"category": "other", "reward_rate": 1}
                ],
                "benefits": [
                    {"name": "Uber Cash credits", "kind": "dining"},
                    {"name": "Purchase protection", "kind": "insurance"}
                ]
            },
            {
                "id": "citi-double-cash",
                "name": "Citi Double Cash",
                "issuer": "Citi",
                "network": "Mastercard",
                "rewards": [
                    {"category": "other", "reward_rate": 2}
                ]
            },
            {
                "id": "discover-it-cash-back",
                "name": "Discover it Cash Back",
                "issuer": "Discover",
                "network": "Discover",
                "rewards": [
                    {"category": "rotating", "subcategory": "grocery", "reward_rate": 5,
                     "is_rotating": true, "quarter": 1, "max_spend": 1500, "activation_required": true},
                    {"category": "rotating", "subcategory": "gas", "reward_rate": 5,
                     "is_rotating": true, "quarter": 2, "max_spend": 1500, "activation_required": true},
                    {"category": "other", "reward_rate": 1}
                ],
                "limited_time_offers": [
                    {"merchant_name": "Grubhub", "reward_rate": 1,
                     "start_date": "2026-01-01", "end_date": "2026-12-31",
                     "description": "1% extra at Grubhub"}
                ]
            },
            {
                "id": "chase-freedom-flex",
                "name": "Chase Freedom Flex",
                "issuer": "Chase",
                "network": "Mastercard",
                "rewards": [
                    {"category": "dining", "reward_rate": 3},
                    {"category": "drugstores", "reward_rate": 3},
                    {"category": "rotating", "reward_rate": 5, "is_rotating": true,
                     "max_spend": 1500, "activation_required": true},
                    {"category": "other", "reward_rate": 1}
                ]
            },
            {
                "id": "amazon-prime-visa",
                "name": "Amazon Prime Rewards Visa",
                "issuer": "Chase",
                "network": "Visa",
                "has_foreign_transaction_fee": false,
                "rewards": [
                    {"category": "online_retail", "subcategory": "amazon", "reward_rate": 5},
                    {"category": "online_retail", "reward_rate": 3},
                    {"category": "grocery", "reward_rate": 2},
                    {"category": "other", "reward_rate": 1}
                ]
            }
        ],
        "retailers": [
            {
                "id": "amazon",
                "name": "Amazon",
                "primary_domain_pattern": "amazon.com",
                "category": "online_retail",
                "subcategory": "amazon",
                "average_transaction": 45.0,
                "alternate_domains": ["amazon.co.uk", "amazon.ca", "amazon.de", "primevideo.com"],
                "special_reward_cards": ["Amazon Prime Rewards Visa"]
            },
            {
                "id": "whole-foods",
                "name": "Whole Foods",
                "primary_domain_pattern": "wholefoodsmarket.com",
                "category": "grocery",
                "subcategory": "organic",
                "average_transaction": 80.0,
                "alternate_domains": ["amazon.com/wholefoodsmarket"],
                "special_reward_cards": ["Amazon Prime Rewards Visa"]
            },
            {
                "id": "doordash",
                "name": "DoorDash",
                "primary_domain_pattern": "doordash.com",
                "category": "dining",
                "subcategory": "delivery",
                "average_transaction": 25.0
            },
            {
                "id": "grubhub",
                "name": "Grubhub",
                "primary_domain_pattern": "grubhub.com",
                "category": "dining",
                "subcategory": "delivery",
                "average_transaction": 35.0
            },
            {
                "id": "lyft",
                "name": "Lyft",
                "primary_domain_pattern": "lyft.com",
                "category": "rideshare"
            },
            {
                "id": "shell",
                "name": "Shell",
                "primary_domain_pattern": "shell.com",
                "category": "gas",
                "average_transaction": 40.0
            }
        ]
    })
}

pub(crate) fn catalog() -> Catalog {
    let document: CatalogDocument = serde_json::from_value(document()).unwrap();
    let (catalog, report) = Catalog::from_document(document);
    assert_eq!(report.cards_skipped, 0, "fixture cards must all be valid");
    assert_eq!(report.retailers_skipped, 0, "fixture retailers must all be valid");
    catalog
}
