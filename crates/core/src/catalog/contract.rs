use crate::catalog::keywords::KeywordRow;
use crate::catalog::quarterly::QuarterlyRow;
use crate::domain::{
    Benefit, Card, LimitedTimeOffer, OfferTarget, Retailer, RetailerDomain, RewardRule,
    RewardSchedule, RewardType, FALLBACK_CATEGORY,
};
use crate::time::Quarter;
use anyhow::{ensure, Context};
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeSet;

// Point value assumed for points/miles cards that do not state one.
const DEFAULT_POINTS_VALUE_CENTS: f64 = 1.0;

/// Catalog file as stored. Cards and retailers stay untyped so one bad entry cannot reject
/// the whole document.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CatalogDocument {
    #[serde(default)]
    pub cards: Vec<Value>,
    #[serde(default)]
    pub retailers: Vec<Value>,
    #[serde(default)]
    pub keywords: Option<Vec<KeywordRow>>,
    #[serde(default)]
    pub quarterly_calendar: Option<Vec<QuarterlyRow>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawCard {
    pub id: Option<String>,
    pub name: String,
    pub issuer: String,
    #[serde(default)]
    pub network: Option<String>,
    #[serde(default)]
    pub annual_fee: f64,
    #[serde(default)]
    pub annual_credits: f64,
    #[serde(default)]
    pub points_value_cents: Option<f64>,
    #[serde(default)]
    pub reward_type: RewardType,
    #[serde(default)]
    pub has_foreign_transaction_fee: Option<bool>,
    #[serde(default)]
    pub rewards: Vec<RawRewardRule>,
    #[serde(default)]
    pub limited_time_offers: Vec<RawOffer>,
    #[serde(default)]
    pub benefits: Vec<Benefit>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawRewardRule {
    pub category: String,
    #[serde(default)]
    pub subcategory: Option<String>,
    pub reward_rate: f64,
    #[serde(default)]
    pub is_rotating: bool,
    #[serde(default)]
    pub quarter: Option<u8>,
    #[serde(default)]
    pub max_spend: Option<f64>,
    #[serde(default)]
    pub merchant_restrictions: Option<String>,
    #[serde(default)]
    pub activation_required: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawOffer {
    #[serde(default)]
    pub merchant_name: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    pub reward_rate: f64,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[serde(default)]
    pub min_spend: Option<f64>,
    #[serde(default)]
    pub max_reward: Option<f64>,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawRetailer {
    pub id: Option<String>,
    pub name: String,
    #[serde(alias = "domain_pattern")]
    pub primary_domain_pattern: String,
    pub category: String,
    #[serde(default)]
    pub subcategory: Option<String>,
    #[serde(default)]
    pub average_transaction: Option<f64>,
    #[serde(default)]
    pub alternate_domains: Vec<String>,
    #[serde(default)]
    pub special_reward_cards: Vec<String>,
}

impl RawCard {
    pub fn validate_and_into_card(self) -> anyhow::Result<Card> {
        let name = self.name.trim().to_string();
        ensure!(!name.is_empty(), "card name must be non-empty");

        let id = match self.id.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            Some(id) => id.to_string(),
            None => slugify(&name),
        };
        ensure!(!id.is_empty(), "card id must be non-empty");

        let issuer = self.issuer.trim().to_string();
        ensure!(!issuer.is_empty(), "card {id}: issuer must be non-empty");

        ensure_amount(self.annual_fee, "annual_fee")
            .with_context(|| format!("card {id}"))?;
        ensure_amount(self.annual_credits, "annual_credits")
            .with_context(|| format!("card {id}"))?;

        let points_value_cents = match (self.reward_type.is_points_based(), self.points_value_cents) {
            (_, Some(cents)) => {
                ensure_amount(cents, "points_value_cents").with_context(|| format!("card {id}"))?;
                cents
            }
            (true, None) => DEFAULT_POINTS_VALUE_CENTS,
            (false, None) => 0.0,
        };

        let rewards = self
            .rewards
            .into_iter()
            .enumerate()
            .map(|(i, rule)| {
                rule.validate_and_into_rule()
                    .with_context(|| format!("card {id}: reward #{i}"))
            })
            .collect::<anyhow::Result<Vec<_>>>()?;
        ensure!(
            rewards.iter().any(|r| r.category == FALLBACK_CATEGORY),
            "card {id}: needs a reward rule with category \"{FALLBACK_CATEGORY}\""
        );

        let limited_time_offers = self
            .limited_time_offers
            .into_iter()
            .enumerate()
            .map(|(i, offer)| {
                offer
                    .validate_and_into_offer()
                    .with_context(|| format!("card {id}: offer #{i}"))
            })
            .collect::<anyhow::Result<Vec<_>>>()?;

        let network = self
            .network
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| "Unknown".to_string());

        Ok(Card {
            id,
            name,
            issuer,
            network,
            annual_fee: self.annual_fee,
            annual_credits: self.annual_credits,
            points_value_cents,
            reward_type: self.reward_type,
            has_foreign_transaction_fee: self.has_foreign_transaction_fee.unwrap_or(true),
            rewards,
            limited_time_offers,
            benefits: self.benefits,
        })
    }
}

impl RawRewardRule {
    fn validate_and_into_rule(self) -> anyhow::Result<RewardRule> {
        let category = normalize_label(&self.category);
        ensure!(!category.is_empty(), "category must be non-empty");
        ensure_amount(self.reward_rate, "reward_rate")?;
        if let Some(max_spend) = self.max_spend {
            ensure_amount(max_spend, "max_spend")?;
        }

        let quarter = self
            .quarter
            .map(|q| Quarter::new(q).with_context(|| format!("quarter must be 1..=4 (got {q})")))
            .transpose()?;

        // A quarter on a standing rule carries no meaning and is dropped.
        let schedule = if self.is_rotating {
            RewardSchedule::Rotating { quarter }
        } else {
            RewardSchedule::Standing
        };

        Ok(RewardRule {
            category,
            subcategory: self.subcategory.map(|s| normalize_label(&s)).filter(|s| !s.is_empty()),
            reward_rate: self.reward_rate,
            schedule,
            max_spend: self.max_spend,
            merchant_restrictions: self
                .merchant_restrictions
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty()),
            activation_required: self.activation_required,
        })
    }
}

impl RawOffer {
    fn validate_and_into_offer(self) -> anyhow::Result<LimitedTimeOffer> {
        let merchant = self
            .merchant_name
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());
        let category = self
            .category
            .map(|s| normalize_label(&s))
            .filter(|s| !s.is_empty());

        let target = match (merchant, category) {
            (Some(m), None) => OfferTarget::Merchant(m),
            (None, Some(c)) => OfferTarget::Category(c),
            (Some(_), Some(_)) => anyhow::bail!("offer must target a merchant_name or a category, not both"),
            (None, None) => anyhow::bail!("offer must target a merchant_name or a category"),
        };

        ensure_amount(self.reward_rate, "reward_rate")?;
        ensure!(
            self.start_date <= self.end_date,
            "start_date {} is after end_date {}",
            self.start_date,
            self.end_date
        );
        if let Some(min_spend) = self.min_spend {
            ensure_amount(min_spend, "min_spend")?;
        }
        if let Some(max_reward) = self.max_reward {
            ensure_amount(max_reward, "max_reward")?;
        }

        let description = self
            .description
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| match &target {
                OfferTarget::Merchant(m) => format!("{}% back at {m}", self.reward_rate),
                OfferTarget::Category(c) => format!("{}% back on {c}", self.reward_rate),
            });

        Ok(LimitedTimeOffer {
            target,
            reward_rate: self.reward_rate,
            start_date: self.start_date,
            end_date: self.end_date,
            min_spend: self.min_spend,
            max_reward: self.max_reward,
            description,
        })
    }
}

impl RawRetailer {
    pub fn validate_and_into_retailer(self) -> anyhow::Result<Retailer> {
        let name = self.name.trim().to_string();
        ensure!(!name.is_empty(), "retailer name must be non-empty");

        let primary_domain_pattern = self.primary_domain_pattern.trim().to_lowercase();
        ensure!(
            !primary_domain_pattern.is_empty(),
            "retailer {name}: primary_domain_pattern must be non-empty"
        );

        let category = normalize_label(&self.category);
        ensure!(!category.is_empty(), "retailer {name}: category must be non-empty");

        if let Some(avg) = self.average_transaction {
            ensure_amount(avg, "average_transaction").with_context(|| format!("retailer {name}"))?;
        }

        let mut seen = BTreeSet::new();
        seen.insert(primary_domain_pattern.clone());
        let alternate_domains = self
            .alternate_domains
            .iter()
            .map(|d| d.trim().to_lowercase())
            .filter(|d| !d.is_empty() && seen.insert(d.clone()))
            .map(|domain_pattern| RetailerDomain { domain_pattern })
            .collect();

        Ok(Retailer {
            id: self
                .id
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| slugify(&name)),
            name,
            primary_domain_pattern,
            category,
            subcategory: self.subcategory.map(|s| normalize_label(&s)).filter(|s| !s.is_empty()),
            average_transaction: self.average_transaction,
            alternate_domains,
            special_reward_cards: self
                .special_reward_cards
                .into_iter()
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect(),
        })
    }
}

fn ensure_amount(value: f64, field: &str) -> anyhow::Result<()> {
    ensure!(
        value.is_finite() && value >= 0.0,
        "{field} must be a finite non-negative number (got {value})"
    );
    Ok(())
}

fn normalize_label(s: &str) -> String {
    s.trim().to_lowercase()
}

/// `"Citi Double Cash"` -> `"citi-double-cash"`.
pub(crate) fn slugify(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        if ch.is_alphanumeric() {
            out.extend(ch.to_lowercase());
        } else if !out.is_empty() && !out.ends_with('-') {
            out.push('-');
        }
    }
    out.trim_end_matches('-').to_string()
}
