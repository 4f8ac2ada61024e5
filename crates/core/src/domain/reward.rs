use crate::time::Quarter;
use chrono::NaiveDate;
use serde::Serialize;

/// Category every card must carry a rule for; resolution falls back to it.
pub const FALLBACK_CATEGORY: &str = "other";

/// Placeholder category for rotating rules whose categories come from the quarterly calendar.
pub const ROTATING_CATEGORY: &str = "rotating";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RewardSchedule {
    Standing,
    /// Active only in `quarter`; every quarter when unset.
    Rotating { quarter: Option<Quarter> },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RewardRule {
    pub category: String,
    pub subcategory: Option<String>,
    /// Percentage for cash back, points-per-dollar for points/miles.
    pub reward_rate: f64,
    pub schedule: RewardSchedule,
    /// Spending cap before the rate reverts. Surfaced, not enforced.
    pub max_spend: Option<f64>,
    pub merchant_restrictions: Option<String>,
    pub activation_required: bool,
}

impl RewardRule {
    pub fn is_rotating(&self) -> bool {
        matches!(self.schedule, RewardSchedule::Rotating { .. })
    }

    pub fn is_active_on(&self, eval_date: NaiveDate) -> bool {
        match self.schedule {
            RewardSchedule::Standing | RewardSchedule::Rotating { quarter: None } => true,
            RewardSchedule::Rotating { quarter: Some(q) } => q == Quarter::of(eval_date),
        }
    }

    /// Merchant category this rule covers, if any.
    ///
    /// A rotating rule filed under [`ROTATING_CATEGORY`] covers its subcategory and whatever the
    /// quarterly calendar lists for the card this quarter (`rotating_categories`).
    pub fn matched_category<'a>(
        &self,
        categories: &'a [String],
        rotating_categories: &[&str],
    ) -> Option<&'a str> {
        if let Some(c) = categories.iter().find(|c| **c == self.category) {
            return Some(c);
        }

        if !(self.is_rotating() && self.category == ROTATING_CATEGORY) {
            return None;
        }

        categories
            .iter()
            .find(|c| {
                self.subcategory.as_deref() == Some(c.as_str())
                    || rotating_categories.contains(&c.as_str())
            })
            .map(String::as_str)
    }

    pub fn applies_on(
        &self,
        eval_date: NaiveDate,
        categories: &[String],
        rotating_categories: &[&str],
    ) -> bool {
        self.is_active_on(eval_date)
            && self
                .matched_category(categories, rotating_categories)
                .is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum OfferTarget {
    Merchant(String),
    Category(String),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LimitedTimeOffer {
    pub target: OfferTarget,
    pub reward_rate: f64,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub min_spend: Option<f64>,
    pub max_reward: Option<f64>,
    pub description: String,
}

impl LimitedTimeOffer {
    /// Closed interval: active on both the start and the end date.
    pub fn is_active_on(&self, eval_date: NaiveDate) -> bool {
        self.start_date <= eval_date && eval_date <= self.end_date
    }

    /// True when the offer's merchant name appears in the classified merchant name.
    pub fn matches_merchant(&self, merchant_name: &str) -> bool {
        match &self.target {
            OfferTarget::Merchant(name) => {
                let needle = name.trim().to_lowercase();
                !needle.is_empty() && merchant_name.to_lowercase().contains(&needle)
            }
            OfferTarget::Category(_) => false,
        }
    }

    pub fn matched_category<'a>(&self, categories: &'a [String]) -> Option<&'a str> {
        match &self.target {
            OfferTarget::Category(category) => categories
                .iter()
                .find(|c| *c == category)
                .map(String::as_str),
            OfferTarget::Merchant(_) => None,
        }
    }
}
