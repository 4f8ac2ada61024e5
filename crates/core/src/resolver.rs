//! Picks the single best reward for one card at one merchant on one date.
//!
//! Precedence, first branch with a result wins:
//! 1. an active limited-time offer naming the merchant (regardless of rate),
//! 2. the best active limited-time offer on one of the merchant's categories,
//! 3. the best rule matching category and subcategory exactly,
//! 4. the best rule matching a category, rotating rules gated by quarter and calendar,
//! 5. the card's `"other"` rule.
//!
//! The special merchant boost is added before rates are compared in branches 2-4.

use crate::catalog::Catalog;
use crate::domain::money::format_dollars;
use crate::domain::{Card, LimitedTimeOffer, RewardRule};
use crate::error::ResolveError;
use crate::merchant::MerchantClassification;
use crate::time::Quarter;
use chrono::NaiveDate;
use serde::Serialize;

/// Percentage points added when the retailer lists the card as a special reward card.
pub const SPECIAL_MERCHANT_BOOST: f64 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RewardSource {
    MerchantOffer,
    CategoryOffer,
    Subcategory,
    Category,
    Fallback,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedReward {
    /// Final rate including any special merchant boost.
    pub rate: f64,
    pub category: String,
    pub subcategory: Option<String>,
    pub reason: String,
    pub source: RewardSource,
    pub offer_end_date: Option<NaiveDate>,
    /// Cap on the reward of a limited-time offer.
    pub max_reward: Option<f64>,
    pub boosted: bool,
}

impl ResolvedReward {
    pub fn is_limited_time(&self) -> bool {
        matches!(
            self.source,
            RewardSource::MerchantOffer | RewardSource::CategoryOffer
        )
    }
}

pub struct RewardResolver<'a> {
    catalog: &'a Catalog,
    merchant: &'a MerchantClassification,
    eval_date: NaiveDate,
}

impl<'a> RewardResolver<'a> {
    pub fn new(
        catalog: &'a Catalog,
        merchant: &'a MerchantClassification,
        eval_date: NaiveDate,
    ) -> Self {
        Self {
            catalog,
            merchant,
            eval_date,
        }
    }

    pub fn resolve(&self, card: &Card) -> Result<ResolvedReward, ResolveError> {
        let boost = if self.merchant.boosts_card(card) {
            SPECIAL_MERCHANT_BOOST
        } else {
            0.0
        };

        let resolved = self
            .merchant_offer(card, boost)
            .or_else(|| self.category_offer(card, boost))
            .or_else(|| self.subcategory_rule(card, boost))
            .or_else(|| self.category_rule(card, boost));

        let mut resolved = match resolved {
            Some(r) => r,
            None => self.fallback(card, boost)?,
        };

        if !resolved.rate.is_finite() || resolved.rate < 0.0 {
            return Err(ResolveError::InvalidRate {
                card_id: card.id.clone(),
                rate: resolved.rate,
            });
        }

        if resolved.boosted {
            resolved.reason.push_str(&format!(
                " (+{} special merchant bonus)",
                card.reward_type.describe_rate(SPECIAL_MERCHANT_BOOST)
            ));
        }
        Ok(resolved)
    }

    fn merchant_offer(&self, card: &Card, boost: f64) -> Option<ResolvedReward> {
        let offer = self
            .catalog
            .limited_offers_for(card, self.eval_date)
            .into_iter()
            .filter(|o| o.matches_merchant(&self.merchant.name))
            .fold(None, best_offer)?;

        Some(self.from_offer(
            offer,
            self.merchant.category().to_string(),
            boost,
            RewardSource::MerchantOffer,
        ))
    }

    fn category_offer(&self, card: &Card, boost: f64) -> Option<ResolvedReward> {
        let (offer, category) = self
            .catalog
            .limited_offers_for(card, self.eval_date)
            .into_iter()
            .filter_map(|o| o.matched_category(&self.merchant.categories).map(|c| (o, c)))
            .filter(|(o, _)| o.reward_rate + boost > 0.0)
            .fold(None, |best: Option<(&LimitedTimeOffer, &str)>, cand| match best {
                Some(b) if b.0.reward_rate >= cand.0.reward_rate => Some(b),
                _ => Some(cand),
            })?;

        Some(self.from_offer(
            offer,
            category.to_string(),
            boost,
            RewardSource::CategoryOffer,
        ))
    }

    fn subcategory_rule(&self, card: &Card, boost: f64) -> Option<ResolvedReward> {
        let subcategory = self.merchant.subcategory.as_deref()?;
        let rule = self
            .catalog
            .rewards_for(card)
            .iter()
            .filter(|r| r.is_active_on(self.eval_date))
            .filter(|r| r.subcategory.as_deref() == Some(subcategory))
            .filter(|r| self.merchant.categories.contains(&r.category))
            .filter(|r| r.reward_rate + boost > 0.0)
            .fold(None, best_rule)?;

        let rate = rule.reward_rate + boost;
        let mut reason = format!(
            "{} on {} - {subcategory}",
            card.reward_type.describe_rate(rate),
            rule.category
        );
        append_rule_terms(&mut reason, rule);

        Some(ResolvedReward {
            rate,
            category: rule.category.clone(),
            subcategory: Some(subcategory.to_string()),
            reason,
            source: RewardSource::Subcategory,
            offer_end_date: None,
            max_reward: None,
            boosted: boost > 0.0,
        })
    }

    fn category_rule(&self, card: &Card, boost: f64) -> Option<ResolvedReward> {
        let rotating = self
            .catalog
            .quarterly()
            .categories_for(card, Quarter::of(self.eval_date));

        let (rule, category) = self
            .catalog
            .rewards_for(card)
            .iter()
            .filter(|r| r.is_active_on(self.eval_date))
            .filter_map(|r| {
                r.matched_category(&self.merchant.categories, &rotating)
                    .map(|c| (r, c))
            })
            .filter(|(r, _)| r.reward_rate + boost > 0.0)
            .fold(None, |best: Option<(&RewardRule, &str)>, cand| match best {
                Some(b) if b.0.reward_rate >= cand.0.reward_rate => Some(b),
                _ => Some(cand),
            })?;

        let rate = rule.reward_rate + boost;
        let described = card.reward_type.describe_rate(rate);
        let mut reason = if rule.is_rotating() {
            format!("{described} on {category} this quarter")
        } else {
            format!("{described} on {category}")
        };
        append_rule_terms(&mut reason, rule);

        Some(ResolvedReward {
            rate,
            category: category.to_string(),
            subcategory: self.merchant.subcategory.clone(),
            reason,
            source: RewardSource::Category,
            offer_end_date: None,
            max_reward: None,
            boosted: boost > 0.0,
        })
    }

    fn fallback(&self, card: &Card, boost: f64) -> Result<ResolvedReward, ResolveError> {
        let rule = card
            .fallback_rule()
            .ok_or_else(|| ResolveError::MissingFallback {
                card_id: card.id.clone(),
            })?;

        let rate = rule.reward_rate + boost;
        let mut reason = format!("{} on all purchases", card.reward_type.describe_rate(rate));
        append_rule_terms(&mut reason, rule);

        Ok(ResolvedReward {
            rate,
            category: rule.category.clone(),
            subcategory: None,
            reason,
            source: RewardSource::Fallback,
            offer_end_date: None,
            max_reward: None,
            boosted: boost > 0.0,
        })
    }

    fn from_offer(
        &self,
        offer: &LimitedTimeOffer,
        category: String,
        boost: f64,
        source: RewardSource,
    ) -> ResolvedReward {
        let mut reason = format!(
            "Limited time offer: {} (expires {})",
            offer.description, offer.end_date
        );
        if let Some(min_spend) = offer.min_spend {
            reason.push_str(&format!(" (min spend {})", format_dollars(min_spend)));
        }
        if let Some(max_reward) = offer.max_reward {
            reason.push_str(&format!(" (max reward {})", format_dollars(max_reward)));
        }

        ResolvedReward {
            rate: offer.reward_rate + boost,
            category,
            subcategory: self.merchant.subcategory.clone(),
            reason,
            source,
            offer_end_date: Some(offer.end_date),
            max_reward: offer.max_reward,
            boosted: boost > 0.0,
        }
    }
}

// Ties keep the earlier entry so catalog order decides.
fn best_offer<'o>(
    best: Option<&'o LimitedTimeOffer>,
    cand: &'o LimitedTimeOffer,
) -> Option<&'o LimitedTimeOffer> {
    match best {
        Some(b) if b.reward_rate >= cand.reward_rate => Some(b),
        _ => Some(cand),
    }
}

fn best_rule<'r>(best: Option<&'r RewardRule>, cand: &'r RewardRule) -> Option<&'r RewardRule> {
    match best {
        Some(b) if b.reward_rate >= cand.reward_rate => Some(b),
        _ => Some(cand),
    }
}

fn append_rule_terms(reason: &mut String, rule: &RewardRule) {
    if let Some(max_spend) = rule.max_spend {
        reason.push_str(&format!(" (up to {}/year)", format_dollars(max_spend)));
    }
    if let Some(restrictions) = &rule.merchant_restrictions {
        reason.push_str(&format!(" ({restrictions})"));
    }
    if rule.activation_required {
        reason.push_str(" - activation required");
    }
}
