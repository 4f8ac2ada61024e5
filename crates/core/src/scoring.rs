//! Turns a resolved rate into money: estimated reward, fee notes, relevant benefits and
//! break-even spend.

use crate::domain::money::{format_dollars, round_cents};
use crate::domain::{BenefitKind, Card};
use serde::Serialize;

// Above this many purchases to recoup the annual fee the response carries a note.
const OFFSET_NOTE_THRESHOLD: f64 = 12.0;
const INSURANCE_RELEVANT_ABOVE: f64 = 500.0;
const MAX_BENEFITS: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum FeeOffset {
    NoFee,
    FullyOffset,
    PartiallyOffset { effective_fee: f64 },
    NotOffset,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RewardEstimate {
    /// Dollar value of the reward, rounded to cents.
    pub estimated_reward: f64,
    /// Points or miles earned; `None` for cash back.
    pub points_earned: Option<f64>,
    pub purchases_to_offset: Option<u64>,
    pub fee_offset: FeeOffset,
    pub fee_note: Option<String>,
}

pub fn score(card: &Card, rate: f64, amount: f64) -> RewardEstimate {
    let (estimated, points_earned) = if card.reward_type.is_points_based() {
        let points = amount * rate / 100.0;
        (points * card.points_value_cents / 100.0, Some(points))
    } else {
        (amount * rate / 100.0, None)
    };
    let estimated_reward = round_cents(estimated);

    let mut notes = Vec::new();

    let purchases_to_offset = (card.annual_fee > 0.0 && estimated_reward > 0.0)
        .then(|| (card.annual_fee / estimated_reward).round() as u64);
    if let Some(n) = purchases_to_offset.filter(|n| *n as f64 > OFFSET_NOTE_THRESHOLD) {
        notes.push(format!(
            "About {n} purchases like this to offset the {} annual fee",
            format_dollars(card.annual_fee)
        ));
    }

    let fee_offset = fee_offset(card);
    match fee_offset {
        FeeOffset::FullyOffset => notes.push(format!(
            "Annual credits of {} fully offset the {} fee",
            format_dollars(card.annual_credits),
            format_dollars(card.annual_fee)
        )),
        FeeOffset::PartiallyOffset { effective_fee } => notes.push(format!(
            "Annual credits of {} bring the effective fee to {}",
            format_dollars(card.annual_credits),
            format_dollars(effective_fee)
        )),
        FeeOffset::NoFee | FeeOffset::NotOffset => {}
    }

    RewardEstimate {
        estimated_reward,
        points_earned,
        purchases_to_offset,
        fee_offset,
        fee_note: (!notes.is_empty()).then(|| notes.join("; ")),
    }
}

impl RewardEstimate {
    /// Applies a limited-time offer's reward cap.
    pub fn capped(mut self, max_reward: Option<f64>) -> Self {
        if let Some(cap) = max_reward {
            if self.estimated_reward > cap {
                self.estimated_reward = round_cents(cap);
            }
        }
        self
    }
}

pub fn fee_offset(card: &Card) -> FeeOffset {
    if card.annual_fee <= 0.0 {
        FeeOffset::NoFee
    } else if card.annual_credits <= 0.0 {
        FeeOffset::NotOffset
    } else if card.effective_annual_fee() <= 0.0 {
        FeeOffset::FullyOffset
    } else {
        FeeOffset::PartiallyOffset {
            effective_fee: card.effective_annual_fee(),
        }
    }
}

/// Up to two benefit names worth showing for this purchase, most relevant first.
pub fn relevant_benefits(card: &Card, categories: &[String], amount: f64) -> Vec<String> {
    let in_category = |name: &str| categories.iter().any(|c| c == name);
    let retail = categories
        .iter()
        .any(|c| c.contains("retail") || c == "electronics");

    let mut scored: Vec<(u8, &str)> = card
        .benefits
        .iter()
        .filter_map(|b| {
            let relevance = match b.kind {
                BenefitKind::Travel if in_category("travel") => 2,
                BenefitKind::Dining if in_category("dining") => 2,
                BenefitKind::Shopping if retail => 2,
                BenefitKind::Insurance if amount > INSURANCE_RELEVANT_ABOVE => 1,
                _ => 0,
            };
            (relevance > 0).then_some((relevance, b.name.as_str()))
        })
        .collect();

    // Stable: equal relevance keeps catalog order.
    scored.sort_by(|a, b| b.0.cmp(&a.0));
    scored
        .into_iter()
        .take(MAX_BENEFITS)
        .map(|(_, name)| name.to_string())
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryBreakEven {
    pub category: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subcategory: Option<String>,
    pub reward_rate: f64,
    /// Yearly spend in this category whose extra rewards over the base rate cover the fee.
    pub spend_needed: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BreakEven {
    pub card_id: String,
    pub annual_fee: f64,
    pub annual_credits: f64,
    pub effective_annual_fee: f64,
    pub base_rate: f64,
    /// Yearly spend at the base rate that covers the fee.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub general_spend_needed: Option<f64>,
    pub categories: Vec<CategoryBreakEven>,
}

pub fn break_even(card: &Card) -> BreakEven {
    let effective_fee = card.effective_annual_fee();
    let base_rate = card.fallback_rule().map_or(0.0, |r| r.reward_rate);

    let (general_spend_needed, mut categories) = if effective_fee > 0.0 {
        let general = (base_rate > 0.0).then(|| (effective_fee / base_rate * 100.0).ceil());
        let categories = card
            .rewards
            .iter()
            .filter(|r| !r.is_rotating() && r.reward_rate > base_rate)
            .map(|r| CategoryBreakEven {
                category: r.category.clone(),
                subcategory: r.subcategory.clone(),
                reward_rate: r.reward_rate,
                spend_needed: (effective_fee / ((r.reward_rate - base_rate) / 100.0)).ceil(),
            })
            .collect::<Vec<_>>();
        (general, categories)
    } else {
        (None, Vec::new())
    };

    categories.sort_by(|a, b| {
        a.spend_needed
            .partial_cmp(&b.spend_needed)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.category.cmp(&b.category))
    });

    BreakEven {
        card_id: card.id.clone(),
        annual_fee: card.annual_fee,
        annual_credits: card.annual_credits,
        effective_annual_fee: effective_fee,
        base_rate,
        general_spend_needed,
        categories,
    }
}
